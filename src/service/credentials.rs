use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::db::{BlogStore, NewUser};
use crate::error::BlogError;

/// Hash `password` as an Argon2id PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, BlogError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Check `password` against a stored hash.
///
/// Stored values that are not PHC strings are only accepted as unsalted
/// SHA-256 digests when `allow_legacy` is set.
pub fn verify_password(password: &str, stored: &str, allow_legacy: bool) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) if allow_legacy && legacy::is_digest(stored) => legacy::verify(password, stored),
        Err(_) => false,
    }
}

/// Look up `username` and check the password. Unknown users and wrong
/// passwords both yield `false`.
pub async fn verify_user(
    store: &dyn BlogStore,
    username: &str,
    password: &str,
    allow_legacy: bool,
) -> Result<bool, BlogError> {
    let Some(user) = store.find_user(username).await? else {
        debug!(username, "login for unknown user");
        return Ok(false);
    };
    Ok(verify_password(password, &user.password_hash, allow_legacy))
}

/// Create an account unless one with that name already exists.
pub async fn ensure_user(
    store: &dyn BlogStore,
    username: &str,
    password: &str,
) -> Result<bool, BlogError> {
    if store.find_user(username).await?.is_some() {
        return Ok(false);
    }
    let password_hash = hash_password(password)?;
    match store
        .create_user(NewUser {
            username: username.to_string(),
            password_hash,
            email: None,
        })
        .await
    {
        Ok(_) => Ok(true),
        Err(BlogError::UsernameTaken(name)) => {
            warn!(username = %name, "account created concurrently");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// INSECURE: unsalted single-pass SHA-256, as written by the external seeding
/// script. Never use for new accounts and do not deploy with it enabled.
pub mod legacy {
    use sha2::{Digest, Sha256};
    use subtle::ConstantTimeEq;

    pub fn digest(password: &str) -> String {
        Sha256::digest(password.as_bytes())
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    pub fn is_digest(stored: &str) -> bool {
        stored.len() == 64 && stored.bytes().all(|b| b.is_ascii_hexdigit())
    }

    pub fn verify(password: &str, stored: &str) -> bool {
        let computed = digest(password);
        bool::from(computed.as_bytes().ct_eq(stored.to_ascii_lowercase().as_bytes()))
    }
}

/// Constant-time string equality for tokens.
pub fn tokens_match(a: &str, b: &str) -> bool {
    bool::from(a.as_bytes().ct_eq(b.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mutations(password: &str) -> Vec<String> {
        (0..password.len())
            .map(|i| {
                let mut bytes = password.as_bytes().to_vec();
                bytes[i] = if bytes[i] == b'x' { b'y' } else { b'x' };
                String::from_utf8(bytes).unwrap()
            })
            .collect()
    }

    #[test]
    fn argon2_hash_verifies_and_rejects_mutations() {
        let stored = hash_password("password123").unwrap();
        assert!(stored.starts_with("$argon2"));
        assert!(verify_password("password123", &stored, false));
        for wrong in mutations("password123") {
            assert!(!verify_password(&wrong, &stored, false), "{wrong} accepted");
        }
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn legacy_digest_matches_known_value() {
        assert_eq!(
            legacy::digest("password123"),
            "ef92b778bafe771e89245b89ecbc08a44a4e166c06659911881f383d4473e94f"
        );
    }

    #[test]
    fn legacy_digest_requires_opt_in() {
        let stored = legacy::digest("password123");
        assert!(verify_password("password123", &stored, true));
        assert!(!verify_password("password123", &stored, false));
        for wrong in mutations("password123") {
            assert!(!verify_password(&wrong, &stored, true));
        }
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-hash", true));
        assert!(!verify_password("", "", true));
    }
}
