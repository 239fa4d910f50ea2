//! Synchronizer tokens for state-changing form posts.

use axum_extra::extract::cookie::PrivateCookieJar;
use base64::Engine;
use rand_core::{OsRng, RngCore};

use super::cookies::build_cookie;
use crate::service::credentials::tokens_match;

pub const CSRF_COOKIE: &str = "csrf_token";
pub const CSRF_FIELD: &str = "csrf_token";

fn generate() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Token bound to this browser, minted on first use.
pub fn issue(jar: PrivateCookieJar, secure: bool) -> (PrivateCookieJar, String) {
    if let Some(existing) = jar.get(CSRF_COOKIE) {
        let token = existing.value().to_owned();
        return (jar, token);
    }
    let token = generate();
    let jar = jar.add(build_cookie(CSRF_COOKIE, token.clone(), secure));
    (jar, token)
}

pub fn verify(jar: &PrivateCookieJar, submitted: &str) -> bool {
    match jar.get(CSRF_COOKIE) {
        Some(expected) => !submitted.is_empty() && tokens_match(expected.value(), submitted),
        None => false,
    }
}
