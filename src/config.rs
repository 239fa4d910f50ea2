use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;

use crate::error::BlogError;

/// Where posts, users and contact messages live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Single-file SQLite database.
    Sqlite,
    /// Process memory; contact messages are appended to a CSV file.
    Memory,
}

/// How submitted forms are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Length limits and email shape, errors reported per field.
    Strict,
    /// Non-blank fields only, reported as a single flash notice.
    Presence,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub database_url: String,
    pub backend: Backend,
    pub validation: ValidationMode,
    pub csrf: bool,
    pub contact_csv_path: PathBuf,
    pub loglevel: String,
    pub secure_cookie: bool,
    /// Accept unsalted SHA-256 digests written by the external seeding script.
    pub legacy_digests: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap_password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:5000".to_string(),
            database_url: "sqlite:blog_database.db".to_string(),
            backend: Backend::Sqlite,
            validation: ValidationMode::Strict,
            csrf: true,
            contact_csv_path: PathBuf::from("contact_messages.csv"),
            loglevel: "info".to_string(),
            secure_cookie: false,
            legacy_digests: true,
            secret_key: None,
            bootstrap_username: None,
            bootstrap_password: None,
        }
    }
}

impl Config {
    /// Defaults, then `BLOG_*` variables, then a bare `SECRET_KEY`.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("BLOG_"))
            .merge(Env::raw().only(&["SECRET_KEY"]))
    }

    pub fn load() -> Result<Self, BlogError> {
        Ok(Self::figment().extract()?)
    }
}

pub static CONFIG: LazyLock<Config> = LazyLock::new(|| match Config::load() {
    Ok(cfg) => cfg,
    Err(e) => {
        eprintln!("invalid configuration, falling back to defaults: {e}");
        Config::default()
    }
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("BLOG_BACKEND", "memory");
            jail.set_env("BLOG_VALIDATION", "presence");
            jail.set_env("BLOG_CSRF", "false");
            jail.set_env("SECRET_KEY", "from-the-environment");

            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg.backend, Backend::Memory);
            assert_eq!(cfg.validation, ValidationMode::Presence);
            assert!(!cfg.csrf);
            assert_eq!(cfg.secret_key.as_deref(), Some("from-the-environment"));
            assert_eq!(cfg.listen_addr, "127.0.0.1:5000");
            Ok(())
        });
    }
}
