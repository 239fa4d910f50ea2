//! One-shot notices carried to the next rendered page.

use axum_extra::extract::cookie::PrivateCookieJar;
use serde::{Deserialize, Serialize};
use time::Duration;
use tracing::warn;

use super::cookies::{clear_cookie, transient_cookie};

pub const FLASH_COOKIE: &str = "flash";
const FLASH_TTL: Duration = Duration::minutes(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Success,
    Error,
    Warning,
    Info,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Success => "success",
            Category::Error => "error",
            Category::Warning => "warning",
            Category::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: Category,
    pub message: String,
}

impl Flash {
    pub fn new(category: Category, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

fn decode(value: &str) -> Vec<Flash> {
    serde_json::from_str(value)
        .inspect_err(|e| warn!(error = %e, "dropping unreadable flash cookie"))
        .unwrap_or_default()
}

pub fn pending(jar: &PrivateCookieJar) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .map(|c| decode(c.value()))
        .unwrap_or_default()
}

/// Queue `flash` behind any notices already waiting.
pub fn push(jar: PrivateCookieJar, flash: Flash, secure: bool) -> PrivateCookieJar {
    let mut queued = pending(&jar);
    queued.push(flash);
    match serde_json::to_string(&queued) {
        Ok(value) => jar.add(transient_cookie(FLASH_COOKIE, value, secure, FLASH_TTL)),
        Err(e) => {
            warn!(error = %e, "failed to encode flash");
            jar
        }
    }
}

/// Drain every waiting notice.
pub fn take(jar: PrivateCookieJar) -> (PrivateCookieJar, Vec<Flash>) {
    let queued = pending(&jar);
    if queued.is_empty() && jar.get(FLASH_COOKIE).is_none() {
        return (jar, queued);
    }
    (jar.remove(clear_cookie(FLASH_COOKIE)), queued)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_serializes_with_lowercase_category() {
        let json = serde_json::to_string(&Flash::new(Category::Warning, "careful")).unwrap();
        assert_eq!(json, r#"{"category":"warning","message":"careful"}"#);
    }

    #[test]
    fn corrupt_payload_decodes_to_nothing() {
        assert!(decode("not json").is_empty());
        assert_eq!(
            decode(r#"[{"category":"info","message":"hi"}]"#),
            vec![Flash::new(Category::Info, "hi")]
        );
    }
}
