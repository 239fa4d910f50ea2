//! Route handlers. Every page render goes through [`PageContext`] so pending
//! notices are consumed exactly once.

pub mod auth;
pub mod blog;
pub mod contact;
pub mod pages;

use tracing::debug;

use crate::config::ValidationMode;
use crate::middleware::flash::{Category, Flash};
use crate::middleware::session::Session;
use crate::router::Settings;
use crate::types::forms::{FILL_ALL_FIELDS, FieldErrors};
use crate::views::Page;

pub const CSRF_REJECTED: &str = "The form has expired or is invalid. Please try again.";
pub const MALFORMED_FORM: &str = "The submitted form could not be read. Please try again.";

pub struct PageContext {
    pub user: Option<String>,
    pub flashes: Vec<Flash>,
    csrf: Option<String>,
}

impl PageContext {
    /// Drain pending notices and mint a CSRF token when protection is on.
    pub fn gather(session: &mut Session, settings: &Settings) -> Self {
        let user = session.user();
        let flashes = session.take_flashes();
        let csrf = settings.csrf.then(|| session.csrf_token());
        Self {
            user,
            flashes,
            csrf,
        }
    }

    /// Add a notice produced by the current request.
    pub fn notice(mut self, flash: Option<Flash>) -> Self {
        self.flashes.extend(flash);
        self
    }

    pub fn page<'a>(&'a self, title: &'a str) -> Page<'a> {
        Page {
            title,
            user: self.user.as_deref(),
            flashes: &self.flashes,
        }
    }

    pub fn csrf(&self) -> Option<&str> {
        self.csrf.as_deref()
    }
}

/// Strict mode annotates fields inline; presence mode raises one notice.
pub fn report(errors: FieldErrors, mode: ValidationMode) -> (FieldErrors, Option<Flash>) {
    match mode {
        ValidationMode::Strict => (errors, None),
        ValidationMode::Presence => (
            FieldErrors::default(),
            Some(Flash::new(Category::Error, FILL_ALL_FIELDS)),
        ),
    }
}

/// Notice for a body or query string the extractor could not decode.
pub fn malformed(rejection: impl std::fmt::Display) -> Flash {
    debug!(%rejection, "form rejected by extractor");
    Flash::new(Category::Error, MALFORMED_FORM)
}

/// True when CSRF protection is on and `submitted` does not match.
pub fn csrf_rejected(session: &Session, settings: &Settings, submitted: &str) -> bool {
    settings.csrf && !session.csrf_ok(submitted)
}
