use axum::{
    Router,
    extract::FromRef,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{Config, ValidationMode};
use crate::db::{self, BlogStore};
use crate::error::BlogError;
use crate::handlers::{auth, blog, contact, pages};
use crate::service::credentials;
use crate::views;

/// Per-request behaviour switches derived from [`Config`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub validation: ValidationMode,
    pub csrf: bool,
    pub secure_cookie: bool,
    pub legacy_digests: bool,
}

impl From<&Config> for Settings {
    fn from(cfg: &Config) -> Self {
        Self {
            validation: cfg.validation,
            csrf: cfg.csrf,
            secure_cookie: cfg.secure_cookie,
            legacy_digests: cfg.legacy_digests,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BlogStore>,
    pub settings: Arc<Settings>,
    key: Key,
}

impl AppState {
    pub fn new(store: Arc<dyn BlogStore>, settings: Settings, key: Key) -> Self {
        Self {
            store,
            settings: Arc::new(settings),
            key,
        }
    }

    /// Open the configured backend and prepare everything a request needs.
    pub async fn build(cfg: &Config) -> Result<Self, BlogError> {
        let store = db::open(cfg).await?;

        if let (Some(username), Some(password)) = (
            cfg.bootstrap_username.as_deref(),
            cfg.bootstrap_password.as_deref(),
        ) && credentials::ensure_user(store.as_ref(), username, password).await?
        {
            info!(username, "bootstrap account created");
        }

        Ok(Self::new(
            store,
            Settings::from(cfg),
            cookie_key(cfg.secret_key.as_deref()),
        ))
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

/// Cookie encryption key. A configured secret is stretched to 64 bytes with
/// SHA-512; without one every process start invalidates existing sessions.
pub fn cookie_key(secret: Option<&str>) -> Key {
    match secret.filter(|s| !s.is_empty()) {
        Some(secret) => Key::from(Sha512::digest(secret.as_bytes()).as_slice()),
        None => {
            warn!("SECRET_KEY not set; generated a random session key");
            Key::generate()
        }
    }
}

pub fn blog_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(auth::index))
        .route("/login", get(auth::login_query).post(auth::login_form))
        .route("/logout", get(auth::logout))
        .route("/blog/content", get(blog::list_posts).post(blog::create_post))
        .route("/blog/post/{id}", get(blog::show_post))
        .route(
            "/blog/ContactUs",
            get(contact::contact_page).post(contact::submit_contact),
        )
        .route("/contact/submit", post(contact::submit_contact))
        .route("/user", get(pages::user_lookup))
        .route("/user/{username}", get(pages::user_profile))
        .route("/my/secret/page", get(pages::secret_page))
        .route("/api/posts", get(blog::api_posts))
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, views::not_found())
}
