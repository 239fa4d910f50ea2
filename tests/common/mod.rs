#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use blogdesk::config::{Backend, Config, ValidationMode};
use blogdesk::db::{BlogStore, ContactCsv, MemoryStore, NewPost, NewUser, SqliteStore};
use blogdesk::router::{AppState, Settings, blog_router, cookie_key};
use blogdesk::service::credentials::legacy;
use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const SEEDED_TITLES: [&str; 3] = [
    "Welcome to Flask Blog!",
    "Getting Started with Flask",
    "Modern Web Development",
];

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn assert_redirect(&self, to: &str) {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        assert_eq!(self.location.as_deref(), Some(to));
    }
}

/// Router plus a cookie jar that follows `set-cookie` between requests.
pub struct TestApp {
    router: Router,
    cookies: BTreeMap<String, String>,
    pub store: Arc<dyn BlogStore>,
    pub sqlite: Option<SqliteStore>,
    pub dir: TempDir,
}

pub fn test_config(backend: Backend) -> Config {
    Config {
        backend,
        csrf: false,
        secret_key: Some("integration-test-secret".to_string()),
        ..Config::default()
    }
}

impl TestApp {
    pub async fn sqlite() -> Self {
        Self::sqlite_with(|_| {}).await
    }

    pub async fn sqlite_with(tweak: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cfg = test_config(Backend::Sqlite);
        cfg.database_url = format!("sqlite:{}", dir.path().join("blog.db").display());
        tweak(&mut cfg);

        let sqlite = SqliteStore::connect(&cfg.database_url)
            .await
            .expect("connect sqlite");
        sqlite.init_schema().await.expect("init schema");
        let store: Arc<dyn BlogStore> = Arc::new(sqlite.clone());
        Self::assemble(dir, &cfg, store, Some(sqlite))
    }

    pub async fn memory_with(tweak: impl FnOnce(&mut Config, &TempDir)) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cfg = test_config(Backend::Memory);
        cfg.contact_csv_path = dir.path().join("contact_messages.csv");
        tweak(&mut cfg, &dir);

        let store: Arc<dyn BlogStore> = Arc::new(MemoryStore::new(ContactCsv::new(
            cfg.contact_csv_path.clone(),
        )));
        Self::assemble(dir, &cfg, store, None)
    }

    fn assemble(
        dir: TempDir,
        cfg: &Config,
        store: Arc<dyn BlogStore>,
        sqlite: Option<SqliteStore>,
    ) -> Self {
        let state = AppState::new(
            store.clone(),
            Settings::from(cfg),
            cookie_key(cfg.secret_key.as_deref()),
        );
        Self {
            router: blog_router(state),
            cookies: BTreeMap::new(),
            store,
            sqlite,
            dir,
        }
    }

    /// The demo account as the external seeding script writes it.
    pub async fn seed_admin(&self) {
        self.store
            .create_user(NewUser {
                username: "admin".to_string(),
                password_hash: legacy::digest("password123"),
                email: Some("admin@example.com".to_string()),
            })
            .await
            .expect("seed admin");
    }

    pub async fn seed_posts(&self) {
        for title in SEEDED_TITLES {
            self.store
                .insert_post(NewPost {
                    title: title.to_string(),
                    content: format!("{title} body text"),
                    author: "Admin".to_string(),
                })
                .await
                .expect("seed post");
        }
    }

    pub async fn login(&mut self) {
        let resp = self
            .post_form(
                "/login",
                &[("username", "admin"), ("password", "password123")],
            )
            .await;
        resp.assert_redirect("/blog/content");
    }

    /// Act as a different browser against the same server.
    pub fn forget_cookies(&mut self) -> BTreeMap<String, String> {
        std::mem::take(&mut self.cookies)
    }

    pub fn restore_cookies(&mut self, cookies: BTreeMap<String, String>) {
        self.cookies = cookies;
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let req = self
            .request("GET", uri)
            .body(Body::empty())
            .expect("build request");
        self.send(req).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let req = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("build request");
        self.send(req).await
    }

    /// POST an arbitrary body, optionally without a content type.
    pub async fn post_raw(
        &mut self,
        uri: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> TestResponse {
        let mut builder = self.request("POST", uri);
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        let req = builder
            .body(Body::from(body.to_string()))
            .expect("build request");
        self.send(req).await
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    async fn send(&mut self, req: Request<Body>) -> TestResponse {
        let resp = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("request failed");

        for value in resp.headers().get_all(header::SET_COOKIE) {
            let raw = value.to_str().expect("set-cookie not ascii");
            let pair = raw.split(';').next().unwrap_or_default();
            let Some((name, val)) = pair.split_once('=') else {
                continue;
            };
            if val.is_empty() || raw.contains("Max-Age=0") {
                self.cookies.remove(name.trim());
            } else {
                self.cookies.insert(name.trim().to_string(), val.to_string());
            }
        }

        let status = resp.status();
        let location = resp
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        TestResponse {
            status,
            location,
            body: String::from_utf8(body.to_vec()).expect("response body was not utf-8"),
        }
    }

    pub async fn contact_rows(&self) -> i64 {
        let sqlite = self.sqlite.as_ref().expect("sqlite backend");
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contact_messages")
            .fetch_one(sqlite.pool())
            .await
            .expect("count contacts");
        rec.0
    }
}

/// Pull the hidden CSRF token out of a rendered form.
pub fn csrf_token(body: &str) -> String {
    let marker = "name=\"csrf_token\" value=\"";
    let start = body.find(marker).expect("form has no csrf token") + marker.len();
    let end = body[start..].find('"').expect("unterminated token") + start;
    body[start..end].to_string()
}

pub fn presence_mode(cfg: &mut Config) {
    cfg.validation = ValidationMode::Presence;
}
