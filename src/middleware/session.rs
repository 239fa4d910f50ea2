use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, IntoResponseParts, Redirect, Response, ResponseParts};
use axum_extra::extract::cookie::{Key, PrivateCookieJar};
use std::convert::Infallible;
use tracing::debug;

use super::cookies::{build_cookie, clear_cookie};
use super::csrf;
use super::flash::{self, Category, Flash};
use crate::router::AppState;

pub const SESSION_COOKIE: &str = "session";

/// Per-browser state: the logged-in username, pending notices and the CSRF
/// token, all held in encrypted cookies.
///
/// Return it as part of the response so cookie changes reach the client.
#[derive(Clone)]
pub struct Session {
    jar: PrivateCookieJar,
    secure: bool,
}

impl Session {
    pub fn new(jar: PrivateCookieJar, secure: bool) -> Self {
        Self { jar, secure }
    }

    pub fn user(&self) -> Option<String> {
        self.jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_owned())
            .filter(|name| !name.is_empty())
    }

    pub fn sign_in(&mut self, username: &str) {
        self.jar = self
            .jar
            .clone()
            .add(build_cookie(SESSION_COOKIE, username.to_string(), self.secure));
    }

    pub fn sign_out(&mut self) {
        self.jar = self.jar.clone().remove(clear_cookie(SESSION_COOKIE));
    }

    pub fn flash(&mut self, category: Category, message: impl Into<String>) {
        self.jar = flash::push(self.jar.clone(), Flash::new(category, message), self.secure);
    }

    pub fn take_flashes(&mut self) -> Vec<Flash> {
        let (jar, flashes) = flash::take(self.jar.clone());
        self.jar = jar;
        flashes
    }

    pub fn csrf_token(&mut self) -> String {
        let (jar, token) = csrf::issue(self.jar.clone(), self.secure);
        self.jar = jar;
        token
    }

    pub fn csrf_ok(&self, submitted: &str) -> bool {
        csrf::verify(&self.jar, submitted)
    }

    /// Gate for routes that need a logged-in identity.
    ///
    /// Anonymous callers get a redirect to `/` carrying `notice` as a warning.
    pub fn require_login(&self, notice: &str) -> Result<String, Response> {
        if let Some(user) = self.user() {
            return Ok(user);
        }
        debug!(notice, "anonymous request to gated route");
        let mut session = self.clone();
        session.flash(Category::Warning, notice);
        Err((session, Redirect::to("/")).into_response())
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state).await?;
        Ok(Self::new(jar, state.settings.secure_cookie))
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.jar.into_response_parts(res)
    }
}
