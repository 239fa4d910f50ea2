use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// Browser-session cookie scoped to the whole site.
pub fn build_cookie(name: &str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build(Cookie::new(name.to_string(), value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Like [`build_cookie`] but expires after `ttl` even if never consumed.
pub fn transient_cookie(name: &str, value: String, secure: bool, ttl: Duration) -> Cookie<'static> {
    let mut cookie = build_cookie(name, value, secure);
    cookie.set_max_age(ttl);
    cookie
}

pub fn clear_cookie(name: &str) -> Cookie<'static> {
    Cookie::build(Cookie::new(name.to_string(), ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
