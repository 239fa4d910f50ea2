use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::PageContext;
use crate::middleware::session::Session;
use crate::router::AppState;
use crate::views;

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub username: Option<String>,
}

/// GET /user/{username}
pub async fn user_profile(
    State(state): State<AppState>,
    mut session: Session,
    Path(username): Path<String>,
) -> Response {
    if let Err(redirect) = session.require_login("Please login to view profiles") {
        return redirect;
    }
    let ctx = PageContext::gather(&mut session, &state.settings);
    let html = views::user_page(ctx.page("User"), &username);
    (session, html).into_response()
}

/// GET /user?username=
pub async fn user_lookup(
    State(state): State<AppState>,
    mut session: Session,
    Query(query): Query<UserQuery>,
) -> Response {
    let username = query
        .username
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| "Guest".to_string());
    let ctx = PageContext::gather(&mut session, &state.settings);
    let html = views::user_page(ctx.page("User"), &username);
    (session, html).into_response()
}

/// GET /my/secret/page
pub async fn secret_page(State(state): State<AppState>, mut session: Session) -> Response {
    if let Err(redirect) = session.require_login("Please login to access secret page") {
        return redirect;
    }
    let ctx = PageContext::gather(&mut session, &state.settings);
    let html = views::secret_page(ctx.page("Secret"));
    (session, html).into_response()
}
