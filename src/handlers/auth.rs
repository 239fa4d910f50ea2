use axum::{
    Form,
    extract::{
        Query, State,
        rejection::{FormRejection, QueryRejection},
    },
    response::{IntoResponse, Redirect, Response},
};
use tracing::{info, warn};

use super::{CSRF_REJECTED, PageContext, csrf_rejected, malformed, report};
use crate::error::BlogError;
use crate::middleware::flash::{Category, Flash};
use crate::middleware::session::Session;
use crate::router::AppState;
use crate::service::credentials::verify_user;
use crate::types::forms::{FieldErrors, LoginForm, Validate};
use crate::views;

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

fn render_index(
    state: &AppState,
    mut session: Session,
    form: &LoginForm,
    errors: &FieldErrors,
    notice: Option<Flash>,
) -> Response {
    let ctx = PageContext::gather(&mut session, &state.settings).notice(notice);
    let html = views::index_page(ctx.page("Home"), form, errors, ctx.csrf());
    (session, html).into_response()
}

/// GET / -> landing page with the login form.
pub async fn index(State(state): State<AppState>, session: Session) -> Response {
    render_index(&state, session, &LoginForm::default(), &FieldErrors::default(), None)
}

/// GET /login -> credentials may arrive as query parameters.
pub async fn login_query(
    State(state): State<AppState>,
    session: Session,
    form: Result<Query<LoginForm>, QueryRejection>,
) -> Result<Response, BlogError> {
    let form = match form {
        Ok(Query(form)) => form,
        Err(rejection) => return Ok(rejected_form(&state, session, rejection)),
    };
    if form.is_blank() {
        return Ok(render_index(
            &state,
            session,
            &form,
            &FieldErrors::default(),
            None,
        ));
    }
    attempt_login(state, session, form, false).await
}

/// POST /login -> form submission.
pub async fn login_form(
    State(state): State<AppState>,
    session: Session,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, BlogError> {
    match form {
        Ok(Form(form)) => attempt_login(state, session, form, true).await,
        Err(rejection) => Ok(rejected_form(&state, session, rejection)),
    }
}

fn rejected_form(
    state: &AppState,
    session: Session,
    rejection: impl std::fmt::Display,
) -> Response {
    let notice = malformed(rejection);
    render_index(state, session, &LoginForm::default(), &FieldErrors::default(), Some(notice))
}

async fn attempt_login(
    state: AppState,
    mut session: Session,
    form: LoginForm,
    check_csrf: bool,
) -> Result<Response, BlogError> {
    if check_csrf && csrf_rejected(&session, &state.settings, &form.csrf_token) {
        let notice = Flash::new(Category::Error, CSRF_REJECTED);
        return Ok(render_index(&state, session, &form, &FieldErrors::default(), Some(notice)));
    }

    let errors = form.validate(state.settings.validation);
    if !errors.is_empty() {
        let (inline, notice) = report(errors, state.settings.validation);
        return Ok(render_index(&state, session, &form, &inline, notice));
    }

    let ok = verify_user(
        state.store.as_ref(),
        &form.username,
        &form.password,
        state.settings.legacy_digests,
    )
    .await?;

    if !ok {
        warn!(username = %form.username, "rejected login");
        let notice = Flash::new(Category::Error, INVALID_CREDENTIALS);
        return Ok(render_index(&state, session, &form, &FieldErrors::default(), Some(notice)));
    }

    info!(username = %form.username, "user logged in");
    session.sign_in(&form.username);
    session.flash(Category::Success, "Login successful!");
    Ok((session, Redirect::to("/blog/content")).into_response())
}

/// GET /logout -> drop the session marker.
pub async fn logout(mut session: Session) -> Response {
    if let Some(user) = session.user() {
        info!(username = %user, "user logged out");
    }
    session.sign_out();
    session.flash(Category::Info, "You have been logged out");
    (session, Redirect::to("/")).into_response()
}
