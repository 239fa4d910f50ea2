use axum::{
    Form,
    extract::{Query, State, rejection::FormRejection},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{error, info};

use super::{CSRF_REJECTED, PageContext, csrf_rejected, malformed, report};
use crate::middleware::flash::{Category, Flash};
use crate::middleware::session::Session;
use crate::router::AppState;
use crate::types::forms::{ContactForm, FieldErrors, Validate};
use crate::views;

pub const SENT_REDIRECT: &str = "/blog/ContactUs?status=sent";
pub const FAILED_REDIRECT: &str = "/blog/ContactUs?status=error";

#[derive(Debug, Default, Deserialize)]
pub struct ContactStatus {
    pub status: Option<String>,
}

fn render_contact(
    state: &AppState,
    mut session: Session,
    form: &ContactForm,
    errors: &FieldErrors,
    notice: Option<Flash>,
    status: Option<&str>,
) -> Response {
    let ctx = PageContext::gather(&mut session, &state.settings).notice(notice);
    let html = views::contact_page(ctx.page("Contact Us"), form, errors, ctx.csrf(), status);
    (session, html).into_response()
}

/// GET /blog/ContactUs
pub async fn contact_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ContactStatus>,
) -> Response {
    render_contact(
        &state,
        session,
        &ContactForm::default(),
        &FieldErrors::default(),
        None,
        query.status.as_deref(),
    )
}

/// POST /blog/ContactUs and POST /contact/submit
///
/// Storage failures are logged and reported through the `status` query flag;
/// the submission is not retried.
pub async fn submit_contact(
    State(state): State<AppState>,
    mut session: Session,
    form: Result<Form<ContactForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            let notice = malformed(rejection);
            let (form, errors) = (ContactForm::default(), FieldErrors::default());
            return render_contact(&state, session, &form, &errors, Some(notice), None);
        }
    };

    if csrf_rejected(&session, &state.settings, &form.csrf_token) {
        let notice = Flash::new(Category::Error, CSRF_REJECTED);
        return render_contact(&state, session, &form, &FieldErrors::default(), Some(notice), None);
    }

    let errors = form.validate(state.settings.validation);
    if !errors.is_empty() {
        let (inline, notice) = report(errors, state.settings.validation);
        return render_contact(&state, session, &form, &inline, notice, None);
    }

    match state.store.insert_contact(form.into()).await {
        Ok(()) => {
            info!("contact message stored");
            session.flash(
                Category::Success,
                "Message sent successfully! We will get back to you soon.",
            );
            (session, Redirect::to(SENT_REDIRECT)).into_response()
        }
        Err(e) => {
            error!(error = %e, "failed to store contact message");
            session.flash(Category::Error, "Your message could not be sent.");
            (session, Redirect::to(FAILED_REDIRECT)).into_response()
        }
    }
}
