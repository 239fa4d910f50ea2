use axum::{
    Form, Json,
    extract::{Path, State, rejection::FormRejection},
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, info};

use super::{CSRF_REJECTED, PageContext, csrf_rejected, malformed, report};
use crate::db::BlogPost;
use crate::error::BlogError;
use crate::middleware::flash::{Category, Flash};
use crate::middleware::session::Session;
use crate::router::AppState;
use crate::types::forms::{FieldErrors, PostForm, Validate};
use crate::views;

pub const LOGIN_FOR_BLOG: &str = "Please login to access the blog";

async fn render_blog(
    state: &AppState,
    mut session: Session,
    form: &PostForm,
    errors: &FieldErrors,
    notice: Option<Flash>,
) -> Result<Response, BlogError> {
    let posts = state.store.list_posts().await?;
    let ctx = PageContext::gather(&mut session, &state.settings).notice(notice);
    let html = views::blog_page(ctx.page("Blog"), &posts, form, errors, ctx.csrf());
    Ok((session, html).into_response())
}

/// GET /blog/content
pub async fn list_posts(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, BlogError> {
    if let Err(redirect) = session.require_login(LOGIN_FOR_BLOG) {
        return Ok(redirect);
    }
    render_blog(&state, session, &PostForm::default(), &FieldErrors::default(), None).await
}

/// POST /blog/content
///
/// The login gate runs before the body is looked at.
pub async fn create_post(
    State(state): State<AppState>,
    mut session: Session,
    form: Result<Form<PostForm>, FormRejection>,
) -> Result<Response, BlogError> {
    let user = match session.require_login(LOGIN_FOR_BLOG) {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            let notice = malformed(rejection);
            let (form, errors) = (PostForm::default(), FieldErrors::default());
            return render_blog(&state, session, &form, &errors, Some(notice)).await;
        }
    };

    if csrf_rejected(&session, &state.settings, &form.csrf_token) {
        let notice = Flash::new(Category::Error, CSRF_REJECTED);
        return render_blog(&state, session, &form, &FieldErrors::default(), Some(notice)).await;
    }

    let errors = form.validate(state.settings.validation);
    if !errors.is_empty() {
        debug!(fields = ?errors.fields().collect::<Vec<_>>(), "blog post rejected");
        let (inline, notice) = report(errors, state.settings.validation);
        return render_blog(&state, session, &form, &inline, notice).await;
    }

    let id = state.store.insert_post(form.into()).await?;
    info!(post_id = id, username = %user, "blog post created");
    session.flash(Category::Success, "Blog post created successfully!");
    Ok((session, Redirect::to("/blog/content")).into_response())
}

/// GET /blog/post/{id}
pub async fn show_post(
    State(state): State<AppState>,
    mut session: Session,
    Path(id): Path<String>,
) -> Result<Response, BlogError> {
    let post = match id.parse::<i64>() {
        Ok(id) => state.store.get_post(id).await?,
        Err(_) => None,
    };
    let Some(post) = post else {
        debug!(%id, "blog post not found");
        session.flash(Category::Error, "Blog post not found");
        return Ok((session, Redirect::to("/blog/content")).into_response());
    };

    let ctx = PageContext::gather(&mut session, &state.settings);
    let html = views::post_page(ctx.page(&post.title), &post);
    Ok((session, html).into_response())
}

/// GET /api/posts -> every post, newest first.
pub async fn api_posts(State(state): State<AppState>) -> Result<Json<Vec<BlogPost>>, BlogError> {
    Ok(Json(state.store.list_posts().await?))
}
