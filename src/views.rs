//! Server-rendered HTML pages. Markup is deliberately bare; every value that
//! originates from a request or the database passes through [`escape`].

use axum::response::Html;
use std::fmt::Write;

use crate::db::BlogPost;
use crate::middleware::csrf::CSRF_FIELD;
use crate::middleware::flash::Flash;
use crate::types::forms::{ContactForm, FieldErrors, LoginForm, PostForm};

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Chrome shared by every page.
pub struct Page<'a> {
    pub title: &'a str,
    pub user: Option<&'a str>,
    pub flashes: &'a [Flash],
}

impl Page<'_> {
    pub fn render(&self, body: &str) -> Html<String> {
        let mut html = String::new();
        let _ = write!(
            html,
            "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{}</title></head><body>\n<nav><a href=\"/\">Home</a> <a href=\"/blog/content\">Blog</a> <a href=\"/blog/ContactUs\">Contact</a> ",
            escape(self.title)
        );
        match self.user {
            Some(user) => {
                let _ = write!(
                    html,
                    "<span class=\"user\">Logged in as {}</span> <a href=\"/logout\">Logout</a>",
                    escape(user)
                );
            }
            None => html.push_str("<span class=\"user\">Not logged in</span>"),
        }
        html.push_str("</nav>\n");
        for flash in self.flashes {
            let _ = writeln!(
                html,
                "<div class=\"flash flash-{}\">{}</div>",
                flash.category.as_str(),
                escape(&flash.message)
            );
        }
        html.push_str(body);
        html.push_str("\n</body></html>\n");
        Html(html)
    }
}

fn csrf_input(token: Option<&str>) -> String {
    token
        .map(|t| {
            format!(
                "<input type=\"hidden\" name=\"{CSRF_FIELD}\" value=\"{}\">",
                escape(t)
            )
        })
        .unwrap_or_default()
}

fn field(
    label: &str,
    name: &str,
    kind: &str,
    value: &str,
    errors: &FieldErrors,
) -> String {
    let mut out = String::new();
    let _ = write!(out, "<p><label>{label} ");
    if kind == "textarea" {
        let _ = write!(out, "<textarea name=\"{name}\">{}</textarea>", escape(value));
    } else {
        let _ = write!(
            out,
            "<input type=\"{kind}\" name=\"{name}\" value=\"{}\">",
            escape(value)
        );
    }
    out.push_str("</label>");
    if let Some(msg) = errors.get(name) {
        let _ = write!(out, " <span class=\"field-error\">{}</span>", escape(msg));
    }
    out.push_str("</p>\n");
    out
}

pub fn index_page(
    page: Page<'_>,
    form: &LoginForm,
    errors: &FieldErrors,
    csrf: Option<&str>,
) -> Html<String> {
    let mut body = String::from("<h1>Welcome</h1>\n<form method=\"post\" action=\"/login\">\n");
    body.push_str(&csrf_input(csrf));
    body.push_str(&field("Username", "username", "text", &form.username, errors));
    // the password is never echoed back
    body.push_str(&field("Password", "password", "password", "", errors));
    body.push_str("<button type=\"submit\">Login</button>\n</form>");
    page.render(&body)
}

pub fn blog_page(
    page: Page<'_>,
    posts: &[BlogPost],
    form: &PostForm,
    errors: &FieldErrors,
    csrf: Option<&str>,
) -> Html<String> {
    let mut body = String::from("<h1>Blog</h1>\n<form method=\"post\" action=\"/blog/content\">\n");
    body.push_str(&csrf_input(csrf));
    body.push_str(&field("Title", "title", "text", &form.title, errors));
    body.push_str(&field("Content", "content", "textarea", &form.content, errors));
    body.push_str(&field("Author", "author", "text", &form.author, errors));
    body.push_str("<button type=\"submit\">Create Post</button>\n</form>\n<ul class=\"posts\">\n");
    for post in posts {
        let _ = writeln!(
            body,
            "<li class=\"post\"><a href=\"/blog/post/{}\">{}</a> by {} <time>{}</time></li>",
            post.id,
            escape(&post.title),
            escape(&post.author),
            post.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    body.push_str("</ul>");
    page.render(&body)
}

pub fn post_page(page: Page<'_>, post: &BlogPost) -> Html<String> {
    let body = format!(
        "<article><h1>{}</h1><p class=\"meta\">by {} on {}</p><div class=\"content\">{}</div></article>",
        escape(&post.title),
        escape(&post.author),
        post.created_at.format("%Y-%m-%d %H:%M:%S"),
        escape(&post.content)
    );
    page.render(&body)
}

pub fn contact_page(
    page: Page<'_>,
    form: &ContactForm,
    errors: &FieldErrors,
    csrf: Option<&str>,
    status: Option<&str>,
) -> Html<String> {
    let mut body = String::from("<h1>Contact Us</h1>\n");
    match status {
        Some("sent") => body.push_str("<div class=\"status status-sent\">Thank you, your message was sent.</div>\n"),
        Some("error") => body.push_str(
            "<div class=\"status status-error\">Your message could not be saved. Please try again later.</div>\n",
        ),
        _ => {}
    }
    body.push_str("<form method=\"post\" action=\"/blog/ContactUs\">\n");
    body.push_str(&csrf_input(csrf));
    body.push_str(&field("Name", "name", "text", &form.name, errors));
    body.push_str(&field("Email", "email", "email", &form.email, errors));
    body.push_str(&field("Subject", "subject", "text", &form.subject, errors));
    body.push_str(&field("Message", "message", "textarea", &form.message, errors));
    body.push_str("<button type=\"submit\">Send Message</button>\n</form>");
    page.render(&body)
}

pub fn user_page(page: Page<'_>, username: &str) -> Html<String> {
    page.render(&format!("<h1>Hello, {}!</h1>", escape(username)))
}

pub fn secret_page(page: Page<'_>) -> Html<String> {
    page.render("<h1>Secret Page</h1><p>Only logged-in users can read this.</p>")
}

pub fn not_found() -> Html<String> {
    Page {
        title: "Page Not Found",
        user: None,
        flashes: &[],
    }
    .render("<h1>404</h1><p>The page you requested does not exist.</p>")
}

pub fn server_error() -> Html<String> {
    Page {
        title: "Server Error",
        user: None,
        flashes: &[],
    }
    .render("<h1>500</h1><p>Something went wrong on our side.</p>")
}
