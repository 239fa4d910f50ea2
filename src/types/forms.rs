use serde::Deserialize;

use crate::config::ValidationMode;
use crate::db::{NewContact, NewPost};

/// Validation failures keyed by form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(&'static str, String)>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push((field, message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(f, _)| *f)
    }
}

pub const FILL_ALL_FIELDS: &str = "Please fill in all fields";

pub trait Validate {
    fn validate(&self, mode: ValidationMode) -> FieldErrors;
}

fn required(errors: &mut FieldErrors, field: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, "This field is required.");
        return false;
    }
    true
}

fn length(errors: &mut FieldErrors, field: &'static str, value: &str, min: usize, max: Option<usize>) {
    if !required(errors, field, value) {
        return;
    }
    let len = value.chars().count();
    match max {
        Some(max) if len < min || len > max => errors.add(
            field,
            format!("Field must be between {min} and {max} characters long."),
        ),
        None if len < min => {
            errors.add(field, format!("Field must be at least {min} characters long."))
        }
        _ => {}
    }
}

/// `local@domain.tld`, no whitespace.
pub fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !value.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, _)| !host.is_empty())
        && !domain.ends_with('.')
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub csrf_token: String,
}

impl LoginForm {
    /// True when the request carried no credentials at all.
    pub fn is_blank(&self) -> bool {
        self.username.is_empty() && self.password.is_empty()
    }
}

impl Validate for LoginForm {
    fn validate(&self, mode: ValidationMode) -> FieldErrors {
        let mut errors = FieldErrors::default();
        match mode {
            ValidationMode::Strict => {
                length(&mut errors, "username", &self.username, 3, Some(20));
                length(&mut errors, "password", &self.password, 6, None);
            }
            ValidationMode::Presence => {
                required(&mut errors, "username", &self.username);
                required(&mut errors, "password", &self.password);
            }
        }
        errors
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    pub author: String,
    pub csrf_token: String,
}

impl Validate for PostForm {
    fn validate(&self, mode: ValidationMode) -> FieldErrors {
        let mut errors = FieldErrors::default();
        match mode {
            ValidationMode::Strict => {
                length(&mut errors, "title", &self.title, 1, Some(100));
                length(&mut errors, "content", &self.content, 10, Some(1000));
                length(&mut errors, "author", &self.author, 1, Some(50));
            }
            ValidationMode::Presence => {
                required(&mut errors, "title", &self.title);
                required(&mut errors, "content", &self.content);
                required(&mut errors, "author", &self.author);
            }
        }
        errors
    }
}

impl From<PostForm> for NewPost {
    fn from(f: PostForm) -> Self {
        NewPost {
            title: f.title,
            content: f.content,
            author: f.author,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    #[serde(alias = "content")]
    pub message: String,
    pub csrf_token: String,
}

impl Validate for ContactForm {
    fn validate(&self, mode: ValidationMode) -> FieldErrors {
        let mut errors = FieldErrors::default();
        match mode {
            ValidationMode::Strict => {
                length(&mut errors, "name", &self.name, 2, Some(50));
                if required(&mut errors, "email", &self.email) && !is_email(self.email.trim()) {
                    errors.add("email", "Invalid email address.");
                }
                length(&mut errors, "subject", &self.subject, 5, Some(100));
                length(&mut errors, "message", &self.message, 10, Some(500));
            }
            ValidationMode::Presence => {
                required(&mut errors, "name", &self.name);
                required(&mut errors, "email", &self.email);
                required(&mut errors, "subject", &self.subject);
                required(&mut errors, "message", &self.message);
            }
        }
        errors
    }
}

impl From<ContactForm> for NewContact {
    fn from(f: ContactForm) -> Self {
        NewContact {
            name: f.name,
            email: f.email.trim().to_string(),
            subject: f.subject,
            message: f.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> ContactForm {
        ContactForm {
            name: "Ann Lee".into(),
            email: "ann@example.com".into(),
            subject: "Question".into(),
            message: "Is the blog open to guest posts?".into(),
            csrf_token: String::new(),
        }
    }

    #[test]
    fn short_post_fields_pass_strict_mode() {
        let form = PostForm {
            title: "T".into(),
            content: "0123456789".into(),
            author: "A".into(),
            csrf_token: String::new(),
        };
        assert!(form.validate(ValidationMode::Strict).is_empty());
    }

    #[test]
    fn post_content_below_minimum_is_flagged() {
        let form = PostForm {
            title: "Title".into(),
            content: "too short".into(),
            author: "A".into(),
            csrf_token: String::new(),
        };
        let errors = form.validate(ValidationMode::Strict);
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["content"]);
        assert!(form.validate(ValidationMode::Presence).is_empty());
    }

    #[test]
    fn empty_contact_message_fails_in_both_modes() {
        let mut form = contact();
        form.message.clear();
        assert_eq!(
            form.validate(ValidationMode::Strict).get("message"),
            Some("This field is required.")
        );
        assert!(form.validate(ValidationMode::Presence).get("message").is_some());
    }

    #[test]
    fn contact_email_shape_is_only_checked_when_strict() {
        let mut form = contact();
        form.email = "not-an-email".into();
        assert_eq!(
            form.validate(ValidationMode::Strict).get("email"),
            Some("Invalid email address.")
        );
        assert!(form.validate(ValidationMode::Presence).is_empty());
    }

    #[test]
    fn email_shapes() {
        assert!(is_email("a@b.co"));
        assert!(is_email("first.last@mail.example.org"));
        assert!(!is_email("@b.co"));
        assert!(!is_email("a@b"));
        assert!(!is_email("a@.co"));
        assert!(!is_email("a@b.co."));
        assert!(!is_email("a b@c.co"));
        assert!(!is_email("a@b@c.co"));
    }

    #[test]
    fn login_lengths_when_strict() {
        let form = LoginForm {
            username: "ab".into(),
            password: "12345".into(),
            csrf_token: String::new(),
        };
        let errors = form.validate(ValidationMode::Strict);
        assert!(errors.get("username").is_some());
        assert!(errors.get("password").is_some());
        assert!(form.validate(ValidationMode::Presence).is_empty());
    }

    #[test]
    fn contact_form_accepts_legacy_content_field() {
        let form: ContactForm =
            serde_json::from_str(r#"{"name":"n","email":"e","subject":"s","content":"body"}"#)
                .unwrap();
        assert_eq!(form.message, "body");
        assert!(form.csrf_token.is_empty());
    }
}
