use axum::{http::StatusCode, response::IntoResponse};
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

use crate::views;

#[derive(Debug, ThisError)]
pub enum BlogError {
    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Username already taken: {0}")]
    UsernameTaken(String),
}

impl From<argon2::password_hash::Error> for BlogError {
    fn from(e: argon2::password_hash::Error) -> Self {
        BlogError::PasswordHash(e.to_string())
    }
}

impl IntoResponse for BlogError {
    fn into_response(self) -> axum::response::Response {
        error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, views::server_error()).into_response()
    }
}
