//! Typed errors and HTTP mapping.

use crate::service::ValidationErrors;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// Addressed row does not exist. Carries the resource label, e.g. "Customer".
    #[error("{0} Not Found")]
    NotFound(&'static str),
    /// Clash with an existing row; the message is returned to the client as is.
    #[error("{0}")]
    Conflict(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("store: {0}")]
    Store(String),
}

#[derive(Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            AppError::NotFound(_) => message(StatusCode::NOT_FOUND, self.to_string()),
            AppError::Conflict(_) => message(StatusCode::CONFLICT, self.to_string()),
            AppError::Db(sqlx::Error::Database(ref e)) if e.is_unique_violation() => {
                tracing::warn!(error = %e, constraint = ?e.constraint(), "unique constraint violated");
                message(StatusCode::CONFLICT, "Resource already exists".into())
            }
            AppError::Db(_) | AppError::Store(_) => {
                tracing::error!(error = %self, "request failed");
                message(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".into())
            }
        }
    }
}

fn message(status: StatusCode, message: String) -> Response {
    (status, Json(MessageBody { message })).into_response()
}
