use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    pub error_messages: Vec<String>,
}

impl ValidationError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self { error_messages: vec![message.into()] }
    }
}

/// Placeholder inner error for routes that have no typed failure of their
/// own beyond the generic taxonomy
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("nothing")]
pub struct Nothing;

/// The error payload every route resolves to. Success and failure are both
/// JSON; the client never has to handle a non-JSON body
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServerError<T> {
    #[error("{inner}")]
    Inner {
        #[serde(with = "http_serde::status_code")]
        code: StatusCode,
        inner: T,
    },
    #[error("validation failed: {}", inner.error_messages.join("; "))]
    Validation { inner: ValidationError },
    #[error("{message}")]
    Server { message: String },
}

impl<T> ServerError<T> {
    pub fn code(&self) -> StatusCode {
        match self {
            ServerError::Inner { code, .. } => *code,
            ServerError::Validation { .. } => StatusCode::BAD_REQUEST,
            ServerError::Server { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl<T: Serialize> IntoResponse for ServerError<T> {
    fn into_response(self) -> Response {
        (self.code(), Json(self)).into_response()
    }
}

impl<T> From<ValidationError> for ServerError<T> {
    fn from(inner: ValidationError) -> Self {
        Self::Validation { inner }
    }
}

// `?` escape hatch for infrastructure failures (session store, serialization)
// that have no dedicated variant in the route's inner error
impl<T> From<anyhow::Error> for ServerError<T> {
    fn from(err: anyhow::Error) -> Self {
        Self::Server { message: format!("Something went wrong: {err:?}") }
    }
}
