use shared::api::{
    error::ServerError,
    response_errors::{AuthError, WorkoutError},
};
use thiserror::Error;

/// Failures talking to the spreadsheet backend. Routes convert these into
/// the JSON error taxonomy via the `From` impls below, so `?` works on any
/// store call inside a handler
#[derive(Debug, Error)]
pub enum SheetsError {
    /// Access token missing, expired or rejected. Both cases are the same
    /// failure class at the API boundary
    #[error("access token missing or rejected by the backend")]
    Unauthorized,
    #[error("missing configuration: {0}")]
    Misconfigured(String),
    #[error("{what} not found")]
    NotFound { what: String },
    /// Non-success status from the values API, propagated with its payload
    /// for diagnostics. No automatic retry
    #[error("backend returned {status}: {body}")]
    Backend { status: u16, body: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl From<SheetsError> for ServerError<WorkoutError> {
    fn from(err: SheetsError) -> Self {
        match err {
            SheetsError::Unauthorized => WorkoutError::Unauthorized.into(),
            SheetsError::Misconfigured(message) => WorkoutError::Misconfigured { message }.into(),
            SheetsError::NotFound { what } => WorkoutError::NotFound { what }.into(),
            SheetsError::Backend { status, body } => WorkoutError::Backend { status, body }.into(),
            SheetsError::Transport(e) => {
                ServerError::Server { message: format!("backend request failed: {e}") }
            },
        }
    }
}

impl From<SheetsError> for ServerError<AuthError> {
    fn from(err: SheetsError) -> Self {
        match err {
            SheetsError::Unauthorized => AuthError::Unauthorized.into(),
            SheetsError::Misconfigured(message) => AuthError::Misconfigured { message }.into(),
            other => ServerError::Server { message: other.to_string() },
        }
    }
}
