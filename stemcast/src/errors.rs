use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

/// Errors that surface as failed HTTP responses.
///
/// Two outcomes deliberately never pass through here: a failed audio
/// extraction (reported inside the upload response body) and a retrieval
/// miss (reported as a body-encoded `File not found`). Both keep their
/// always-200 shape for compatibility with existing clients.
#[derive(ThisError, Debug)]
pub enum Error {
    /// Invalid request data (malformed multipart, bad file name)
    #[error("{message}")]
    BadRequest { message: String },

    /// Filesystem operation failed while persisting or reading media
    #[error("failed to {operation}: {source}")]
    Storage {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::Storage { .. } | Error::Internal { .. } | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::BadRequest { message } => message.clone(),
            Error::Storage { .. } | Error::Internal { .. } | Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Storage { .. } | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::BadRequest { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        (self.status_code(), self.user_message()).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
