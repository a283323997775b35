//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use folio_site::ContentError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Content resolution failed.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// Blocking resolver task panicked or was cancelled.
    #[error("Blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// I/O error (bind, accept, file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// HTTP status for this error.
    ///
    /// Only a missing document is a 404; everything else is a 500.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Content(ContentError::NotFound { .. }) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        self.status_code().into_response()
    }
}
