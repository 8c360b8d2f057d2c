//! Server error type with HTTP status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use tracer_core::TraceError;

#[derive(Debug)]
pub enum ServerError {
    Trace(TraceError),
    /// The blocking trace task was cancelled or panicked.
    TaskFailed(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: u16,
    error: String,
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Trace(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Trace(TraceError::CanvasNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Trace(_) | Self::TaskFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Display for ServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace(err) => write!(f, "{err}"),
            Self::TaskFailed(message) => write!(f, "trace task failed: {message}"),
        }
    }
}

impl Error for ServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Trace(err) => Some(err),
            Self::TaskFailed(_) => None,
        }
    }
}

impl From<TraceError> for ServerError {
    fn from(value: TraceError) -> Self {
        Self::Trace(value)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!(
                "event=http_response module=server status=error code={} error={}",
                status.as_u16(),
                self
            );
            // Store details stay in the log.
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        let body = ErrorBody {
            status: status.as_u16(),
            error: message,
        };
        (status, Json(body)).into_response()
    }
}
