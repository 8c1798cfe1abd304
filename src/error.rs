//! Relay error types with HTTP status code mapping.
//!
//! [`RelayError`] covers the failures that reach an HTTP caller: a
//! handshake that could not be upgraded and a dealer seat that is already
//! taken. Read and write failures on established sockets never become a
//! `RelayError`; they end one connection and are only logged.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 3001,
///     "message": "websocket upgrade failed: ..."
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Server-side error enum with HTTP status code mapping.
///
/// | Code | Variant         | HTTP Status               |
/// |------|-----------------|---------------------------|
/// | 2001 | `DealerBusy`    | 409 Conflict              |
/// | 3001 | `UpgradeFailed` | 500 Internal Server Error |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The HTTP request could not be promoted to a WebSocket.
    #[error("websocket upgrade failed: {0}")]
    UpgradeFailed(String),

    /// Another dealer connection is already attached.
    #[error("a dealer is already connected")]
    DealerBusy,
}

impl RelayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::DealerBusy => 2001,
            Self::UpgradeFailed(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::DealerBusy => StatusCode::CONFLICT,
            Self::UpgradeFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
