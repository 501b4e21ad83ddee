//! Mapping from domain errors to wire responses.
//!
//! Clients of this protocol treat an empty or absent body as total failure,
//! so error responses carry a status code and nothing else; the details go
//! to the server log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use ladle_core::LadleError;

#[derive(Debug)]
pub enum ApiError {
    /// A referenced recipe, draft, or session does not exist.
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    /// The request itself was malformed (bad element name, bad encoding).
    BadRequest(String),
    /// Anything else - persistence failures, serialization bugs.
    Internal(LadleError),
}

impl ApiError {
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl From<LadleError> for ApiError {
    fn from(err: LadleError) -> Self {
        match err {
            LadleError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            LadleError::InvalidRequest(message) => Self::BadRequest(message),
            other => Self::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound { entity_type, id } => {
                tracing::warn!(entity_type, id, "lookup for unknown entity");
                StatusCode::NOT_FOUND
            }
            ApiError::BadRequest(message) => {
                tracing::warn!(%message, "rejected malformed request");
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal(err) => {
                tracing::error!(%err, "request handler failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, String::new()).into_response()
    }
}
