use crate::types::ApiError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Errors returned by the mirror store, server and client.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// A required field is missing or empty.
    #[error("{message}")]
    Validation { field: &'static str, message: String },
    /// A record with this certificate id is already stored.
    #[error("certificate {certificate_id} is already recorded")]
    Duplicate { certificate_id: String },
    /// The mirror rejected a request.
    #[error("mirror responded with {status}: {message}")]
    Status { status: u16, message: String, field: Option<String> },
    #[error("mirror request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl MirrorError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Duplicate { .. } => StatusCode::CONFLICT,
            Self::Status { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::Http(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn field(&self) -> Option<String> {
        match self {
            Self::Validation { field, .. } => Some(field.to_string()),
            Self::Duplicate { .. } => Some("certificateId".to_string()),
            Self::Status { field, .. } => field.clone(),
            Self::Http(_) => None,
        }
    }
}

impl IntoResponse for MirrorError {
    fn into_response(self) -> Response {
        let body = ApiError { message: self.to_string(), field: self.field() };
        (self.status_code(), Json(body)).into_response()
    }
}
