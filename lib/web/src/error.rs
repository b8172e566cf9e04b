use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sparql_mediator_engine::MediatorError;
use tracing::error;

#[derive(thiserror::Error, Debug)]
pub enum MediatorServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Content Negotiation Failed: {0}")]
    ContentNegotiation(String),
    #[error("Unsupported Media Type: {0}")]
    UnsupportedMediaType(String),
    #[error("Internal server error: {0}")]
    Internal(anyhow::Error),
}

impl From<MediatorError> for MediatorServerError {
    fn from(error: MediatorError) -> Self {
        if error.is_client_error() {
            MediatorServerError::BadRequest(format!(
                "Request could not be processed by the endpoint: {error}"
            ))
        } else {
            MediatorServerError::Internal(error.into())
        }
    }
}

impl IntoResponse for MediatorServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            MediatorServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            MediatorServerError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            MediatorServerError::ContentNegotiation(msg) => (StatusCode::NOT_ACCEPTABLE, msg),
            MediatorServerError::UnsupportedMediaType(msg) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg)
            }
            MediatorServerError::Internal(e) => {
                error!("Request failed: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        (status, message).into_response()
    }
}
