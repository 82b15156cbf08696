//! Errors that reject a webhook request before any event is dispatched.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("no signature")]
    MissingSignature,
    #[error("signature validation failed")]
    SignatureMismatch,
    #[error("malformed webhook payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

impl WebhookError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingSignature => StatusCode::BAD_REQUEST,
            Self::SignatureMismatch => StatusCode::UNAUTHORIZED,
            Self::MalformedPayload(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingSignature => "MISSING_SIGNATURE",
            Self::SignatureMismatch => "SIGNATURE_MISMATCH",
            Self::MalformedPayload(_) => "MALFORMED_PAYLOAD",
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.code(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
