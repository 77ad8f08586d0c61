//! JSON response bodies and the mapping from [`ContactError`] to HTTP.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use intake::{ContactError, FieldError};
use serde::Serialize;
use tracing::error;

/// Body returned with HTTP 200.
#[derive(Debug, Serialize)]
pub struct SuccessBody {
    pub success: bool,
    pub message: &'static str,
}

impl SuccessBody {
    pub fn new(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

/// Body returned for every failure.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub success: bool,
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<&'a [FieldError]>,
}

/// A [`ContactError`] on its way back to the client.
///
/// Only the fixed client message (plus validation details) is sent; anything
/// else in the error stays in the server logs.
#[derive(Debug)]
pub struct ApiError(pub ContactError);

impl From<ContactError> for ApiError {
    fn from(error: ContactError) -> Self {
        Self(error)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            ContactError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ContactError::InvalidSubmission { .. } => StatusCode::BAD_REQUEST,
            ContactError::Configuration { .. }
            | ContactError::Delivery(_)
            | ContactError::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let details = match &self.0 {
            ContactError::InvalidSubmission { details } => Some(details.as_slice()),
            _ => None,
        };
        let body = ErrorBody {
            success: false,
            error: self.0.client_message(),
            details,
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Turns a handler panic into the generic internal-error response.
pub fn panic_response(panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else {
        "handler panicked".to_owned()
    };
    error!(panic = %message, "request handler panicked");

    ApiError(ContactError::Unexpected { message }).into_response()
}

#[cfg(test)]
mod tests {
    use intake::DeliveryError;

    use super::*;

    #[test]
    fn errors_map_to_fixed_status_codes() {
        let cases = [
            (ContactError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (
                ContactError::InvalidSubmission { details: vec![] },
                StatusCode::BAD_REQUEST,
            ),
            (
                ContactError::Configuration {
                    message: "x".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ContactError::Delivery(DeliveryError::Rejected { status: 404 }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ContactError::Unexpected {
                    message: "x".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError(error).status(), status);
        }
    }

    #[tokio::test]
    async fn panics_become_generic_internal_errors() {
        let response = panic_response(Box::new("index out of bounds: secret detail"));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "error": "Internal server error. Please try again.",
            })
        );
    }

    #[test]
    fn details_only_present_for_validation_failures() {
        let body = ErrorBody {
            success: false,
            error: "Too many requests. Please try again later.",
            details: None,
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "success": false,
                "error": "Too many requests. Please try again later.",
            })
        );
    }
}
