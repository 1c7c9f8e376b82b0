//! HTTP error responses.
//!
//! Every failure leaves the service as an `ErrorResponse`. Refusals the user
//! can act on (no credits left, module above their plan) also carry an
//! upgrade prompt in `details.prompt`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ValidationError};
use crate::domain::subscription::{SubscriptionError, UpgradePrompt};

/// Standard error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

/// API error type that converts subscription errors to HTTP responses.
#[derive(Debug)]
pub struct ApiError {
    error: SubscriptionError,
    prompt: Option<UpgradePrompt>,
}

impl ApiError {
    pub fn with_prompt(mut self, prompt: UpgradePrompt) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn error(&self) -> &SubscriptionError {
        &self.error
    }
}

pub(crate) fn status_for(err: &SubscriptionError) -> StatusCode {
    match err {
        SubscriptionError::NotFound(_) | SubscriptionError::ModuleNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        SubscriptionError::PlanResolution { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SubscriptionError::InsufficientCredits { .. } | SubscriptionError::CheckoutNotPaid { .. } => {
            StatusCode::PAYMENT_REQUIRED
        }
        SubscriptionError::ModuleNotAccessible { .. }
        | SubscriptionError::CheckoutSessionMismatch { .. } => StatusCode::FORBIDDEN,
        SubscriptionError::Conflict(_) => StatusCode::CONFLICT,
        SubscriptionError::InvalidWebhookSignature => StatusCode::UNAUTHORIZED,
        SubscriptionError::PaymentProvider(_) => StatusCode::BAD_GATEWAY,
        SubscriptionError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
        SubscriptionError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<SubscriptionError> for ApiError {
    fn from(error: SubscriptionError) -> Self {
        Self {
            error,
            prompt: None,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        SubscriptionError::from(err).into()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        SubscriptionError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.error);
        if status.is_server_error() {
            tracing::error!(error = %self.error, "request failed");
        }

        let code = self.error.code().to_string();
        let message = self.error.message();
        let body = match self.prompt {
            Some(prompt) => {
                ErrorResponse::with_details(code, message, serde_json::json!({ "prompt": prompt }))
            }
            None => ErrorResponse::new(code, message),
        };
        (status, Json(body)).into_response()
    }
}
