//! Hosted checkout provider port.
//!
//! Defines the contract for a hosted payment page (e.g., Stripe Checkout):
//! open a session for one price, look a session up after the customer
//! returns, and verify signed webhook deliveries.
//!
//! # Design
//!
//! - **Gateway agnostic**: only price ids and session ids cross the port
//! - **Read-only lookups**: the provider never writes subscription state

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CheckoutSessionId, DomainError, ErrorCode, UserId};
use crate::domain::subscription::SubscriptionError;

#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    /// Creates a hosted checkout session and returns its redirect URL.
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Looks up a session, including the price that was purchased.
    async fn retrieve_session(
        &self,
        session_id: &CheckoutSessionId,
    ) -> Result<RetrievedSession, PaymentError>;

    /// Verifies a webhook signature and parses the event.
    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent, PaymentError>;
}

/// Request to open a checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCheckoutRequest {
    /// Sent as `client_reference_id` so the session can be tied back to the user.
    pub user_id: UserId,

    pub price_id: String,

    /// Pre-fills the payment form.
    pub customer_email: Option<String>,

    /// Redirect after payment. May contain `{CHECKOUT_SESSION_ID}`.
    pub success_url: String,

    pub cancel_url: String,
}

/// A freshly created checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: CheckoutSessionId,

    /// Hosted page the customer is redirected to.
    pub url: String,

    /// Unix timestamp after which the session can no longer be paid.
    pub expires_at: i64,
}

/// Payment state of a checkout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    NoPaymentRequired,
}

impl PaymentStatus {
    pub fn is_settled(&self) -> bool {
        matches!(self, PaymentStatus::Paid | PaymentStatus::NoPaymentRequired)
    }
}

/// A checkout session as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedSession {
    pub id: CheckoutSessionId,

    /// User id recorded when the session was created.
    pub client_reference_id: Option<String>,

    pub payment_status: PaymentStatus,

    /// Price of the first line item. Webhook payloads omit line items, so
    /// this may be `None` until the session is retrieved.
    pub price_id: Option<String>,
}

/// A verified webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    pub id: String,
    pub kind: WebhookEventKind,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventKind {
    CheckoutSessionCompleted(RetrievedSession),
    /// Any other event type; acknowledged and ignored.
    Other(String),
}

/// Errors from checkout provider operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentError {
    pub code: PaymentErrorCode,
    pub message: String,
}

impl PaymentError {
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(PaymentErrorCode::NotFound, format!("{} not found", resource))
    }

    pub fn invalid_webhook(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidWebhook, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        let code = match err.code {
            PaymentErrorCode::InvalidWebhook => ErrorCode::InvalidWebhookSignature,
            _ => ErrorCode::PaymentProviderError,
        };
        DomainError::new(code, err.message)
    }
}

impl From<PaymentError> for SubscriptionError {
    fn from(err: PaymentError) -> Self {
        match err.code {
            PaymentErrorCode::InvalidWebhook => SubscriptionError::InvalidWebhookSignature,
            PaymentErrorCode::NotFound => SubscriptionError::validation("session_id", err.message),
            _ => SubscriptionError::PaymentProvider(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    NetworkError,
    AuthenticationError,
    NotFound,
    RateLimitExceeded,
    InvalidWebhook,
    ProviderError,
}

impl PaymentErrorCode {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError | PaymentErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::InvalidWebhook => "invalid_webhook",
            PaymentErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}
