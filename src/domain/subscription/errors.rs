//! Subscription-specific error types.
//!
//! Every variant is recoverable: the HTTP layer turns each into a response,
//! and the refusals carry enough context to build an upgrade prompt.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | ModuleNotFound | 404 |
//! | PlanResolution | 422 |
//! | InsufficientCredits | 402 |
//! | ModuleNotAccessible | 403 |
//! | CheckoutSessionMismatch | 403 |
//! | CheckoutNotPaid | 402 |
//! | Conflict | 409 |
//! | InvalidWebhookSignature | 401 |
//! | PaymentProvider | 502 |
//! | ValidationFailed | 400 |
//! | Infrastructure | 500 |

use super::AccessDeniedReason;
use crate::domain::foundation::{
    CheckoutSessionId, DomainError, ErrorCode, ModuleId, UserId, ValidationError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// No subscription record exists for this user.
    NotFound(UserId),

    /// The purchased price id is not in the plan catalog.
    PlanResolution { price_id: String },

    /// Every credit of the current plan has been used.
    InsufficientCredits { used: u32, limit: u32 },

    /// The module exists but this user may not open it.
    ModuleNotAccessible {
        module_id: ModuleId,
        reason: AccessDeniedReason,
    },

    ModuleNotFound(ModuleId),

    /// The checkout session was opened for a different user.
    CheckoutSessionMismatch { session_id: CheckoutSessionId },

    /// The checkout session has not been paid.
    CheckoutNotPaid { session_id: CheckoutSessionId },

    /// Concurrent writers kept winning the conditional write.
    Conflict(UserId),

    InvalidWebhookSignature,

    /// The billing provider failed or rejected the call.
    PaymentProvider(String),

    ValidationFailed { field: String, message: String },

    Infrastructure(String),
}

impl SubscriptionError {
    pub fn not_found(user_id: UserId) -> Self {
        SubscriptionError::NotFound(user_id)
    }

    pub fn plan_resolution(price_id: impl Into<String>) -> Self {
        SubscriptionError::PlanResolution {
            price_id: price_id.into(),
        }
    }

    pub fn insufficient_credits(used: u32, limit: u32) -> Self {
        SubscriptionError::InsufficientCredits { used, limit }
    }

    pub fn module_not_accessible(module_id: ModuleId, reason: AccessDeniedReason) -> Self {
        SubscriptionError::ModuleNotAccessible { module_id, reason }
    }

    pub fn module_not_found(module_id: ModuleId) -> Self {
        SubscriptionError::ModuleNotFound(module_id)
    }

    pub fn session_mismatch(session_id: CheckoutSessionId) -> Self {
        SubscriptionError::CheckoutSessionMismatch { session_id }
    }

    pub fn not_paid(session_id: CheckoutSessionId) -> Self {
        SubscriptionError::CheckoutNotPaid { session_id }
    }

    pub fn conflict(user_id: UserId) -> Self {
        SubscriptionError::Conflict(user_id)
    }

    pub fn invalid_webhook_signature() -> Self {
        SubscriptionError::InvalidWebhookSignature
    }

    pub fn payment_provider(message: impl Into<String>) -> Self {
        SubscriptionError::PaymentProvider(message.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SubscriptionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        SubscriptionError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriptionError::NotFound(_) => ErrorCode::SubscriptionNotFound,
            SubscriptionError::PlanResolution { .. } => ErrorCode::PlanResolutionFailed,
            SubscriptionError::InsufficientCredits { .. } => ErrorCode::InsufficientCredits,
            SubscriptionError::ModuleNotAccessible { .. } => ErrorCode::ModuleNotAccessible,
            SubscriptionError::ModuleNotFound(_) => ErrorCode::ModuleNotFound,
            SubscriptionError::CheckoutSessionMismatch { .. } => ErrorCode::CheckoutSessionMismatch,
            SubscriptionError::CheckoutNotPaid { .. } => ErrorCode::CheckoutNotPaid,
            SubscriptionError::Conflict(_) => ErrorCode::ConcurrentModification,
            SubscriptionError::InvalidWebhookSignature => ErrorCode::InvalidWebhookSignature,
            SubscriptionError::PaymentProvider(_) => ErrorCode::PaymentProviderError,
            SubscriptionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SubscriptionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-facing message.
    ///
    /// Plan resolution failures deliberately hide the price id from users.
    pub fn message(&self) -> String {
        match self {
            SubscriptionError::NotFound(user_id) => {
                format!("No subscription found for user: {}", user_id)
            }
            SubscriptionError::PlanResolution { .. } => {
                "There was a payment processing issue. Please contact support.".to_string()
            }
            SubscriptionError::InsufficientCredits { used, limit } => {
                format!("All {} of {} credits have been used", used, limit)
            }
            SubscriptionError::ModuleNotAccessible { module_id, reason } => {
                format!("Module '{}' is not accessible: {}", module_id, reason)
            }
            SubscriptionError::ModuleNotFound(id) => format!("Module not found: {}", id),
            SubscriptionError::CheckoutSessionMismatch { session_id } => {
                format!("Checkout session {} does not belong to this user", session_id)
            }
            SubscriptionError::CheckoutNotPaid { session_id } => {
                format!("Checkout session {} has not been paid", session_id)
            }
            SubscriptionError::Conflict(user_id) => {
                format!("Subscription for {} was modified concurrently", user_id)
            }
            SubscriptionError::InvalidWebhookSignature => "Invalid webhook signature".to_string(),
            SubscriptionError::PaymentProvider(msg) => format!("Payment provider error: {}", msg),
            SubscriptionError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            SubscriptionError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SubscriptionError::Conflict(_)
                | SubscriptionError::Infrastructure(_)
                | SubscriptionError::PaymentProvider(_)
        )
    }
}

impl std::fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SubscriptionError {}

impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => SubscriptionError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::PaymentProviderError => SubscriptionError::PaymentProvider(err.message),
            ErrorCode::InvalidWebhookSignature => SubscriptionError::InvalidWebhookSignature,
            _ => SubscriptionError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for SubscriptionError {
    fn from(err: ValidationError) -> Self {
        SubscriptionError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<SubscriptionError> for DomainError {
    fn from(err: SubscriptionError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::ModuleTier;

    fn user() -> UserId {
        UserId::new("user-test-123").unwrap()
    }

    #[test]
    fn plan_resolution_hides_price_id() {
        let err = SubscriptionError::plan_resolution("price_secret");
        assert_eq!(err.code(), ErrorCode::PlanResolutionFailed);
        assert!(!err.message().contains("price_secret"));
        assert!(err.message().contains("contact support"));
    }

    #[test]
    fn insufficient_credits_reports_usage() {
        let err = SubscriptionError::insufficient_credits(5, 5);
        assert_eq!(err.code(), ErrorCode::InsufficientCredits);
        assert!(err.message().contains('5'));
    }

    #[test]
    fn module_not_accessible_includes_reason() {
        let err = SubscriptionError::module_not_accessible(
            ModuleId::new("labs").unwrap(),
            AccessDeniedReason::TierTooLow {
                required: ModuleTier::Premium,
                current: ModuleTier::Free,
            },
        );
        assert_eq!(err.code(), ErrorCode::ModuleNotAccessible);
        assert!(err.message().contains("labs"));
        assert!(err.message().contains("Premium"));
    }

    #[test]
    fn conflict_is_retryable() {
        assert!(SubscriptionError::conflict(user()).is_retryable());
        assert!(!SubscriptionError::invalid_webhook_signature().is_retryable());
    }

    #[test]
    fn validation_error_converts_with_field() {
        let err: SubscriptionError = ValidationError::empty_field("session_id").into();
        assert!(matches!(
            err,
            SubscriptionError::ValidationFailed { ref field, .. } if field == "session_id"
        ));
    }

    #[test]
    fn domain_validation_error_keeps_field_detail() {
        let err: SubscriptionError = DomainError::validation("assistant_id", "blank").into();
        assert!(matches!(
            err,
            SubscriptionError::ValidationFailed { ref field, ref message }
            if field == "assistant_id" && message == "blank"
        ));
    }

    #[test]
    fn database_domain_error_becomes_infrastructure() {
        let err: SubscriptionError = DomainError::database("connection reset").into();
        assert!(matches!(err, SubscriptionError::Infrastructure(_)));
    }

    #[test]
    fn converts_back_to_domain_error() {
        let err: DomainError = SubscriptionError::not_found(user()).into();
        assert_eq!(err.code, ErrorCode::SubscriptionNotFound);
    }
}
