//! HTTP DTOs for subscription endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::subscription::{
    ReconcileCheckoutResult, ReconcileOutcome, StartCheckoutResult, WebhookOutcome,
};
use crate::domain::foundation::{AssistantId, CheckoutSessionId, UserId};
use crate::domain::subscription::{remaining_credits, BillingInterval, PlanId, UserSubscriptionState};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to spend one credit on a module.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizeInteractionRequest {
    pub module_id: String,
}

/// Request to open a hosted checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct StartCheckoutRequest {
    pub plan: PlanId,
    #[serde(default = "default_interval")]
    pub interval: BillingInterval,
    #[serde(default)]
    pub customer_email: Option<String>,
}

fn default_interval() -> BillingInterval {
    BillingInterval::Monthly
}

/// Sent by the client after the hosted page redirects back.
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteCheckoutRequest {
    pub session_id: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// A user's subscription record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    pub user_id: UserId,
    pub plan: PlanId,
    pub credits_used: u32,
    pub credits_limit: u32,
    pub remaining_credits: u32,
}

impl From<&UserSubscriptionState> for SubscriptionResponse {
    fn from(state: &UserSubscriptionState) -> Self {
        Self {
            user_id: state.user_id.clone(),
            plan: state.plan.unwrap_or(PlanId::Freemium),
            credits_used: state.credits_used,
            credits_limit: state.credits_limit,
            remaining_credits: remaining_credits(Some(state)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizeInteractionResponse {
    pub assistant_id: AssistantId,
    pub remaining_credits: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub session_id: CheckoutSessionId,
    pub checkout_url: String,
    pub expires_at: i64,
}

impl From<StartCheckoutResult> for CheckoutResponse {
    fn from(result: StartCheckoutResult) -> Self {
        Self {
            session_id: result.session_id,
            checkout_url: result.checkout_url,
            expires_at: result.expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteCheckoutResponse {
    /// `applied` or `already_processed`.
    pub outcome: String,
    pub subscription: SubscriptionResponse,
}

fn outcome_label(outcome: ReconcileOutcome) -> &'static str {
    match outcome {
        ReconcileOutcome::Applied => "applied",
        ReconcileOutcome::AlreadyProcessed => "already_processed",
    }
}

impl From<&ReconcileCheckoutResult> for CompleteCheckoutResponse {
    fn from(result: &ReconcileCheckoutResult) -> Self {
        Self {
            outcome: outcome_label(result.outcome).to_string(),
            subscription: SubscriptionResponse::from(&result.state),
        }
    }
}

/// Acknowledgement returned to the billing provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAckResponse {
    pub received: bool,
    pub event_id: String,
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl WebhookAckResponse {
    pub fn new(event_id: String, outcome: WebhookOutcome) -> Self {
        let (outcome, reason) = match outcome {
            WebhookOutcome::Reconciled(o) => (outcome_label(o).to_string(), None),
            WebhookOutcome::Ignored(reason) => ("ignored".to_string(), Some(reason)),
        };
        Self {
            received: true,
            event_id,
            outcome,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::PlanCatalog;

    #[test]
    fn checkout_request_defaults_to_monthly() {
        let req: StartCheckoutRequest = serde_json::from_str(r#"{"plan":"pro"}"#).unwrap();
        assert_eq!(req.plan, PlanId::Pro);
        assert_eq!(req.interval, BillingInterval::Monthly);
        assert!(req.customer_email.is_none());
    }

    #[test]
    fn subscription_response_reports_remaining() {
        let mut state = UserSubscriptionState::new_freemium(
            UserId::new("doctor-1").unwrap(),
            &PlanCatalog::standard(),
        );
        state.credits_used = 2;

        let response = SubscriptionResponse::from(&state);
        assert_eq!(response.plan, PlanId::Freemium);
        assert_eq!(response.remaining_credits, 3);
    }

    #[test]
    fn webhook_ack_carries_ignore_reason() {
        let ack = WebhookAckResponse::new(
            "evt_1".to_string(),
            WebhookOutcome::Ignored("payment not settled".to_string()),
        );
        assert_eq!(ack.outcome, "ignored");
        assert_eq!(ack.reason.as_deref(), Some("payment not settled"));

        let ack = WebhookAckResponse::new(
            "evt_2".to_string(),
            WebhookOutcome::Reconciled(ReconcileOutcome::AlreadyProcessed),
        );
        assert_eq!(ack.outcome, "already_processed");
        assert!(ack.reason.is_none());
    }
}
