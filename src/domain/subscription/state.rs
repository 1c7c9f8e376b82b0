//! Per-user subscription record.

use serde::{Deserialize, Serialize};

use super::plan::deserialize_lenient_plan;
use super::{Plan, PlanCatalog, PlanId};
use crate::domain::foundation::{CheckoutSessionId, Timestamp, UserId};

/// The persisted subscription state of one user.
///
/// Created as Freemium on first login and never deleted. Billing fields
/// (`plan`, `credits_limit` and the session markers) are only written by
/// checkout reconciliation; `credits_used` is only written by the
/// interaction flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSubscriptionState {
    pub user_id: UserId,

    /// `None` when the stored value is absent or unrecognised.
    #[serde(default, deserialize_with = "deserialize_lenient_plan")]
    pub plan: Option<PlanId>,

    #[serde(default)]
    pub credits_used: u32,

    #[serde(default)]
    pub credits_limit: u32,

    #[serde(default)]
    pub last_processed_session_id: Option<CheckoutSessionId>,

    /// Every checkout session ever applied, oldest first.
    #[serde(default)]
    pub processed_session_ids: Vec<CheckoutSessionId>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserSubscriptionState {
    /// First-login state: Freemium with the Freemium allowance, nothing used.
    pub fn new_freemium(user_id: UserId, catalog: &PlanCatalog) -> Self {
        let now = Timestamp::now();
        Self {
            user_id,
            plan: Some(PlanId::Freemium),
            credits_used: 0,
            credits_limit: catalog.plan(PlanId::Freemium).credits_limit,
            last_processed_session_id: None,
            processed_session_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// True if this checkout session has already been applied.
    ///
    /// Checks the full history, not just the latest marker: a redelivered
    /// webhook for an older purchase must not roll a newer plan back.
    pub fn has_processed(&self, session_id: &CheckoutSessionId) -> bool {
        self.last_processed_session_id.as_ref() == Some(session_id)
            || self.processed_session_ids.contains(session_id)
    }

    /// Records one consumed credit.
    pub fn consume_credit(&mut self) {
        self.credits_used = self.credits_used.saturating_add(1);
        self.updated_at = Timestamp::now();
    }

    /// Returns the state after a successful purchase of `plan`.
    ///
    /// Resets usage and stamps the session marker so a replay of the same
    /// session is recognised.
    pub fn with_purchase(&self, plan: &Plan, session_id: CheckoutSessionId) -> Self {
        let mut processed_session_ids = self.processed_session_ids.clone();
        if !processed_session_ids.contains(&session_id) {
            processed_session_ids.push(session_id.clone());
        }
        Self {
            user_id: self.user_id.clone(),
            plan: Some(plan.id),
            credits_used: 0,
            credits_limit: plan.credits_limit,
            last_processed_session_id: Some(session_id),
            processed_session_ids,
            created_at: self.created_at,
            updated_at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::PRO_MONTHLY_PRICE_ID;

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    #[test]
    fn first_login_is_freemium_with_five_credits() {
        let state = UserSubscriptionState::new_freemium(user(), &PlanCatalog::standard());
        assert_eq!(state.plan, Some(PlanId::Freemium));
        assert_eq!(state.credits_used, 0);
        assert_eq!(state.credits_limit, 5);
        assert!(state.last_processed_session_id.is_none());
    }

    #[test]
    fn purchase_resets_usage_and_marks_session() {
        let catalog = PlanCatalog::standard();
        let mut state = UserSubscriptionState::new_freemium(user(), &catalog);
        state.consume_credit();
        state.consume_credit();

        let pro = catalog.resolve_price(PRO_MONTHLY_PRICE_ID).unwrap();
        let session = CheckoutSessionId::new("sess_pro").unwrap();
        let next = state.with_purchase(pro, session.clone());

        assert_eq!(next.plan, Some(PlanId::Pro));
        assert_eq!(next.credits_used, 0);
        assert_eq!(next.credits_limit, 100);
        assert!(next.has_processed(&session));
        assert_eq!(next.created_at, state.created_at);
    }

    #[test]
    fn earlier_sessions_stay_processed_after_a_newer_purchase() {
        let catalog = PlanCatalog::standard();
        let state = UserSubscriptionState::new_freemium(user(), &catalog);
        let first = CheckoutSessionId::new("sess_a").unwrap();
        let second = CheckoutSessionId::new("sess_b").unwrap();

        let after_first = state.with_purchase(catalog.plan(PlanId::Pro), first.clone());
        let after_second = after_first.with_purchase(catalog.plan(PlanId::Premium), second.clone());

        assert!(after_second.has_processed(&first));
        assert!(after_second.has_processed(&second));
        assert_eq!(after_second.processed_session_ids, vec![first, second]);
    }

    #[test]
    fn unknown_stored_plan_deserializes_to_none() {
        let json = r#"{
            "user_id": "u1",
            "plan": "platinum",
            "credits_used": 1,
            "credits_limit": 5,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        let state: UserSubscriptionState = serde_json::from_str(json).unwrap();
        assert_eq!(state.plan, None);
        assert_eq!(state.credits_used, 1);
    }

    #[test]
    fn missing_plan_deserializes_to_none() {
        let json = r#"{
            "user_id": "u1",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        let state: UserSubscriptionState = serde_json::from_str(json).unwrap();
        assert_eq!(state.plan, None);
        assert_eq!(state.credits_limit, 0);
    }

    #[test]
    fn missing_user_id_is_rejected() {
        let json = r#"{
            "plan": "pro",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        assert!(serde_json::from_str::<UserSubscriptionState>(json).is_err());
    }
}
