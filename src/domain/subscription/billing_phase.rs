//! Billing phase state machine.
//!
//! ```text
//! Freemium ──▶ PendingCheckout ──▶ Paid(plan)
//!                    ▲                 │
//!                    └─────────────────┘  new purchase
//! ```
//!
//! `PendingCheckout` is never persisted: it lives between the redirect to the
//! hosted checkout page and the reconciliation of the returned session.

use serde::{Deserialize, Serialize};

use super::{PlanId, UserSubscriptionState};
use crate::domain::foundation::StateMachine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "plan", rename_all = "snake_case")]
pub enum BillingPhase {
    Freemium,
    PendingCheckout,
    Paid(PlanId),
}

impl BillingPhase {
    /// Phase implied by a stored record.
    pub fn of(state: Option<&UserSubscriptionState>) -> Self {
        match state.and_then(|s| s.plan) {
            Some(plan) if plan.is_paid() => BillingPhase::Paid(plan),
            _ => BillingPhase::Freemium,
        }
    }
}

impl StateMachine for BillingPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use BillingPhase::*;
        match (self, target) {
            (Freemium, PendingCheckout) => true,
            (PendingCheckout, Paid(plan)) => plan.is_paid(),
            (Paid(_), PendingCheckout) => true,
            // replayed reconciliation of the same purchase
            (Paid(current), Paid(next)) => current == next,
            _ => false,
        }
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use BillingPhase::*;
        match self {
            Freemium => vec![PendingCheckout],
            PendingCheckout => vec![Paid(PlanId::Pro), Paid(PlanId::Premium)],
            Paid(plan) => vec![PendingCheckout, Paid(*plan)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::subscription::PlanCatalog;

    #[test]
    fn freemium_moves_to_pending_checkout() {
        assert_eq!(
            BillingPhase::Freemium.transition_to(BillingPhase::PendingCheckout),
            Ok(BillingPhase::PendingCheckout)
        );
    }

    #[test]
    fn freemium_cannot_jump_to_paid() {
        assert!(BillingPhase::Freemium
            .transition_to(BillingPhase::Paid(PlanId::Pro))
            .is_err());
    }

    #[test]
    fn pending_checkout_settles_on_paid_plan() {
        assert!(BillingPhase::PendingCheckout.can_transition_to(&BillingPhase::Paid(PlanId::Premium)));
        assert!(!BillingPhase::PendingCheckout.can_transition_to(&BillingPhase::Paid(PlanId::Freemium)));
    }

    #[test]
    fn paid_can_start_a_new_purchase() {
        let paid = BillingPhase::Paid(PlanId::Pro);
        assert!(paid.can_transition_to(&BillingPhase::PendingCheckout));
        assert!(paid.can_transition_to(&paid));
        assert!(!paid.can_transition_to(&BillingPhase::Paid(PlanId::Premium)));
    }

    #[test]
    fn no_phase_is_terminal() {
        for phase in [
            BillingPhase::Freemium,
            BillingPhase::PendingCheckout,
            BillingPhase::Paid(PlanId::Pro),
        ] {
            assert!(!phase.is_terminal());
        }
    }

    #[test]
    fn phase_of_stored_record() {
        let catalog = PlanCatalog::standard();
        let mut state = UserSubscriptionState::new_freemium(UserId::new("u").unwrap(), &catalog);
        assert_eq!(BillingPhase::of(Some(&state)), BillingPhase::Freemium);
        state.plan = Some(PlanId::Premium);
        assert_eq!(BillingPhase::of(Some(&state)), BillingPhase::Paid(PlanId::Premium));
        assert_eq!(BillingPhase::of(None), BillingPhase::Freemium);
    }
}
