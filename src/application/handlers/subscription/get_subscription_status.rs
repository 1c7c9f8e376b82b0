//! GetSubscriptionStatusHandler - Plan, credits and module visibility.
//!
//! A read-only query that must always answer. Both reads are bounded by the
//! store timeout; a slow or failing store yields the last known state (or
//! the Freemium default) and the view is flagged `degraded`.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::application::fallback::SubscriptionStateCache;
use crate::application::handlers::module::{fetch_registry, visible_modules, ModuleAccessView};
use crate::domain::foundation::UserId;
use crate::domain::subscription::{remaining_credits, subscription_plan, PlanId, FREEMIUM_CREDITS};
use crate::ports::{ModuleRepository, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct GetSubscriptionStatusQuery {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionStatusView {
    pub plan: PlanId,
    pub credits_used: u32,
    pub credits_limit: u32,
    pub remaining_credits: u32,
    pub modules: Vec<ModuleAccessView>,
    pub degraded: bool,
}

pub struct GetSubscriptionStatusHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    modules: Arc<dyn ModuleRepository>,
    cache: SubscriptionStateCache,
    fetch_timeout: Duration,
}

impl GetSubscriptionStatusHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        modules: Arc<dyn ModuleRepository>,
        cache: SubscriptionStateCache,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            subscriptions,
            modules,
            cache,
            fetch_timeout,
        }
    }

    pub async fn handle(&self, query: GetSubscriptionStatusQuery) -> SubscriptionStatusView {
        let fetched = self
            .cache
            .read_through(self.subscriptions.as_ref(), &query.user_id, self.fetch_timeout)
            .await;
        let registry = fetch_registry(self.modules.as_ref(), self.fetch_timeout).await;

        let degraded = fetched.is_fallback() || registry.is_fallback();
        let state = fetched.value().as_ref();

        let view = SubscriptionStatusView {
            plan: subscription_plan(state),
            credits_used: state.map(|s| s.credits_used).unwrap_or(0),
            credits_limit: state.map(|s| s.credits_limit).unwrap_or(FREEMIUM_CREDITS),
            remaining_credits: remaining_credits(state),
            modules: visible_modules(state, registry.value()),
            degraded,
        };

        tracing::debug!(
            user_id = %query.user_id,
            plan = %view.plan,
            remaining = view.remaining_credits,
            degraded,
            "subscription status resolved"
        );
        view
    }
}
