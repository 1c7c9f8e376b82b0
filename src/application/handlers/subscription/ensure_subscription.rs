//! EnsureSubscriptionHandler - Creates the Freemium record on first login.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::subscription::{PlanCatalog, SubscriptionError, UserSubscriptionState};
use crate::ports::SubscriptionRepository;

/// Returns the user's record, creating the Freemium default if none exists.
pub struct EnsureSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    catalog: Arc<PlanCatalog>,
}

impl EnsureSubscriptionHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>, catalog: Arc<PlanCatalog>) -> Self {
        Self {
            repository,
            catalog,
        }
    }

    pub async fn handle(&self, user_id: &UserId) -> Result<UserSubscriptionState, SubscriptionError> {
        if let Some(existing) = self.repository.find_by_user(user_id).await? {
            return Ok(existing);
        }

        let fresh = UserSubscriptionState::new_freemium(user_id.clone(), &self.catalog);
        let stored = self.repository.create(&fresh).await?;
        tracing::info!(user_id = %user_id, plan = ?stored.plan, "subscription record created");
        Ok(stored)
    }
}
