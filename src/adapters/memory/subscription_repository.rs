//! In-memory implementation of SubscriptionRepository.
//!
//! Used when no database URL is configured, and by tests. The write lock is
//! held across the compare and the write, which gives the same guarantee as
//! the conditional UPDATE in the PostgreSQL adapter.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{CheckoutSessionId, DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::subscription::UserSubscriptionState;
use crate::ports::{SaveOutcome, SubscriptionRepository};

#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriptionRepository {
    records: Arc<RwLock<HashMap<UserId, UserSubscriptionState>>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record unconditionally (useful for tests).
    pub async fn insert(&self, state: UserSubscriptionState) {
        self.records
            .write()
            .await
            .insert(state.user_id.clone(), state);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn not_found(user_id: &UserId) -> DomainError {
    DomainError::new(
        ErrorCode::SubscriptionNotFound,
        format!("No subscription for user {}", user_id),
    )
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserSubscriptionState>, DomainError> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn create(
        &self,
        state: &UserSubscriptionState,
    ) -> Result<UserSubscriptionState, DomainError> {
        let mut records = self.records.write().await;
        let stored = records
            .entry(state.user_id.clone())
            .or_insert_with(|| state.clone());
        Ok(stored.clone())
    }

    async fn compare_and_swap(
        &self,
        expected_last_session: Option<&CheckoutSessionId>,
        new_state: &UserSubscriptionState,
    ) -> Result<SaveOutcome, DomainError> {
        let mut records = self.records.write().await;
        let current = records
            .get_mut(&new_state.user_id)
            .ok_or_else(|| not_found(&new_state.user_id))?;

        if current.last_processed_session_id.as_ref() != expected_last_session {
            return Ok(SaveOutcome::Conflict);
        }
        if let Some(session) = &new_state.last_processed_session_id {
            if current.has_processed(session) {
                return Ok(SaveOutcome::Conflict);
            }
        }
        *current = new_state.clone();
        Ok(SaveOutcome::Applied)
    }

    async fn record_credit_use(
        &self,
        user_id: &UserId,
    ) -> Result<UserSubscriptionState, DomainError> {
        let mut records = self.records.write().await;
        let current = records.get_mut(user_id).ok_or_else(|| not_found(user_id))?;
        current.credits_used = current.credits_used.saturating_add(1);
        current.updated_at = Timestamp::now();
        Ok(current.clone())
    }
}
