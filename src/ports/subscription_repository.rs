//! Subscription repository port.
//!
//! Persists one `UserSubscriptionState` per user. Records are never deleted,
//! so the port exposes no delete operation.
//!
//! # Concurrency
//!
//! Reconciliation relies on `compare_and_swap`: the write is applied only if
//! the stored `last_processed_session_id` still equals the value the caller
//! read. Two browser tabs returning from the same checkout therefore cannot
//! both apply it.

use async_trait::async_trait;

use crate::domain::foundation::{CheckoutSessionId, DomainError, UserId};
use crate::domain::subscription::UserSubscriptionState;

/// Result of a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The write was applied.
    Applied,
    /// Another writer changed the session marker first; nothing was written.
    Conflict,
}

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Finds the record for a user.
    ///
    /// Returns `None` if the user has never logged in.
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserSubscriptionState>, DomainError>;

    /// Inserts the first-login record unless one already exists.
    ///
    /// Returns whichever record is stored afterwards, so concurrent first
    /// logins converge on a single record.
    async fn create(
        &self,
        state: &UserSubscriptionState,
    ) -> Result<UserSubscriptionState, DomainError>;

    /// Replaces the record if its session marker still equals `expected_last_session`.
    ///
    /// Also reports `Conflict` when the new marker is already in the stored
    /// purchase history, so an old session can never be applied twice.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if the user has no record
    /// - `DatabaseError` on persistence failure
    async fn compare_and_swap(
        &self,
        expected_last_session: Option<&CheckoutSessionId>,
        new_state: &UserSubscriptionState,
    ) -> Result<SaveOutcome, DomainError>;

    /// Atomically increments `credits_used` and returns the updated record.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if the user has no record
    /// - `DatabaseError` on persistence failure
    async fn record_credit_use(&self, user_id: &UserId)
        -> Result<UserSubscriptionState, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn SubscriptionRepository) {}
    }
}
