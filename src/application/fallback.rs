//! Bounded reads with a last-known-good fallback.
//!
//! Status queries must always answer. A store read is raced against a
//! timeout; if the store is slow or failing, the caller gets the last state
//! it successfully read for that user, or a default.
//!
//! # Cancellation
//!
//! On timeout the read future is dropped. Only reads go through here, so an
//! abandoned future can never leave a half-applied write behind.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::subscription::UserSubscriptionState;
use crate::ports::SubscriptionRepository;

/// Why a fallback value was served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    TimedOut(Duration),
    StoreError(String),
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::TimedOut(d) => write!(f, "timed out after {}ms", d.as_millis()),
            FallbackReason::StoreError(msg) => write!(f, "store error: {}", msg),
        }
    }
}

/// A value together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    Fresh(T),
    Fallback { value: T, reason: FallbackReason },
}

impl<T> Fetched<T> {
    pub fn value(&self) -> &T {
        match self {
            Fetched::Fresh(v) => v,
            Fetched::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Fetched::Fresh(v) => v,
            Fetched::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Fetched::Fallback { .. })
    }
}

/// Runs `op` under `timeout`, substituting `fallback()` on timeout or error.
pub async fn fetch_with_fallback<T, Fut, D>(op: Fut, timeout: Duration, fallback: D) -> Fetched<T>
where
    Fut: Future<Output = Result<T, DomainError>>,
    D: FnOnce() -> T,
{
    match tokio::time::timeout(timeout, op).await {
        Ok(Ok(value)) => Fetched::Fresh(value),
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "store read failed, serving fallback");
            Fetched::Fallback {
                value: fallback(),
                reason: FallbackReason::StoreError(err.to_string()),
            }
        }
        Err(_) => {
            tracing::warn!(timeout_ms = timeout.as_millis() as u64, "store read timed out, serving fallback");
            Fetched::Fallback {
                value: fallback(),
                reason: FallbackReason::TimedOut(timeout),
            }
        }
    }
}

const DEFAULT_CAPACITY: usize = 10_000;
const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    state: UserSubscriptionState,
    stored_at: Instant,
}

/// Last successfully read subscription state per user.
///
/// Bounded: at most `capacity` users are kept, the oldest entry making room
/// for a new user, and entries older than `ttl` are never served.
#[derive(Debug, Clone)]
pub struct SubscriptionStateCache {
    entries: Arc<RwLock<HashMap<UserId, CacheEntry>>>,
    capacity: usize,
    ttl: Duration,
}

impl Default for SubscriptionStateCache {
    fn default() -> Self {
        Self::with_limits(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl SubscriptionStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
            ttl,
        }
    }

    pub async fn get(&self, user_id: &UserId) -> Option<UserSubscriptionState> {
        self.entries
            .read()
            .await
            .get(user_id)
            .filter(|entry| entry.stored_at.elapsed() <= self.ttl)
            .map(|entry| entry.state.clone())
    }

    pub async fn put(&self, state: &UserSubscriptionState) {
        let mut entries = self.entries.write().await;

        if !entries.contains_key(&state.user_id) && entries.len() >= self.capacity {
            let ttl = self.ttl;
            entries.retain(|_, entry| entry.stored_at.elapsed() <= ttl);

            if entries.len() >= self.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.stored_at)
                    .map(|(user_id, _)| user_id.clone());
                if let Some(user_id) = oldest {
                    entries.remove(&user_id);
                }
            }
        }

        entries.insert(
            state.user_id.clone(),
            CacheEntry {
                state: state.clone(),
                stored_at: Instant::now(),
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Reads a user's record through the cache.
    ///
    /// A fresh read refreshes the cache; a failed or slow read serves the
    /// cached record, or `None` (the Freemium default) when nothing is cached.
    pub async fn read_through(
        &self,
        repository: &dyn SubscriptionRepository,
        user_id: &UserId,
        timeout: Duration,
    ) -> Fetched<Option<UserSubscriptionState>> {
        let cached = self.get(user_id).await;
        let fetched =
            fetch_with_fallback(repository.find_by_user(user_id), timeout, move || cached).await;

        if let Fetched::Fresh(Some(state)) = &fetched {
            self.put(state).await;
        }
        fetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySubscriptionRepository;
    use crate::domain::foundation::CheckoutSessionId;
    use crate::domain::subscription::PlanCatalog;
    use crate::ports::SaveOutcome;
    use async_trait::async_trait;

    struct UnavailableRepository;

    #[async_trait]
    impl SubscriptionRepository for UnavailableRepository {
        async fn find_by_user(
            &self,
            _user_id: &UserId,
        ) -> Result<Option<UserSubscriptionState>, DomainError> {
            Err(DomainError::database("store offline"))
        }

        async fn create(
            &self,
            _state: &UserSubscriptionState,
        ) -> Result<UserSubscriptionState, DomainError> {
            Err(DomainError::database("store offline"))
        }

        async fn compare_and_swap(
            &self,
            _expected: Option<&CheckoutSessionId>,
            _state: &UserSubscriptionState,
        ) -> Result<SaveOutcome, DomainError> {
            Err(DomainError::database("store offline"))
        }

        async fn record_credit_use(
            &self,
            _user_id: &UserId,
        ) -> Result<UserSubscriptionState, DomainError> {
            Err(DomainError::database("store offline"))
        }
    }

    #[tokio::test]
    async fn fast_read_is_fresh() {
        let result = fetch_with_fallback(async { Ok(7u32) }, Duration::from_millis(50), || 0).await;
        assert_eq!(result, Fetched::Fresh(7));
    }

    #[tokio::test]
    async fn failing_read_serves_fallback_with_reason() {
        let result = fetch_with_fallback(
            async { Err::<u32, _>(DomainError::database("connection refused")) },
            Duration::from_millis(50),
            || 5,
        )
        .await;

        assert!(result.is_fallback());
        assert_eq!(*result.value(), 5);
        assert!(matches!(
            result,
            Fetched::Fallback { reason: FallbackReason::StoreError(ref m), .. } if m.contains("connection refused")
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_read_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(1u32)
        };
        let result = fetch_with_fallback(slow, Duration::from_millis(100), || 0).await;
        assert_eq!(
            result,
            Fetched::Fallback {
                value: 0,
                reason: FallbackReason::TimedOut(Duration::from_millis(100)),
            }
        );
    }

    #[tokio::test]
    async fn cache_returns_last_put() {
        let cache = SubscriptionStateCache::new();
        let user = UserId::new("u1").unwrap();
        assert!(cache.get(&user).await.is_none());

        let mut state = UserSubscriptionState::new_freemium(user.clone(), &PlanCatalog::standard());
        cache.put(&state).await;
        state.credits_used = 4;
        cache.put(&state).await;

        assert_eq!(cache.get(&user).await.unwrap().credits_used, 4);
    }

    #[tokio::test]
    async fn read_through_refreshes_cache_on_fresh_read() {
        let repo = InMemorySubscriptionRepository::new();
        let user = UserId::new("u1").unwrap();
        repo.insert(UserSubscriptionState::new_freemium(user.clone(), &PlanCatalog::standard()))
            .await;
        let cache = SubscriptionStateCache::new();

        let fetched = cache.read_through(&repo, &user, Duration::from_millis(100)).await;

        assert!(!fetched.is_fallback());
        assert!(cache.get(&user).await.is_some());
    }

    #[tokio::test]
    async fn read_through_serves_cached_record_when_store_fails() {
        let user = UserId::new("u1").unwrap();
        let cache = SubscriptionStateCache::new();
        let mut known = UserSubscriptionState::new_freemium(user.clone(), &PlanCatalog::standard());
        known.credits_used = 2;
        cache.put(&known).await;

        let fetched = cache
            .read_through(&UnavailableRepository, &user, Duration::from_millis(100))
            .await;

        assert!(fetched.is_fallback());
        assert_eq!(fetched.value().as_ref().map(|s| s.credits_used), Some(2));
    }

    #[tokio::test]
    async fn read_through_without_cache_falls_back_to_default() {
        let user = UserId::new("nobody").unwrap();
        let fetched = SubscriptionStateCache::new()
            .read_through(&UnavailableRepository, &user, Duration::from_millis(100))
            .await;

        assert!(fetched.is_fallback());
        assert!(fetched.value().is_none());
    }

    fn freemium(id: &str) -> UserSubscriptionState {
        UserSubscriptionState::new_freemium(UserId::new(id).unwrap(), &PlanCatalog::standard())
    }

    #[tokio::test(start_paused = true)]
    async fn full_cache_evicts_oldest_user() {
        let cache = SubscriptionStateCache::with_limits(2, Duration::from_secs(600));
        cache.put(&freemium("u1")).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.put(&freemium("u2")).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.put(&freemium("u3")).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get(&UserId::new("u1").unwrap()).await.is_none());
        assert!(cache.get(&UserId::new("u3").unwrap()).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn refreshing_a_known_user_does_not_evict() {
        let cache = SubscriptionStateCache::with_limits(2, Duration::from_secs(600));
        cache.put(&freemium("u1")).await;
        cache.put(&freemium("u2")).await;
        cache.put(&freemium("u1")).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get(&UserId::new("u2").unwrap()).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_not_served_as_fallback() {
        let cache = SubscriptionStateCache::with_limits(10, Duration::from_secs(60));
        let user = UserId::new("u1").unwrap();
        cache.put(&freemium("u1")).await;

        tokio::time::advance(Duration::from_secs(61)).await;
        let fetched = cache
            .read_through(&UnavailableRepository, &user, Duration::from_millis(100))
            .await;

        assert!(fetched.is_fallback());
        assert!(fetched.value().is_none());
    }
}
