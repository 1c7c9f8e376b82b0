//! PostgreSQL implementation of SubscriptionRepository.
//!
//! One row per user in `user_subscriptions`. The reconciliation write is a
//! single conditional `UPDATE` keyed on the session marker, so two writers
//! racing on the same user cannot both apply. The same statement refuses a
//! session already present in `processed_session_ids`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{CheckoutSessionId, DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::subscription::{PlanId, UserSubscriptionState};
use crate::ports::{SaveOutcome, SubscriptionRepository};

pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a subscription record.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    user_id: String,
    plan: Option<String>,
    credits_used: i32,
    credits_limit: i32,
    last_processed_session_id: Option<String>,
    processed_session_ids: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for UserSubscriptionState {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let user_id = UserId::new(row.user_id)
            .map_err(|e| DomainError::database(format!("Invalid user_id: {}", e)))?;

        let last_processed_session_id = row
            .last_processed_session_id
            .filter(|s| !s.trim().is_empty())
            .map(CheckoutSessionId::new)
            .transpose()
            .map_err(|e| DomainError::database(format!("Invalid session id: {}", e)))?;

        let processed_session_ids = row
            .processed_session_ids
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .map(CheckoutSessionId::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::database(format!("Invalid session id: {}", e)))?;

        Ok(UserSubscriptionState {
            user_id,
            // An unrecognised plan reads as "no plan", i.e. Freemium.
            plan: row.plan.as_deref().and_then(PlanId::parse),
            credits_used: to_credits(row.credits_used, "credits_used")?,
            credits_limit: to_credits(row.credits_limit, "credits_limit")?,
            last_processed_session_id,
            processed_session_ids,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn to_credits(value: i32, column: &str) -> Result<u32, DomainError> {
    u32::try_from(value)
        .map_err(|_| DomainError::database(format!("Negative {} value: {}", column, value)))
}

fn to_column(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn session_column(ids: &[CheckoutSessionId]) -> Vec<String> {
    ids.iter().map(|s| s.as_str().to_string()).collect()
}

fn query_error(action: &str, err: sqlx::Error) -> DomainError {
    DomainError::database(format!("Failed to {}: {}", action, err))
}

const SELECT_COLUMNS: &str = "user_id, plan, credits_used, credits_limit, \
     last_processed_session_id, processed_session_ids, created_at, updated_at";

/// Blank markers compare as NULL, matching how rows are read back.
const COMPARE_AND_SWAP_SQL: &str = r#"
    UPDATE user_subscriptions SET
        plan = $2,
        credits_used = $3,
        credits_limit = $4,
        last_processed_session_id = $5,
        processed_session_ids = $6,
        updated_at = $7
    WHERE user_id = $1
      AND NULLIF(btrim(last_processed_session_id), '') IS NOT DISTINCT FROM $8
      AND NOT (COALESCE($5, '') = ANY(processed_session_ids))
"#;

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserSubscriptionState>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM user_subscriptions WHERE user_id = $1",
            SELECT_COLUMNS
        ))
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("find subscription", e))?;

        row.map(UserSubscriptionState::try_from).transpose()
    }

    async fn create(
        &self,
        state: &UserSubscriptionState,
    ) -> Result<UserSubscriptionState, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO user_subscriptions (
                user_id, plan, credits_used, credits_limit,
                last_processed_session_id, processed_session_ids, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(state.user_id.as_str())
        .bind(state.plan.map(|p| p.as_str()))
        .bind(to_column(state.credits_used))
        .bind(to_column(state.credits_limit))
        .bind(state.last_processed_session_id.as_ref().map(|s| s.as_str()))
        .bind(session_column(&state.processed_session_ids))
        .bind(state.created_at.as_datetime())
        .bind(state.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| query_error("create subscription", e))?;

        // Another login may have won the insert; return whatever is stored.
        self.find_by_user(&state.user_id).await?.ok_or_else(|| {
            DomainError::new(
                ErrorCode::SubscriptionNotFound,
                format!("Subscription for {} vanished after insert", state.user_id),
            )
        })
    }

    async fn compare_and_swap(
        &self,
        expected_last_session: Option<&CheckoutSessionId>,
        new_state: &UserSubscriptionState,
    ) -> Result<SaveOutcome, DomainError> {
        let result = sqlx::query(COMPARE_AND_SWAP_SQL)
        .bind(new_state.user_id.as_str())
        .bind(new_state.plan.map(|p| p.as_str()))
        .bind(to_column(new_state.credits_used))
        .bind(to_column(new_state.credits_limit))
        .bind(new_state.last_processed_session_id.as_ref().map(|s| s.as_str()))
        .bind(session_column(&new_state.processed_session_ids))
        .bind(new_state.updated_at.as_datetime())
        .bind(expected_last_session.map(|s| s.as_str()))
        .execute(&self.pool)
        .await
        .map_err(|e| query_error("update subscription", e))?;

        if result.rows_affected() == 1 {
            return Ok(SaveOutcome::Applied);
        }

        // Zero rows: the marker moved, the session is already in the
        // history, or the record does not exist.
        match self.find_by_user(&new_state.user_id).await? {
            Some(_) => Ok(SaveOutcome::Conflict),
            None => Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                format!("Subscription not found for {}", new_state.user_id),
            )),
        }
    }

    async fn record_credit_use(
        &self,
        user_id: &UserId,
    ) -> Result<UserSubscriptionState, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            r#"
            UPDATE user_subscriptions SET
                credits_used = credits_used + 1,
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("record credit use", e))?;

        match row {
            Some(row) => row.try_into(),
            None => Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                format!("Subscription not found for {}", user_id),
            )),
        }
    }
}
