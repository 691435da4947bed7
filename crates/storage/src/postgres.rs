//! PostgreSQL store (sqlx).
//!
//! The uniqueness invariant lives here: a partial unique index on
//! `(recipient_id, venue_name) WHERE status = 'active'` makes the insert a
//! conditional write, so concurrent subscribe requests can't create
//! duplicate active rows.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use venuewatch_core::config::PostgresConfig;
use venuewatch_core::{ArchiveReason, Subscription, SubscriptionStatus, UserDetails};

use crate::traits::{AuditLog, InsertOutcome, StoreError, SubscriptionStore};

const SUBSCRIPTION_COLUMNS: &str = "id, recipient_id, venue_name, venue_id, status, created_at";

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    recipient_id: i64,
    venue_name: String,
    venue_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl SubscriptionRow {
    fn into_domain(self) -> Result<Subscription, StoreError> {
        let status = match self.status.as_str() {
            "active" => SubscriptionStatus::Active,
            "fulfilled" => SubscriptionStatus::Archived { reason: ArchiveReason::Fulfilled },
            "expired" => SubscriptionStatus::Archived { reason: ArchiveReason::Expired },
            "cancelled" => SubscriptionStatus::Archived { reason: ArchiveReason::Cancelled },
            other => return Err(StoreError::Other(format!("unknown subscription status '{}'", other))),
        };
        Ok(Subscription {
            id: self.id,
            recipient_id: self.recipient_id,
            venue_name: self.venue_name,
            venue_id: self.venue_id,
            status,
            created_at: self.created_at,
        })
    }
}

fn rows_to_domain(rows: Vec<SubscriptionRow>) -> Result<Vec<Subscription>, StoreError> {
    rows.into_iter().map(SubscriptionRow::into_domain).collect()
}

/// sqlx-backed subscription store.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and run migrations.
    pub async fn connect(config: &PostgresConfig) -> Result<Self, StoreError> {
        let pool = PgPool::connect(&config.connection_string()).await?;
        info!("PostgreSQL connected: {}", config.host);
        sqlx::migrate!("../../migrations").run(&pool).await?;
        info!("Database migrations applied");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl SubscriptionStore for PgStore {
    async fn find_active(&self, recipient_id: Option<i64>) -> Result<Vec<Subscription>, StoreError> {
        let rows = match recipient_id {
            Some(recipient) => {
                sqlx::query_as::<_, SubscriptionRow>(&format!(
                    "SELECT {} FROM subscriptions \
                     WHERE status = 'active' AND recipient_id = $1 \
                     ORDER BY created_at",
                    SUBSCRIPTION_COLUMNS
                ))
                .bind(recipient)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, SubscriptionRow>(&format!(
                    "SELECT {} FROM subscriptions WHERE status = 'active' ORDER BY created_at",
                    SUBSCRIPTION_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows_to_domain(rows)
    }

    async fn find_one(
        &self,
        recipient_id: i64,
        venue_name: &str,
    ) -> Result<Option<Subscription>, StoreError> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {} FROM subscriptions \
             WHERE status = 'active' AND recipient_id = $1 AND venue_name = $2",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(recipient_id)
        .bind(venue_name)
        .fetch_optional(&self.pool)
        .await?;
        row.map(SubscriptionRow::into_domain).transpose()
    }

    async fn insert(
        &self,
        recipient_id: i64,
        venue_name: &str,
        venue_id: Option<String>,
    ) -> Result<InsertOutcome, StoreError> {
        let inserted = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "INSERT INTO subscriptions (id, recipient_id, venue_name, venue_id, status, created_at) \
             VALUES ($1, $2, $3, $4, 'active', $5) \
             ON CONFLICT (recipient_id, venue_name) WHERE status = 'active' DO NOTHING \
             RETURNING {}",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(recipient_id)
        .bind(venue_name)
        .bind(venue_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(row) => Ok(InsertOutcome::Created(row.into_domain()?)),
            None => {
                // Conflict: another active subscription for the pair exists.
                let existing = self.find_one(recipient_id, venue_name).await?.ok_or_else(|| {
                    StoreError::Other(format!(
                        "insert conflict for ({}, '{}') but no active row found",
                        recipient_id, venue_name
                    ))
                })?;
                Ok(InsertOutcome::AlreadyActive(existing))
            }
        }
    }

    async fn archive(
        &self,
        recipient_id: i64,
        venue_name: &str,
        reason: ArchiveReason,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE subscriptions SET status = $3 \
             WHERE status = 'active' AND recipient_id = $1 AND venue_name = $2",
        )
        .bind(recipient_id)
        .bind(venue_name)
        .bind(reason.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_expired(&self, ttl: Duration) -> Result<Vec<Subscription>, StoreError> {
        let cutoff = Utc::now() - ttl;
        let rows = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {} FROM subscriptions \
             WHERE status = 'active' AND created_at < $1 \
             ORDER BY created_at",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        rows_to_domain(rows)
    }

    async fn save_user(&self, user: &UserDetails) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (user_id, recipient_id, first_name, last_name, username, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user.user_id)
        .bind(user.recipient_id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.username)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Audit sink writing to the `audit_log` table. Failures are logged, never
/// surfaced — audit is fire-and-forget.
pub struct PgAudit {
    pool: PgPool,
}

impl PgAudit {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AuditLog for PgAudit {
    async fn record(&self, event: &str, recipient_id: i64, venue_name: &str) {
        let result = sqlx::query(
            "INSERT INTO audit_log (event_name, recipient_id, venue_name, created_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(event)
        .bind(recipient_id)
        .bind(venue_name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            warn!(event, recipient_id, venue = venue_name, error = %e, "Audit insert failed");
        }
    }
}
