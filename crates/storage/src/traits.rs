//! Store and audit collaborator contracts.

use chrono::Duration;

use venuewatch_core::{ArchiveReason, Subscription, UserDetails};

/// Errors from the persistence collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("{0}")]
    Other(String),
}

/// Result of a conditional subscription insert.
///
/// At most one Active subscription may exist per `(recipient, venue name)`
/// pair; inserting over an existing one is a no-op returning that record.
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    Created(Subscription),
    AlreadyActive(Subscription),
}

impl InsertOutcome {
    pub fn subscription(&self) -> &Subscription {
        match self {
            InsertOutcome::Created(sub) | InsertOutcome::AlreadyActive(sub) => sub,
        }
    }

    pub fn created(&self) -> bool {
        matches!(self, InsertOutcome::Created(_))
    }
}

/// Persistence collaborator for subscriptions and user records.
///
/// The store owns the uniqueness invariant (conditional write); the core
/// holds no cross-request locks.
#[async_trait::async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Active subscriptions, optionally filtered to one recipient.
    async fn find_active(&self, recipient_id: Option<i64>) -> Result<Vec<Subscription>, StoreError>;

    /// The active subscription for a pair, if any.
    async fn find_one(
        &self,
        recipient_id: i64,
        venue_name: &str,
    ) -> Result<Option<Subscription>, StoreError>;

    /// Conditionally create an active subscription for the pair.
    async fn insert(
        &self,
        recipient_id: i64,
        venue_name: &str,
        venue_id: Option<String>,
    ) -> Result<InsertOutcome, StoreError>;

    /// Archive the active subscription for a pair. Archiving a pair with no
    /// active subscription is a no-op.
    async fn archive(
        &self,
        recipient_id: i64,
        venue_name: &str,
        reason: ArchiveReason,
    ) -> Result<(), StoreError>;

    /// Active subscriptions older than `ttl`.
    async fn find_expired(&self, ttl: Duration) -> Result<Vec<Subscription>, StoreError>;

    /// Save user details on first contact; later contacts are no-ops.
    async fn save_user(&self, user: &UserDetails) -> Result<(), StoreError>;
}

/// Fire-and-forget analytics events. Implementations log failures and never
/// propagate them — an audit hiccup must not affect request or tick handling.
#[async_trait::async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, event: &str, recipient_id: i64, venue_name: &str);
}

/// Audit sink used when no database is configured: events go to the log.
pub struct TracingAudit;

#[async_trait::async_trait]
impl AuditLog for TracingAudit {
    async fn record(&self, event: &str, recipient_id: i64, venue_name: &str) {
        tracing::info!(event, recipient_id, venue = venue_name, "audit");
    }
}
