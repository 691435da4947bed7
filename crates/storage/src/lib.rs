//! Subscription persistence and audit logging.
//!
//! This crate provides:
//! - `SubscriptionStore` trait — the core's persistence collaborator
//! - `AuditLog` trait — fire-and-forget analytics events
//! - in-memory implementation (default, and the test double of choice)
//! - PostgreSQL implementation (sqlx, enabled when PG is configured)

pub mod memory;
pub mod postgres;
pub mod traits;

pub use memory::MemoryStore;
pub use postgres::{PgAudit, PgStore};
pub use traits::{AuditLog, InsertOutcome, StoreError, SubscriptionStore, TracingAudit};
