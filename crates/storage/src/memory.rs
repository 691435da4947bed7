//! In-memory store, used when PostgreSQL is not configured and as the
//! default test double.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{Duration, Utc};

use venuewatch_core::{ArchiveReason, Subscription, SubscriptionStatus, UserDetails};

use crate::traits::{InsertOutcome, StoreError, SubscriptionStore};

/// Process-local subscription store. Loses state on restart, which is
/// acceptable for the dev/default path; production uses `PgStore`.
pub struct MemoryStore {
    subscriptions: RwLock<Vec<Subscription>>,
    users: RwLock<HashMap<i64, UserDetails>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(Vec::new()),
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a pre-built subscription record, bypassing the duplicate
    /// check. Lets tests seed records with a chosen `created_at`.
    pub fn seed(&self, subscription: Subscription) {
        self.subscriptions
            .write()
            .expect("subscriptions lock poisoned")
            .push(subscription);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SubscriptionStore for MemoryStore {
    async fn find_active(&self, recipient_id: Option<i64>) -> Result<Vec<Subscription>, StoreError> {
        let subs = self.subscriptions.read().expect("subscriptions lock poisoned");
        Ok(subs
            .iter()
            .filter(|s| s.status.is_active())
            .filter(|s| recipient_id.map(|r| s.recipient_id == r).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn find_one(
        &self,
        recipient_id: i64,
        venue_name: &str,
    ) -> Result<Option<Subscription>, StoreError> {
        let subs = self.subscriptions.read().expect("subscriptions lock poisoned");
        Ok(subs
            .iter()
            .find(|s| {
                s.status.is_active() && s.recipient_id == recipient_id && s.venue_name == venue_name
            })
            .cloned())
    }

    async fn insert(
        &self,
        recipient_id: i64,
        venue_name: &str,
        venue_id: Option<String>,
    ) -> Result<InsertOutcome, StoreError> {
        let mut subs = self.subscriptions.write().expect("subscriptions lock poisoned");
        if let Some(existing) = subs.iter().find(|s| {
            s.status.is_active() && s.recipient_id == recipient_id && s.venue_name == venue_name
        }) {
            return Ok(InsertOutcome::AlreadyActive(existing.clone()));
        }
        let subscription = Subscription::new(recipient_id, venue_name, venue_id);
        subs.push(subscription.clone());
        Ok(InsertOutcome::Created(subscription))
    }

    async fn archive(
        &self,
        recipient_id: i64,
        venue_name: &str,
        reason: ArchiveReason,
    ) -> Result<(), StoreError> {
        let mut subs = self.subscriptions.write().expect("subscriptions lock poisoned");
        if let Some(sub) = subs.iter_mut().find(|s| {
            s.status.is_active() && s.recipient_id == recipient_id && s.venue_name == venue_name
        }) {
            sub.status = SubscriptionStatus::Archived { reason };
        }
        Ok(())
    }

    async fn find_expired(&self, ttl: Duration) -> Result<Vec<Subscription>, StoreError> {
        let cutoff = Utc::now() - ttl;
        let subs = self.subscriptions.read().expect("subscriptions lock poisoned");
        Ok(subs
            .iter()
            .filter(|s| s.status.is_active() && s.created_at < cutoff)
            .cloned()
            .collect())
    }

    async fn save_user(&self, user: &UserDetails) -> Result<(), StoreError> {
        let mut users = self.users.write().expect("users lock poisoned");
        users.entry(user.user_id).or_insert_with(|| user.clone());
        Ok(())
    }
}
