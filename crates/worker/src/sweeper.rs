//! Archives subscriptions whose time-to-live elapsed without a match.

use chrono::Duration;
use futures::future::join_all;
use tracing::{info, warn};

use venuewatch_core::{events, ArchiveReason, Subscription};
use venuewatch_notify::Messenger;
use venuewatch_storage::{AuditLog, SubscriptionStore};

use crate::interval::AwakeWindow;

/// One expiration sweep. Every active subscription older than `ttl_hours`
/// is archived and audited; the user is additionally told their
/// subscription was removed, but only when `hour` falls inside the awake
/// window. Returns the number of expired subscriptions.
pub async fn sweep_expired(
    store: &dyn SubscriptionStore,
    messenger: &dyn Messenger,
    audit: &dyn AuditLog,
    ttl_hours: u32,
    hour: u32,
    window: AwakeWindow,
) -> usize {
    let expired = match store.find_expired(Duration::hours(ttl_hours as i64)).await {
        Ok(subs) => subs,
        Err(e) => {
            warn!(error = %e, "Could not read expired subscriptions, skipping sweep");
            return 0;
        }
    };
    if expired.is_empty() {
        return 0;
    }

    let count = expired.len();
    let notify_user = window.contains(hour);
    join_all(
        expired
            .into_iter()
            .map(|sub| expire(sub, store, messenger, audit, ttl_hours, notify_user)),
    )
    .await;

    info!(expired = count, notified = notify_user, "Expiration sweep complete");
    count
}

async fn expire(
    sub: Subscription,
    store: &dyn SubscriptionStore,
    messenger: &dyn Messenger,
    audit: &dyn AuditLog,
    ttl_hours: u32,
    notify_user: bool,
) {
    if let Err(e) = store
        .archive(sub.recipient_id, &sub.venue_name, ArchiveReason::Expired)
        .await
    {
        warn!(
            recipient_id = sub.recipient_id,
            venue = %sub.venue_name,
            error = %e,
            "Could not archive expired subscription"
        );
    }

    if notify_user {
        let text = format!(
            "Subscription for {} was removed since it didn't open for the last {} hours",
            sub.venue_name, ttl_hours
        );
        if let Err(e) = messenger.deliver(sub.recipient_id, &text, &[]).await {
            warn!(
                recipient_id = sub.recipient_id,
                venue = %sub.venue_name,
                error = %e,
                "Expiry notice delivery failed"
            );
        }
    }

    audit
        .record(events::SUBSCRIPTION_EXPIRED, sub.recipient_id, &sub.venue_name)
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockAudit, MockMessenger};
    use chrono::Utc;
    use venuewatch_core::Subscription;
    use venuewatch_storage::MemoryStore;

    fn window() -> AwakeWindow {
        AwakeWindow { start_hour: 8, end_hour: 23 }
    }

    fn seed_aged(store: &MemoryStore, recipient: i64, name: &str, age_hours: i64) {
        let mut sub = Subscription::new(recipient, name, None);
        sub.created_at = Utc::now() - Duration::hours(age_hours);
        store.seed(sub);
    }

    #[tokio::test]
    async fn expired_subscription_is_archived_and_user_notified_by_day() {
        let store = MemoryStore::new();
        seed_aged(&store, 1, "Pizza X", 5);
        let messenger = MockMessenger::new();
        let audit = MockAudit::new();

        // TTL 4h, 14:00 — inside the awake window.
        let swept = sweep_expired(&store, &messenger, &audit, 4, 14, window()).await;

        assert_eq!(swept, 1);
        assert!(store.find_active(None).await.unwrap().is_empty());
        let deliveries = messenger.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert!(deliveries[0].1.contains("Pizza X"));
        assert!(deliveries[0].1.contains("4 hours"));
        assert_eq!(
            audit.events(),
            vec![("subscription_expired".to_string(), 1, "Pizza X".to_string())]
        );
    }

    #[tokio::test]
    async fn quiet_hours_archive_silently() {
        let store = MemoryStore::new();
        seed_aged(&store, 1, "Pizza X", 5);
        let messenger = MockMessenger::new();
        let audit = MockAudit::new();

        // 02:00 — outside the awake window.
        let swept = sweep_expired(&store, &messenger, &audit, 4, 2, window()).await;

        assert_eq!(swept, 1);
        assert!(store.find_active(None).await.unwrap().is_empty());
        assert!(messenger.deliveries().is_empty());
        assert_eq!(audit.events().len(), 1);
    }

    #[tokio::test]
    async fn fresh_subscriptions_are_not_swept() {
        let store = MemoryStore::new();
        seed_aged(&store, 1, "Pizza X", 2);
        let messenger = MockMessenger::new();
        let audit = MockAudit::new();

        let swept = sweep_expired(&store, &messenger, &audit, 4, 14, window()).await;

        assert_eq!(swept, 0);
        assert_eq!(store.find_active(None).await.unwrap().len(), 1);
        assert!(messenger.deliveries().is_empty());
        assert!(audit.events().is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_still_archives() {
        let store = MemoryStore::new();
        seed_aged(&store, 1, "Pizza X", 5);
        let messenger = MockMessenger::failing();
        let audit = MockAudit::new();

        sweep_expired(&store, &messenger, &audit, 4, 14, window()).await;

        assert!(store.find_active(None).await.unwrap().is_empty());
        assert_eq!(audit.events().len(), 1);
    }
}
