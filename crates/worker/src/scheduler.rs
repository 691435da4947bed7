//! The always-running refresh loop.

use std::sync::Arc;

use chrono::{Local, Timelike};
use tracing::{debug, info, warn};

use venuewatch_catalog::{CatalogCache, CatalogProvider};
use venuewatch_core::config::RefreshConfig;
use venuewatch_notify::Messenger;
use venuewatch_storage::{AuditLog, SubscriptionStore};

use crate::interval::{AwakeWindow, PollTier};
use crate::{matcher, sweeper};

/// Owns one tick of work: fetch → match → sweep → sleep, forever.
///
/// There is no pause or stop surface; the loop ends with the process. Each
/// step fails to a log line, never out of the loop.
pub struct RefreshScheduler {
    provider: Arc<dyn CatalogProvider>,
    cache: Arc<CatalogCache>,
    store: Arc<dyn SubscriptionStore>,
    messenger: Arc<dyn Messenger>,
    audit: Arc<dyn AuditLog>,
    refresh: RefreshConfig,
}

impl RefreshScheduler {
    pub fn new(
        provider: Arc<dyn CatalogProvider>,
        cache: Arc<CatalogCache>,
        store: Arc<dyn SubscriptionStore>,
        messenger: Arc<dyn Messenger>,
        audit: Arc<dyn AuditLog>,
        refresh: RefreshConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            store,
            messenger,
            audit,
            refresh,
        }
    }

    /// Run forever. Spawn this on the runtime at startup.
    pub async fn run(self) {
        info!("Refresh scheduler started");
        loop {
            let hour = Local::now().hour();
            self.tick(hour).await;

            let tier = PollTier::for_hour(Local::now().hour());
            let interval = tier.duration(&self.refresh);
            debug!(tier = ?tier, secs = interval.as_secs(), "Sleeping until next tick");
            tokio::time::sleep(interval).await;
        }
    }

    /// One full tick at the given local hour: refresh the catalog snapshot,
    /// alert subscribers, sweep expired subscriptions.
    pub async fn tick(&self, hour: u32) {
        self.refresh_catalog().await;

        matcher::alert_subscribers(
            &self.cache,
            self.provider.as_ref(),
            self.store.as_ref(),
            self.messenger.as_ref(),
            self.audit.as_ref(),
        )
        .await;

        sweeper::sweep_expired(
            self.store.as_ref(),
            self.messenger.as_ref(),
            self.audit.as_ref(),
            self.refresh.ttl_hours,
            hour,
            AwakeWindow::from_config(&self.refresh),
        )
        .await;
    }

    /// Fetch a fresh snapshot. Failures and empty results leave the
    /// previous snapshot in place; the next tick is the retry.
    async fn refresh_catalog(&self) {
        match self.provider.fetch_catalog().await {
            Ok(venues) if !venues.is_empty() => {
                let count = venues.len();
                if self.cache.replace(venues).await {
                    debug!(venues = count, "Catalog refreshed");
                }
            }
            Ok(_) => warn!("Catalog fetch returned no venues, keeping previous snapshot"),
            Err(e) => warn!(error = %e, "Catalog fetch failed, keeping previous snapshot"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{venue, MockAudit, MockMessenger, MockProvider};
    use venuewatch_storage::MemoryStore;

    fn refresh_config() -> RefreshConfig {
        RefreshConfig {
            fast_secs: 30,
            medium_secs: 60,
            slow_secs: 120,
            idle_secs: 900,
            ttl_hours: 4,
            awake_start_hour: 8,
            awake_end_hour: 23,
        }
    }

    struct Fixture {
        scheduler: RefreshScheduler,
        provider: Arc<MockProvider>,
        cache: Arc<CatalogCache>,
        store: Arc<MemoryStore>,
        messenger: Arc<MockMessenger>,
    }

    fn fixture(provider: MockProvider) -> Fixture {
        let provider = Arc::new(provider);
        let cache = Arc::new(CatalogCache::new());
        let store = Arc::new(MemoryStore::new());
        let messenger = Arc::new(MockMessenger::new());
        let scheduler = RefreshScheduler::new(
            provider.clone(),
            cache.clone(),
            store.clone(),
            messenger.clone(),
            Arc::new(MockAudit::new()),
            refresh_config(),
        );
        Fixture { scheduler, provider, cache, store, messenger }
    }

    #[tokio::test]
    async fn tick_refreshes_matches_and_sweeps() {
        let f = fixture(MockProvider::with_venues(vec![venue("Pizza X", "px", "tel-aviv", true)]));
        f.store.insert(1, "Pizza X", None).await.unwrap();

        f.scheduler.tick(14).await;

        assert_eq!(f.cache.snapshot().await.len(), 1);
        assert_eq!(f.messenger.deliveries().len(), 1);
        assert!(f.store.find_active(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_snapshot_and_still_matches() {
        let f = fixture(MockProvider::with_venues(vec![venue("Pizza X", "px", "tel-aviv", true)]));

        f.scheduler.tick(14).await;
        assert_eq!(f.cache.snapshot().await.len(), 1);

        // Upstream goes down; the earlier snapshot still serves matching.
        f.provider.set_failure();
        f.store.insert(1, "Pizza X", None).await.unwrap();
        f.scheduler.tick(14).await;

        assert_eq!(f.cache.snapshot().await.len(), 1);
        assert_eq!(f.messenger.deliveries().len(), 1);
    }

    #[tokio::test]
    async fn empty_fetch_keeps_previous_snapshot() {
        let f = fixture(MockProvider::with_venues(vec![venue("Pizza X", "px", "tel-aviv", true)]));

        f.scheduler.tick(14).await;
        f.provider.set_venues(Vec::new());
        f.scheduler.tick(14).await;

        assert_eq!(f.cache.snapshot().await.len(), 1);
    }
}
