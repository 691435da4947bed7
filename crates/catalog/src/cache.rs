//! In-memory catalog snapshot, replaced wholesale on each refresh.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use venuewatch_core::Venue;

/// Holds the most recently fetched catalog snapshot.
///
/// The snapshot is swapped as a whole value, so readers never observe a
/// partially updated list. An empty replacement is refused: a transient
/// upstream outage must not wipe known state.
pub struct CatalogCache {
    venues: RwLock<Arc<Vec<Venue>>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self {
            venues: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Swap in a fresh snapshot. Returns `false` (keeping the previous
    /// snapshot) when the new one is empty.
    pub async fn replace(&self, venues: Vec<Venue>) -> bool {
        if venues.is_empty() {
            warn!("Refusing to replace catalog with an empty snapshot");
            return false;
        }
        let count = venues.len();
        let mut guard = self.venues.write().await;
        *guard = Arc::new(venues);
        drop(guard);
        debug!(venues = count, "Catalog snapshot replaced");
        true
    }

    /// Current snapshot, cheap to clone and safe to iterate outside the lock.
    pub async fn snapshot(&self) -> Arc<Vec<Venue>> {
        self.venues.read().await.clone()
    }

    /// Exact, case-sensitive lookup by display name. This is the matching
    /// key for notifications and deliberately stricter than `search`.
    pub async fn find_exact(&self, name: &str) -> Option<Venue> {
        let snapshot = self.venues.read().await;
        snapshot.iter().find(|v| v.name == name).cloned()
    }

    /// Case-insensitive substring search, preserving catalog order, capped
    /// at `cap` results. Used for human browsing, never for matching.
    pub async fn search(&self, query: &str, cap: usize) -> Vec<Venue> {
        let needle = query.to_lowercase();
        let snapshot = self.venues.read().await;
        snapshot
            .iter()
            .filter(|v| v.name.to_lowercase().contains(&needle))
            .take(cap)
            .cloned()
            .collect()
    }

    pub async fn is_empty(&self) -> bool {
        self.venues.read().await.is_empty()
    }
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}
