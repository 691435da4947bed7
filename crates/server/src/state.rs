use std::sync::Arc;

use chrono::{DateTime, Utc};

use venuewatch_catalog::CatalogCache;
use venuewatch_core::Config;
use venuewatch_storage::SubscriptionStore;

pub struct AppState {
    pub config: Config,
    pub cache: Arc<CatalogCache>,
    pub store: Arc<dyn SubscriptionStore>,
    pub channel_name: String,
    pub started_at: DateTime<Utc>,
}
