//! Shared test doubles for the worker's collaborator traits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use venuewatch_catalog::{CatalogError, CatalogProvider};
use venuewatch_core::Venue;
use venuewatch_notify::{Action, Messenger, NotifyError};
use venuewatch_storage::AuditLog;

pub fn venue(name: &str, slug: &str, area: &str, is_online: bool) -> Venue {
    Venue {
        id: format!("id-{}", slug),
        name: name.to_string(),
        is_online,
        is_open: None,
        area: area.to_string(),
        slug: slug.to_string(),
    }
}

/// Catalog provider with settable state: `Some(venues)` fetches them,
/// `None` simulates an upstream failure.
pub struct MockProvider {
    venues: Mutex<Option<Vec<Venue>>>,
}

impl MockProvider {
    pub fn empty() -> Self {
        Self::with_venues(Vec::new())
    }

    pub fn with_venues(venues: Vec<Venue>) -> Self {
        Self {
            venues: Mutex::new(Some(venues)),
        }
    }

    pub fn set_venues(&self, venues: Vec<Venue>) {
        *self.venues.lock().unwrap() = Some(venues);
    }

    pub fn set_failure(&self) {
        *self.venues.lock().unwrap() = None;
    }
}

#[async_trait::async_trait]
impl CatalogProvider for MockProvider {
    async fn fetch_catalog(&self) -> Result<Vec<Venue>, CatalogError> {
        self.venues
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| CatalogError::Malformed("mock upstream failure".to_string()))
    }

    async fn enrich(&self, venues: Vec<Venue>) -> Vec<Venue> {
        venues
    }

    fn venue_link(&self, venue: &Venue) -> String {
        format!("https://wolt.com/en/isr/{}/restaurant/{}", venue.area, venue.slug)
    }
}

/// Messenger recording every delivery; optionally fails each one.
pub struct MockMessenger {
    deliveries: Mutex<Vec<(i64, String, Vec<Action>)>>,
    should_fail: AtomicBool,
}

impl MockMessenger {
    pub fn new() -> Self {
        Self {
            deliveries: Mutex::new(Vec::new()),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn failing() -> Self {
        let messenger = Self::new();
        messenger.should_fail.store(true, Ordering::SeqCst);
        messenger
    }

    pub fn deliveries(&self) -> Vec<(i64, String, Vec<Action>)> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Messenger for MockMessenger {
    async fn deliver(
        &self,
        recipient_id: i64,
        text: &str,
        actions: &[Action],
    ) -> Result<(), NotifyError> {
        self.deliveries
            .lock()
            .unwrap()
            .push((recipient_id, text.to_string(), actions.to_vec()));
        if self.should_fail.load(Ordering::SeqCst) {
            Err(NotifyError::Rejected("mock failure".to_string()))
        } else {
            Ok(())
        }
    }

    fn channel_name(&self) -> &str {
        "mock"
    }
}

/// Audit log recording `(event, recipient, venue)` triples.
pub struct MockAudit {
    events: Mutex<Vec<(String, i64, String)>>,
}

impl MockAudit {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<(String, i64, String)> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AuditLog for MockAudit {
    async fn record(&self, event: &str, recipient_id: i64, venue_name: &str) {
        self.events
            .lock()
            .unwrap()
            .push((event.to_string(), recipient_id, venue_name.to_string()));
    }
}
