//! Intent handlers for inbound user requests.
//!
//! The transport (Telegram long-poll) maps raw updates to [`Intent`]s; the
//! handlers here own the request-path behavior: search, subscribe,
//! unsubscribe, list. Any handler error degrades to a generic apology reply.

use std::sync::Arc;

use tracing::{error, info};

use venuewatch_catalog::{CatalogCache, CatalogProvider};
use venuewatch_core::{events, ArchiveReason, UserDetails, Venue};
use venuewatch_notify::{Action, Messenger};
use venuewatch_storage::{AuditLog, SubscriptionStore};

/// A parsed user request.
#[derive(Debug, Clone)]
pub enum Intent {
    /// First contact; carries the user's profile details.
    Start(UserDetails),
    /// Show active subscriptions.
    List,
    /// Free-text venue search.
    Search(String),
    /// Subscribe to a venue by its display name.
    Subscribe(String),
    /// Remove the subscription for a venue.
    Unsubscribe(String),
}

/// Request-path dependencies, shared across handler invocations.
pub struct Handlers {
    pub cache: Arc<CatalogCache>,
    pub provider: Arc<dyn CatalogProvider>,
    pub store: Arc<dyn SubscriptionStore>,
    pub messenger: Arc<dyn Messenger>,
    pub audit: Arc<dyn AuditLog>,
    /// Maximum venues in a search reply.
    pub search_cap: usize,
    /// Mentioned in the subscribe confirmation.
    pub ttl_hours: u32,
}

impl Handlers {
    /// Dispatch one intent. Never returns an error: failures are logged and
    /// the user gets a generic apology.
    pub async fn handle(&self, recipient_id: i64, intent: Intent) {
        self.messenger.typing(recipient_id).await;
        info!(recipient_id, intent = ?intent_name(&intent), "Handling intent");

        let result = match intent {
            Intent::Start(user) => self.start(recipient_id, user).await,
            Intent::List => self.list(recipient_id).await,
            Intent::Search(query) => self.search(recipient_id, &query).await,
            Intent::Subscribe(name) => self.subscribe(recipient_id, &name).await,
            Intent::Unsubscribe(name) => self.unsubscribe(recipient_id, &name).await,
        };

        if let Err(e) = result {
            error!(recipient_id, error = %e, "Intent handling failed");
            let _ = self
                .messenger
                .deliver(recipient_id, "Sorry, but something went wrong", &[])
                .await;
        }
    }

    async fn start(&self, recipient_id: i64, user: UserDetails) -> anyhow::Result<()> {
        let reply = "Hello :)\n\
                     Please enter the restaurant name you want to check.\n\
                     It can be in English.\n\
                     To show current notification registrations please write: /show";
        self.messenger.deliver(recipient_id, reply, &[]).await?;
        self.store.save_user(&user).await?;
        self.audit.record(events::START, recipient_id, "").await;
        Ok(())
    }

    async fn list(&self, recipient_id: i64) -> anyhow::Result<()> {
        let subscriptions = self.store.find_active(Some(recipient_id)).await?;
        if subscriptions.is_empty() {
            self.messenger
                .deliver(recipient_id, "You don't have any active subscriptions yet", &[])
                .await?;
        } else {
            for sub in &subscriptions {
                let actions = [Action::callback("Remove", format!("remove - {}", sub.venue_name))];
                self.messenger
                    .deliver(recipient_id, &sub.venue_name, &actions)
                    .await?;
            }
        }
        self.audit.record(events::LIST, recipient_id, "").await;
        Ok(())
    }

    async fn search(&self, recipient_id: i64, query: &str) -> anyhow::Result<()> {
        self.audit.record(events::SEARCH, recipient_id, query).await;

        let hits = self.cache.search(query, self.search_cap).await;
        if hits.is_empty() {
            let reply = format!(
                "I am sorry, I didn't find any restaurants matching your search - \"{}\"",
                query
            );
            self.messenger.deliver(recipient_id, &reply, &[]).await?;
            return Ok(());
        }

        // Enrichment fills the open/closed flag so the labels can
        // distinguish "Busy" (open but not taking orders) from "Closed".
        let enriched = self.provider.enrich(hits).await;
        let actions: Vec<Action> = enriched.iter().map(venue_option).collect();
        let reply = "Choose one of the above restaurants so I can notify you when it's online";
        self.messenger.deliver(recipient_id, reply, &actions).await?;
        Ok(())
    }

    async fn subscribe(&self, recipient_id: i64, venue_name: &str) -> anyhow::Result<()> {
        self.audit.record(events::SUBSCRIBE, recipient_id, venue_name).await;

        if self.store.find_one(recipient_id, venue_name).await?.is_some() {
            let reply = format!(
                "It seems you already have a subscription for {}.\n\n\
                 Let's wait a few minutes - it might open soon.",
                venue_name
            );
            self.messenger.deliver(recipient_id, &reply, &[]).await?;
            return Ok(());
        }

        let known = self.cache.find_exact(venue_name).await;
        if let Some(venue) = known.as_ref().filter(|v| v.is_online) {
            // Already orderable; no point subscribing.
            let reply = format!(
                "It looks like {} is open now\n\nGo ahead and order your food :)",
                venue.name
            );
            let actions = [Action::url(&venue.name, self.provider.venue_link(venue))];
            self.messenger.deliver(recipient_id, &reply, &actions).await?;
            return Ok(());
        }

        let venue_id = known.map(|v| v.id);
        self.store.insert(recipient_id, venue_name, venue_id).await?;
        let reply = format!(
            "No problem, you will be notified once {} is open.\n\n\
             FYI: If the venue won't open soon, registration will be removed after {} hours.\n\n\
             You can search and register for another restaurant if you like.",
            venue_name, self.ttl_hours
        );
        self.messenger.deliver(recipient_id, &reply, &[]).await?;
        Ok(())
    }

    async fn unsubscribe(&self, recipient_id: i64, venue_name: &str) -> anyhow::Result<()> {
        self.audit.record(events::UNSUBSCRIBE, recipient_id, venue_name).await;

        if self.store.find_one(recipient_id, venue_name).await?.is_some() {
            self.store
                .archive(recipient_id, venue_name, ArchiveReason::Cancelled)
                .await?;
            let reply = format!("Subscription for {} was removed", venue_name);
            self.messenger.deliver(recipient_id, &reply, &[]).await?;
        } else {
            let reply = format!(
                "It seems you don't have a subscription for {}.\n\n\
                 You can search and register for another restaurant if you like",
                venue_name
            );
            self.messenger.deliver(recipient_id, &reply, &[]).await?;
        }
        Ok(())
    }
}

fn intent_name(intent: &Intent) -> &'static str {
    match intent {
        Intent::Start(_) => "start",
        Intent::List => "list",
        Intent::Search(_) => "search",
        Intent::Subscribe(_) => "subscribe",
        Intent::Unsubscribe(_) => "unsubscribe",
    }
}

/// One selectable search result: label carries the availability.
fn venue_option(venue: &Venue) -> Action {
    Action::callback(
        format!("{} - {}", venue.name, venue.availability_label()),
        venue.name.clone(),
    )
}
