//! Matches active subscriptions against the catalog snapshot and fans out
//! one-shot notifications.

use futures::future::join_all;
use tracing::{debug, info, warn};

use venuewatch_catalog::{CatalogCache, CatalogProvider};
use venuewatch_core::{events, ArchiveReason, Subscription, Venue};
use venuewatch_notify::{Action, Messenger};
use venuewatch_storage::{AuditLog, SubscriptionStore};

/// One matcher pass: every active subscription whose target is present in
/// the snapshot and online gets notified, archived, and audited.
///
/// Matches are processed concurrently; per match the three side effects are
/// all attempted even when one fails, and delivery failure still archives
/// (so a flaky transport can't cause duplicate alerts next tick). Returns
/// the number of matches.
pub async fn alert_subscribers(
    cache: &CatalogCache,
    provider: &dyn CatalogProvider,
    store: &dyn SubscriptionStore,
    messenger: &dyn Messenger,
    audit: &dyn AuditLog,
) -> usize {
    let subscriptions = match store.find_active(None).await {
        Ok(subs) => subs,
        Err(e) => {
            warn!(error = %e, "Could not read active subscriptions, skipping matcher pass");
            return 0;
        }
    };
    if subscriptions.is_empty() {
        return 0;
    }

    let snapshot = cache.snapshot().await;
    let matches: Vec<(Subscription, Venue)> = subscriptions
        .into_iter()
        .filter_map(|sub| {
            snapshot
                .iter()
                .find(|v| v.name == sub.venue_name && v.is_online)
                .cloned()
                .map(|venue| (sub, venue))
        })
        .collect();

    if matches.is_empty() {
        debug!("Matcher pass: no subscription target online");
        return 0;
    }

    let matched = matches.len();
    join_all(
        matches
            .into_iter()
            .map(|(sub, venue)| fulfil(sub, venue, provider, store, messenger, audit)),
    )
    .await;

    info!(matched, "Matcher pass complete");
    matched
}

async fn fulfil(
    sub: Subscription,
    venue: Venue,
    provider: &dyn CatalogProvider,
    store: &dyn SubscriptionStore,
    messenger: &dyn Messenger,
    audit: &dyn AuditLog,
) {
    let link = provider.venue_link(&venue);
    let text = format!("{} is now open! Go ahead and order!", venue.name);
    let actions = [Action::url(&venue.name, link)];

    if let Err(e) = messenger.deliver(sub.recipient_id, &text, &actions).await {
        warn!(
            recipient_id = sub.recipient_id,
            venue = %venue.name,
            error = %e,
            "Fulfilment delivery failed (subscription still archived)"
        );
    }

    if let Err(e) = store
        .archive(sub.recipient_id, &sub.venue_name, ArchiveReason::Fulfilled)
        .await
    {
        warn!(
            recipient_id = sub.recipient_id,
            venue = %sub.venue_name,
            error = %e,
            "Could not archive fulfilled subscription"
        );
    }

    audit
        .record(events::SUBSCRIPTION_FULFILLED, sub.recipient_id, &sub.venue_name)
        .await;
}
