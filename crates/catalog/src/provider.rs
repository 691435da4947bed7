//! Upstream catalog collaborator contract.

use venuewatch_core::Venue;

/// Errors from the upstream catalog provider.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected upstream payload: {0}")]
    Malformed(String),
}

/// Fetches the current catalog snapshot from the upstream provider.
///
/// A failed fetch resolves to an error the scheduler logs and skips; it must
/// never panic or take the refresh loop down with it.
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch the full venue list across all configured cities.
    async fn fetch_catalog(&self) -> Result<Vec<Venue>, CatalogError>;

    /// Best-effort enrichment (fills `is_open` per venue). On upstream
    /// failure the input list is returned unchanged.
    async fn enrich(&self, venues: Vec<Venue>) -> Vec<Venue>;

    /// Deep link for ordering from a venue.
    fn venue_link(&self, venue: &Venue) -> String;
}
