use serde::{Deserialize, Serialize};

/// One venue in the refreshed catalog snapshot.
///
/// Venues are ephemeral: the whole list is replaced on every successful
/// refresh and individual entries are never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    /// Upstream venue id.
    pub id: String,
    /// Display name as the upstream catalog currently knows it.
    pub name: String,
    /// Whether the venue is accepting orders right now.
    pub is_online: bool,
    /// Whether the venue is open at all. Only populated by enrichment,
    /// the page listing doesn't carry it.
    pub is_open: Option<bool>,
    /// City slug the venue was discovered under (used for deep links).
    pub area: String,
    /// URL slug (used for deep links and the dynamic venue endpoint).
    pub slug: String,
}

impl Venue {
    /// Availability label shown in search results.
    pub fn availability_label(&self) -> &'static str {
        if self.is_online {
            "Open"
        } else if self.is_open == Some(true) {
            "Busy"
        } else {
            "Closed"
        }
    }
}
