use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a subscription left the `Active` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveReason {
    /// The target venue came online and the user was notified.
    Fulfilled,
    /// The time-to-live elapsed without a match.
    Expired,
    /// The user removed the subscription.
    Cancelled,
}

impl ArchiveReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveReason::Fulfilled => "fulfilled",
            ArchiveReason::Expired => "expired",
            ArchiveReason::Cancelled => "cancelled",
        }
    }
}

/// Subscription lifecycle state. Archived records are kept for audit and
/// never reactivated; a later subscribe for the same pair creates a new row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Archived { reason: ArchiveReason },
}

impl SubscriptionStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }
}

/// A user's standing request to be notified when a venue becomes available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    /// Chat the notification goes to.
    pub recipient_id: i64,
    /// Venue display name as stored at subscribe time. Matching is exact
    /// and case-sensitive on this value.
    pub venue_name: String,
    /// Upstream venue id captured at subscribe time when the venue was in
    /// the cache. Kept for audit; matching stays name-keyed.
    pub venue_id: Option<String>,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    pub fn new(recipient_id: i64, venue_name: impl Into<String>, venue_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_id,
            venue_name: venue_name.into(),
            venue_id,
            status: SubscriptionStatus::Active,
            created_at: Utc::now(),
        }
    }
}

/// Chat user details saved on first contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDetails {
    pub user_id: i64,
    pub recipient_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_subscription_starts_active() {
        let sub = Subscription::new(1, "Pizza X", Some("v1".to_string()));
        assert!(sub.status.is_active());
        assert_eq!(sub.venue_name, "Pizza X");
    }

    #[test]
    fn archived_is_not_active() {
        let status = SubscriptionStatus::Archived {
            reason: ArchiveReason::Expired,
        };
        assert!(!status.is_active());
    }

    #[test]
    fn status_serializes_with_reason() {
        let status = SubscriptionStatus::Archived {
            reason: ArchiveReason::Fulfilled,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["state"], "archived");
        assert_eq!(json["reason"], "fulfilled");
    }
}
