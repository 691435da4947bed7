//! Messenger trait definition and shared error types.

/// Errors that can occur during message delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Delivery rejected: {0}")]
    Rejected(String),

    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

/// Where a selectable option leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionTarget {
    /// Opens a link (e.g., the venue's order page).
    Url(String),
    /// Sent back to us as a callback payload.
    Callback(String),
}

/// One selectable option attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub label: String,
    pub target: ActionTarget,
}

impl Action {
    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: ActionTarget::Url(url.into()),
        }
    }

    pub fn callback(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: ActionTarget::Callback(payload.into()),
        }
    }
}

/// Chat delivery collaborator.
///
/// Delivery failure is terminal for the message: callers log it and move on,
/// they never retry (the subscription state transition stays authoritative).
#[async_trait::async_trait]
pub trait Messenger: Send + Sync {
    /// Deliver a text message with optional action buttons.
    async fn deliver(
        &self,
        recipient_id: i64,
        text: &str,
        actions: &[Action],
    ) -> Result<(), NotifyError>;

    /// Best-effort typing indicator; failures are swallowed.
    async fn typing(&self, _recipient_id: i64) {}

    /// Human-readable name for this channel (e.g., "telegram").
    fn channel_name(&self) -> &str;
}
