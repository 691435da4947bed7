//! Telegram Bot API messenger.
//!
//! Delivers messages via the `sendMessage` endpoint with inline keyboard
//! buttons. Handles the API's `ok` envelope and rate limit responses.

use tracing::{debug, info, warn};

use crate::traits::{Action, ActionTarget, Messenger, NotifyError};

/// Build the `reply_markup` inline keyboard: one button per row.
fn inline_keyboard(actions: &[Action]) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = actions
        .iter()
        .map(|action| {
            let button = match &action.target {
                ActionTarget::Url(url) => serde_json::json!({
                    "text": action.label,
                    "url": url,
                }),
                ActionTarget::Callback(payload) => serde_json::json!({
                    "text": action.label,
                    "callback_data": payload,
                }),
            };
            serde_json::json!([button])
        })
        .collect();
    serde_json::json!({ "inline_keyboard": rows })
}

/// Sends messages via the Telegram Bot API.
#[derive(Debug)]
pub struct TelegramMessenger {
    bot_token: String,
    client: reqwest::Client,
}

impl TelegramMessenger {
    /// Returns [`NotifyError::Config`] if the token is empty.
    pub fn new(bot_token: String) -> Result<Self, NotifyError> {
        if bot_token.is_empty() {
            return Err(NotifyError::Config(
                "Telegram bot token must not be empty".to_string(),
            ));
        }
        Ok(Self {
            bot_token,
            client: reqwest::Client::new(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.bot_token, method)
    }
}

#[async_trait::async_trait]
impl Messenger for TelegramMessenger {
    async fn deliver(
        &self,
        recipient_id: i64,
        text: &str,
        actions: &[Action],
    ) -> Result<(), NotifyError> {
        let mut body = serde_json::json!({
            "chat_id": recipient_id,
            "text": text,
        });
        if !actions.is_empty() {
            body["reply_markup"] = inline_keyboard(actions);
        }

        debug!(recipient_id, actions = actions.len(), "Sending Telegram message");

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let resp_body: serde_json::Value = response.json().await?;

        if resp_body.get("ok") == Some(&serde_json::Value::Bool(true)) {
            info!(recipient_id, "Telegram message sent");
            return Ok(());
        }

        // Handle rate limiting (HTTP 429).
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp_body
                .get("parameters")
                .and_then(|p| p.get("retry_after"))
                .and_then(|v| v.as_u64())
                .unwrap_or(30);
            return Err(NotifyError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let description = resp_body
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown Telegram API error");
        Err(NotifyError::Rejected(description.to_string()))
    }

    /// Show the typing indicator. Purely cosmetic, so errors are swallowed.
    async fn typing(&self, recipient_id: i64) {
        let body = serde_json::json!({
            "chat_id": recipient_id,
            "action": "typing",
        });
        let result = self
            .client
            .post(self.method_url("sendChatAction"))
            .json(&body)
            .send()
            .await;
        if let Err(e) = result {
            warn!(recipient_id, error = %e, "Typing indicator failed");
        }
    }

    fn channel_name(&self) -> &str {
        "telegram"
    }
}
