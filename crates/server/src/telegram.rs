//! Telegram long-poll transport.
//!
//! Pulls updates via `getUpdates`, converts each one to an [`Intent`] and
//! hands it to the handlers. Poll failures back off and retry; the loop
//! ends with the process.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use venuewatch_core::UserDetails;

use crate::handlers::{Handlers, Intent};

const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct UpdatesEnvelope {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    pub from: Option<Sender>,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct Sender {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: Sender,
    pub message: Option<IncomingMessage>,
    pub data: Option<String>,
}

/// Map one raw update to `(recipient_id, intent)`.
///
/// Button callbacks carry either a `remove - {name}` payload from the
/// subscription list or a bare venue name from search results. Plain text
/// is `/start`, `/show` (aka `/list`) or a search query, lowercased so the
/// match is case-insensitive.
pub fn parse_intent(update: &Update) -> Option<(i64, Intent)> {
    if let Some(callback) = &update.callback_query {
        let data = callback.data.as_deref()?;
        let recipient_id = callback
            .message
            .as_ref()
            .map(|m| m.chat.id)
            .unwrap_or(callback.from.id);
        let intent = match data.strip_prefix("remove - ") {
            Some(name) => Intent::Unsubscribe(name.to_string()),
            None => Intent::Subscribe(data.to_string()),
        };
        return Some((recipient_id, intent));
    }

    let message = update.message.as_ref()?;
    let text = message.text.as_deref()?.trim();
    if text.is_empty() {
        return None;
    }
    let recipient_id = message.chat.id;

    let intent = match text {
        "/start" => {
            let from = message.from.as_ref()?;
            Intent::Start(UserDetails {
                user_id: from.id,
                recipient_id,
                first_name: from.first_name.clone(),
                last_name: from.last_name.clone(),
                username: from.username.clone(),
            })
        }
        "/show" | "/list" => Intent::List,
        _ => Intent::Search(text.to_lowercase()),
    };
    Some((recipient_id, intent))
}

/// Long-polls `getUpdates` and dispatches intents.
pub struct UpdateListener {
    client: reqwest::Client,
    bot_token: String,
    poll_timeout_secs: u64,
    handlers: Arc<Handlers>,
}

impl UpdateListener {
    pub fn new(bot_token: String, poll_timeout_secs: u64, handlers: Arc<Handlers>) -> Self {
        Self {
            client: reqwest::Client::new(),
            bot_token,
            poll_timeout_secs,
            handlers,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.bot_token, method)
    }

    /// Run forever. Spawn this on the runtime at startup.
    ///
    /// Only the poll itself is sequential; every update is handled on its
    /// own task so a slow recipient never stalls other users' requests.
    pub async fn run(self) {
        info!("Telegram update listener started");
        let mut offset: i64 = 0;
        loop {
            match self.poll(offset).await {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        self.dispatch(update);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Polling for updates failed, retrying");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                }
            }
        }
    }

    async fn poll(&self, offset: i64) -> Result<Vec<Update>, reqwest::Error> {
        let body = serde_json::json!({
            "offset": offset,
            "timeout": self.poll_timeout_secs,
        });
        let envelope: UpdatesEnvelope = self
            .client
            .post(self.method_url("getUpdates"))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        if !envelope.ok {
            warn!("getUpdates replied ok=false");
        }
        Ok(envelope.result)
    }

    /// Handle one update on its own task.
    fn dispatch(&self, update: Update) -> tokio::task::JoinHandle<()> {
        let handlers = self.handlers.clone();
        let client = self.client.clone();
        let answer_url = self.method_url("answerCallbackQuery");
        tokio::spawn(async move {
            if let Some(callback) = &update.callback_query {
                answer_callback(&client, &answer_url, &callback.id).await;
            }
            match parse_intent(&update) {
                Some((recipient_id, intent)) => handlers.handle(recipient_id, intent).await,
                None => warn!(update_id = update.update_id, "Ignoring unrecognized update"),
            }
        })
    }
}

/// Acknowledge a button press so the client stops its spinner.
async fn answer_callback(client: &reqwest::Client, url: &str, callback_id: &str) {
    let body = serde_json::json!({ "callback_query_id": callback_id });
    let result = client.post(url).json(&body).send().await;
    if let Err(e) = result {
        warn!(error = %e, "Answering callback query failed");
    }
}
