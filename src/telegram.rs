use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

// Telegram webhook types
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub edited_message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    /// Absent when the originating message is too old or was sent inline
    pub message: Option<Message>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub r#type: String,
}

/// An update that can be tied to a chat.
///
/// Messages carry their chat directly; callback queries reach it through the
/// message the pressed button was attached to.
#[derive(Debug, Clone)]
pub enum Event {
    Message(Message),
    Callback(CallbackQuery),
}

impl Event {
    /// First chat-bearing part of an update: message, edited message, then
    /// callback query. `None` for updates this bot does not route.
    pub fn from_update(update: Update) -> Option<Event> {
        if let Some(message) = update.message {
            return Some(Event::Message(message));
        }
        if let Some(message) = update.edited_message {
            return Some(Event::Message(message));
        }
        update.callback_query.map(Event::Callback)
    }

    /// Chat this event belongs to.
    pub fn chat(&self) -> Option<&Chat> {
        match self {
            Event::Message(message) => Some(&message.chat),
            Event::Callback(callback) => callback.message.as_ref().map(|m| &m.chat),
        }
    }

    /// Message text, or callback data for button presses.
    pub fn text(&self) -> Option<&str> {
        match self {
            Event::Message(message) => message.text.as_deref(),
            Event::Callback(callback) => callback.data.as_deref(),
        }
    }
}

/// Actions the bot can take on a chat.
#[async_trait]
pub trait ChatActions: Send + Sync {
    async fn leave_chat(&self, chat_id: i64) -> Result<()>;

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct LeaveChatRequest {
    chat_id: i64,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

/// Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl TelegramClient {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn call<T: Serialize + ?Sized>(&self, method: &str, body: &T) -> Result<()> {
        let response = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to call Telegram {}", method))?;

        let status = response.status();
        let parsed: Option<ApiResponse> = response.json().await.ok();

        match parsed {
            Some(api) if status.is_success() && api.ok => Ok(()),
            Some(api) => bail!(
                "Telegram {} error ({}): {}",
                method,
                status,
                api.description.unwrap_or_default()
            ),
            None => bail!("Telegram {} error ({}): unreadable response", method, status),
        }
    }
}

#[async_trait]
impl ChatActions for TelegramClient {
    async fn leave_chat(&self, chat_id: i64) -> Result<()> {
        self.call("leaveChat", &LeaveChatRequest { chat_id }).await?;
        info!("Left chat {}", chat_id);
        Ok(())
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.call("sendMessage", &SendMessageRequest { chat_id, text })
            .await
    }
}
