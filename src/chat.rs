//! Chatbot conversation backed by a webhook.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tracing::{debug, error};
use uuid::Uuid;

use crate::api::{ApiClient, ApiError};

pub const GREETING: &str = "Hi! How can I help you today?";
pub const NOT_UNDERSTOOD: &str = "I'm sorry, I didn't understand that.";
pub const SERVICE_UNAVAILABLE: &str = "AI service is unavailable.";
pub const SEND_FAILED: &str = "Oops! Something went wrong. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn render(&self) -> String {
        let who = match self.sender {
            Sender::User => "you",
            Sender::Bot => "bot",
        };
        let at = self.timestamp.with_timezone(&Local).format("%H:%M");
        format!("[{at}] {who}: {}", self.text)
    }
}

pub struct ChatSession {
    client: ApiClient,
    webhook_url: Option<String>,
    messages: Vec<ChatMessage>,
    error: Option<String>,
}

impl ChatSession {
    pub fn new(client: ApiClient, webhook_url: Option<String>) -> Self {
        Self {
            client,
            webhook_url,
            messages: vec![ChatMessage::new(Sender::Bot, GREETING)],
            error: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Sends one user turn and appends the bot's answer. Blank input is
    /// ignored and returns `None`.
    pub async fn send(&mut self, input: &str) -> Option<&ChatMessage> {
        if input.trim().is_empty() {
            return None;
        }
        self.messages.push(ChatMessage::new(Sender::User, input));
        self.error = None;

        let reply = match self.webhook_url.as_deref() {
            Some(url) => self.client.post_chat(url, input).await,
            None => Err(ApiError::NotConfigured("chat webhook URL")),
        };
        let text = match reply {
            Ok(reply) => {
                debug!(?reply, "chat reply");
                reply.response.unwrap_or_else(|| NOT_UNDERSTOOD.to_string())
            }
            Err(e) => {
                error!(err = %e, "chat webhook failed");
                self.error = Some(SEND_FAILED.to_string());
                SERVICE_UNAVAILABLE.to_string()
            }
        };
        self.messages.push(ChatMessage::new(Sender::Bot, text));
        self.messages.last()
    }
}
