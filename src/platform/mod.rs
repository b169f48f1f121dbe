pub mod telegram;
#[cfg(test)]
pub mod testing;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::content::mapper::OutboundContent;
use crate::content::MessageContent;

/// Opaque chat identifier on the platform
pub type ChatHandle = i64;

/// A chat as known to the platform's directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatInfo {
    pub handle: ChatHandle,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: Option<String>,
}

impl UserInfo {
    /// `First Last [username]`, the way accounts are shown in logs
    pub fn display_name(&self) -> String {
        let mut name = self.first_name.clone();
        if !self.last_name.is_empty() {
            name.push(' ');
            name.push_str(&self.last_name);
        }
        if let Some(username) = &self.username {
            name.push_str(&format!(" [{}]", username));
        }
        name
    }
}

/// Who posted a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User(i64),
    Chat(ChatHandle),
    Unknown,
}

/// A message received from the platform
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub id: i64,
    pub chat_handle: ChatHandle,
    pub sender: Sender,
    /// Sent by the account the relay runs as
    pub is_outgoing: bool,
    pub content: MessageContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    NewMessage(InboundMessage),
    /// Any other event; carried only so it can be logged and dropped
    Other(String),
}

pub type UpdateStream = mpsc::Receiver<Update>;

/// Everything the relay needs from the chat platform. Session setup, storage
/// and the wire protocol live behind this trait.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Verify credentials and return the account the relay runs as
    async fn authorize(&self) -> Result<UserInfo>;

    async fn resolve_chat_by_handle(&self, handle: ChatHandle) -> Result<ChatInfo>;

    async fn resolve_chat_by_username(&self, username: &str) -> Result<ChatInfo>;

    async fn resolve_user(&self, user_id: i64) -> Result<UserInfo>;

    async fn forward_message(
        &self,
        destination: ChatHandle,
        origin: ChatHandle,
        message_id: i64,
    ) -> Result<()>;

    async fn send_composed_message(
        &self,
        destination: ChatHandle,
        content: &OutboundContent,
    ) -> Result<()>;

    /// Start delivering updates. The stream ends when the platform stops.
    async fn subscribe(&self) -> Result<UpdateStream>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_full() {
        let user = UserInfo {
            id: 1,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            username: Some("ada".to_string()),
        };
        assert_eq!(user.display_name(), "Ada Lovelace [ada]");
    }

    #[test]
    fn test_display_name_without_optional_parts() {
        let user = UserInfo {
            id: 1,
            first_name: "Ada".to_string(),
            last_name: String::new(),
            username: None,
        };
        assert_eq!(user.display_name(), "Ada");
    }
}
