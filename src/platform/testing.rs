//! In-memory `ChatPlatform` that records what the relay asks of it.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ChatHandle, ChatInfo, ChatPlatform, Update, UpdateStream, UserInfo};
use crate::content::mapper::OutboundContent;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Forward {
        destination: ChatHandle,
        origin: ChatHandle,
        message_id: i64,
    },
    Send {
        destination: ChatHandle,
        content: OutboundContent,
    },
}

impl Call {
    pub fn destination(&self) -> ChatHandle {
        match self {
            Call::Forward { destination, .. } | Call::Send { destination, .. } => *destination,
        }
    }
}

#[derive(Default)]
pub struct MockPlatform {
    me: Option<UserInfo>,
    chats: HashMap<ChatHandle, ChatInfo>,
    usernames: HashMap<String, ChatHandle>,
    users: HashMap<i64, UserInfo>,
    failing: HashSet<ChatHandle>,
    queued: Mutex<Vec<Update>>,
    calls: Mutex<Vec<Call>>,
    lookups: AtomicUsize,
    subscriptions: AtomicUsize,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_me(mut self, user: UserInfo) -> Self {
        self.me = Some(user);
        self
    }

    pub fn with_chat(mut self, handle: ChatHandle, title: &str) -> Self {
        self.chats.insert(
            handle,
            ChatInfo {
                handle,
                title: title.to_string(),
            },
        );
        self
    }

    /// Register a public username for an already registered chat
    pub fn with_username(mut self, username: &str, handle: ChatHandle) -> Self {
        self.usernames.insert(username.to_string(), handle);
        self
    }

    pub fn with_user(mut self, user: UserInfo) -> Self {
        self.users.insert(user.id, user);
        self
    }

    /// Every forward or send to `handle` fails
    pub fn failing_for(mut self, handle: ChatHandle) -> Self {
        self.failing.insert(handle);
        self
    }

    /// Updates handed out by the next `subscribe`; the stream closes after them
    pub fn with_updates(self, updates: Vec<Update>) -> Self {
        *self.queued.lock().unwrap() = updates;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) -> Result<()> {
        let destination = call.destination();
        self.calls.lock().unwrap().push(call);
        if self.failing.contains(&destination) {
            return Err(anyhow!("chat {} is not writable", destination));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    async fn authorize(&self) -> Result<UserInfo> {
        self.me.clone().ok_or_else(|| anyhow!("unauthorized"))
    }

    async fn resolve_chat_by_handle(&self, handle: ChatHandle) -> Result<ChatInfo> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.chats
            .get(&handle)
            .cloned()
            .ok_or_else(|| anyhow!("chat not found"))
    }

    async fn resolve_chat_by_username(&self, username: &str) -> Result<ChatInfo> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.usernames
            .get(username)
            .and_then(|handle| self.chats.get(handle))
            .cloned()
            .ok_or_else(|| anyhow!("username not occupied"))
    }

    async fn resolve_user(&self, user_id: i64) -> Result<UserInfo> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| anyhow!("user not found"))
    }

    async fn forward_message(
        &self,
        destination: ChatHandle,
        origin: ChatHandle,
        message_id: i64,
    ) -> Result<()> {
        self.record(Call::Forward {
            destination,
            origin,
            message_id,
        })
    }

    async fn send_composed_message(
        &self,
        destination: ChatHandle,
        content: &OutboundContent,
    ) -> Result<()> {
        self.record(Call::Send {
            destination,
            content: content.clone(),
        })
    }

    async fn subscribe(&self) -> Result<UpdateStream> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        let updates = std::mem::take(&mut *self.queued.lock().unwrap());
        let (tx, rx) = mpsc::channel(updates.len().max(1));
        for update in updates {
            tx.send(update).await?;
        }
        Ok(rx)
    }
}

mod tests {
    use super::*;

    #[tokio::test]
    async fn test_authorize_returns_configured_account() {
        let me = UserInfo {
            id: 42,
            first_name: "Relay".to_string(),
            last_name: String::new(),
            username: Some("relay_bot".to_string()),
        };
        let platform = MockPlatform::new().with_me(me.clone());
        assert_eq!(platform.authorize().await.unwrap(), me);
    }

    #[tokio::test]
    async fn test_authorize_fails_without_account() {
        let platform = MockPlatform::new();
        assert!(platform.authorize().await.is_err());
    }
}
