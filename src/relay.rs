use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::config::ForwardingConfig;
use crate::content::extract_text;
use crate::content::mapper::{to_outbound, OutboundContent};
use crate::platform::{ChatPlatform, InboundMessage, Sender, Update, UpdateStream};
use crate::routing::{Participant, RoutingTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Idle,
    Listening,
    Evaluating,
    Dispatching,
    Stopped,
}

/// What happened to a single update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not something the relay looks at
    Ignored(&'static str),
    /// Looked at, but not relayed
    Skipped(String),
    Dispatched { delivered: usize, failed: usize },
}

/// In-memory counters, reported by the heartbeat
#[derive(Debug, Default)]
pub struct RelayStats {
    received: AtomicU64,
    relayed: AtomicU64,
    skipped: AtomicU64,
    failed_deliveries: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub received: u64,
    pub relayed: u64,
    pub skipped: u64,
    pub failed_deliveries: u64,
}

impl RelayStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            relayed: self.relayed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed_deliveries: self.failed_deliveries.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// Counts accumulated since `earlier`
    pub fn since(&self, earlier: &StatsSnapshot) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.saturating_sub(earlier.received),
            relayed: self.relayed.saturating_sub(earlier.relayed),
            skipped: self.skipped.saturating_sub(earlier.skipped),
            failed_deliveries: self
                .failed_deliveries
                .saturating_sub(earlier.failed_deliveries),
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "received={} relayed={} skipped={} failed_deliveries={}",
            self.received, self.relayed, self.skipped, self.failed_deliveries
        )
    }
}

/// Consumes the update stream one update at a time and relays qualifying
/// messages to every destination.
pub struct RelayPipeline {
    platform: Arc<dyn ChatPlatform>,
    routing: Arc<RoutingTable>,
    stats: Arc<RelayStats>,
    state: RelayState,
}

impl RelayPipeline {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        routing: Arc<RoutingTable>,
        stats: Arc<RelayStats>,
    ) -> Self {
        Self {
            platform,
            routing,
            stats,
            state: RelayState::Idle,
        }
    }

    /// Build the routing table and subscribe to updates. Nothing is
    /// subscribed when the table cannot be built.
    pub async fn start(
        config: &ForwardingConfig,
        platform: Arc<dyn ChatPlatform>,
        stats: Arc<RelayStats>,
    ) -> Result<(Self, UpdateStream)> {
        let routing = RoutingTable::build(config, platform.as_ref()).await?;
        let updates = platform
            .subscribe()
            .await
            .context("Failed to subscribe to updates")?;
        Ok((Self::new(platform, Arc::new(routing), stats), updates))
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    /// Run until the stream closes.
    pub async fn run(&mut self, mut updates: UpdateStream) {
        self.state = RelayState::Listening;
        info!("Listening for incoming messages...");
        while let Some(update) = updates.recv().await {
            self.handle_update(update).await;
            self.state = RelayState::Listening;
        }
        self.state = RelayState::Stopped;
        info!("Update stream closed, relay stopped");
    }

    pub async fn handle_update(&mut self, update: Update) -> Outcome {
        let message = match update {
            Update::NewMessage(message) => message,
            Update::Other(description) => {
                debug!("Ignoring update: {}", description);
                return Outcome::Ignored("not a new message");
            }
        };
        // Own messages are never relayed, so a destination that is also a
        // source cannot loop.
        if message.is_outgoing {
            return Outcome::Ignored("outgoing message");
        }
        if !self.routing.is_source(message.chat_handle) {
            return Outcome::Ignored("not a source chat");
        }

        self.state = RelayState::Evaluating;
        self.stats.received.fetch_add(1, Ordering::Relaxed);
        self.log_incoming(&message).await;

        let outbound = match to_outbound(&message.content) {
            Ok(outbound) => outbound,
            Err(e) => {
                warn!("Message {} in chat {}: {}", message.id, message.chat_handle, e);
                self.stats.skipped.fetch_add(1, Ordering::Relaxed);
                return Outcome::Skipped(e.to_string());
            }
        };

        let filter = self.routing.filter();
        if !filter.passes(&extract_text(&message.content)) {
            info!("Did not pass filter {}", filter.describe());
            self.stats.skipped.fetch_add(1, Ordering::Relaxed);
            return Outcome::Skipped(format!("did not pass filter {}", filter.describe()));
        }

        self.state = RelayState::Dispatching;
        let outcome = self.dispatch(&message, &outbound).await;
        if let Outcome::Dispatched { delivered, .. } = outcome {
            if delivered > 0 {
                self.stats.relayed.fetch_add(1, Ordering::Relaxed);
            }
        }
        outcome
    }

    /// Deliver to each destination in order. A failure is logged and the
    /// next destination is still attempted.
    async fn dispatch(&self, message: &InboundMessage, outbound: &OutboundContent) -> Outcome {
        let mut delivered = 0;
        let mut failed = 0;
        for destination in self.routing.destinations() {
            match self.deliver(destination, message, outbound).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    error!(
                        "Failed to send to '{}' ({}). {:#}",
                        destination.name, destination.handle, e
                    );
                    self.stats.failed_deliveries.fetch_add(1, Ordering::Relaxed);
                    failed += 1;
                }
            }
        }
        Outcome::Dispatched { delivered, failed }
    }

    async fn deliver(
        &self,
        destination: &Participant,
        message: &InboundMessage,
        outbound: &OutboundContent,
    ) -> Result<()> {
        if self.routing.forward() {
            info!("Forwarding to '{}' ({})", destination.name, destination.handle);
            self.platform
                .forward_message(destination.handle, message.chat_handle, message.id)
                .await
        } else {
            info!("Sending to '{}' ({})", destination.name, destination.handle);
            self.platform
                .send_composed_message(destination.handle, outbound)
                .await
        }
    }

    /// Best-effort description of an incoming message. Lookup failures only
    /// make the line less informative.
    async fn log_incoming(&self, message: &InboundMessage) {
        let kind = message.content.kind_name();
        let text = extract_text(&message.content);

        let chat = match self.platform.resolve_chat_by_handle(message.chat_handle).await {
            Ok(chat) => chat,
            Err(e) => {
                warn!(
                    "New message {} {} in chat {} but failed to get chat info: {:#}",
                    kind, message.id, message.chat_handle, e
                );
                return;
            }
        };

        let (sender_id, sender) = match message.sender {
            Sender::User(id) => (
                id,
                self.platform
                    .resolve_user(id)
                    .await
                    .map(|user| user.display_name()),
            ),
            Sender::Chat(handle) => (
                handle,
                self.platform
                    .resolve_chat_by_handle(handle)
                    .await
                    .map(|chat| chat.title),
            ),
            Sender::Unknown => {
                info!(
                    "New message {} {} in {} ({})\n{}",
                    kind, message.id, chat.title, message.chat_handle, text
                );
                return;
            }
        };

        match sender {
            Ok(sender) => info!(
                "New message {} {} in {} ({}) from {} ({})\n{}",
                kind, message.id, chat.title, message.chat_handle, sender, sender_id, text
            ),
            Err(e) => warn!(
                "New message {} {} in chat {} from {} but failed to get sender info: {:#}\n{}",
                kind, message.id, message.chat_handle, sender_id, e, text
            ),
        }
    }
}
