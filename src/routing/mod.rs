pub mod resolver;

use std::collections::HashSet;

use anyhow::Result;
use tracing::info;

use crate::config::ForwardingConfig;
use crate::filter::MessageFilter;
use crate::platform::{ChatHandle, ChatPlatform};

pub use resolver::Participant;

/// Where messages come from, where they go, and under which rules.
/// Built once at startup and never modified afterwards.
#[derive(Debug)]
pub struct RoutingTable {
    sources: HashSet<ChatHandle>,
    destinations: Vec<Participant>,
    filter: MessageFilter,
    forward: bool,
}

impl RoutingTable {
    /// Validate the config, compile the filter and resolve every participant.
    /// Any failure here is fatal: a partially resolved table is not usable.
    pub async fn build(config: &ForwardingConfig, platform: &dyn ChatPlatform) -> Result<Self> {
        config.validate()?;
        let filter = MessageFilter::from_pattern(config.filter_pattern())?;

        let mut sources = HashSet::with_capacity(config.sources.len());
        for reference in &config.sources {
            let participant = resolver::resolve(platform, "source", reference).await?;
            sources.insert(participant.handle);
        }

        let mut destinations = Vec::with_capacity(config.destinations.len());
        for reference in &config.destinations {
            destinations.push(resolver::resolve(platform, "destination", reference).await?);
        }

        let table = Self::new(sources, destinations, filter, config.forward)?;
        info!("Loaded filter {}", table.filter.describe());
        if table.forward {
            info!("Will forward messages instead of sending a copy");
        }
        Ok(table)
    }

    pub fn new(
        sources: HashSet<ChatHandle>,
        destinations: Vec<Participant>,
        filter: MessageFilter,
        forward: bool,
    ) -> Result<Self> {
        anyhow::ensure!(!sources.is_empty(), "Routing table has no sources");
        anyhow::ensure!(!destinations.is_empty(), "Routing table has no destinations");
        Ok(Self {
            sources,
            destinations,
            filter,
            forward,
        })
    }

    pub fn is_source(&self, handle: ChatHandle) -> bool {
        self.sources.contains(&handle)
    }

    /// Destinations in configured order
    pub fn destinations(&self) -> &[Participant] {
        &self.destinations
    }

    pub fn filter(&self) -> &MessageFilter {
        &self.filter
    }

    pub fn forward(&self) -> bool {
        self.forward
    }
}
