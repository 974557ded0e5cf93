//! # Broadcast Selector
//!
//! Answers "which peers should receive a re-broadcast of this gossip
//! message?" by dispatching to the owning module's selection policy through
//! the same tag-indexed registry the dispatcher routes with. The policy
//! itself belongs to each module; this component only finds the right one.

use crate::registry::HandlerRegistry;
use shared_types::PeerEndpoint;
use std::sync::Arc;
use tracing::warn;

/// Tag-indexed lookup of gossip fan-out targets.
///
/// Idempotent: identical inputs yield the identical list as long as the
/// underlying peer set has not changed in between.
pub struct BroadcastSelector {
    registry: Arc<HandlerRegistry>,
}

impl BroadcastSelector {
    /// Create a selector over the shared handler registry.
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    /// Peers that should receive a re-broadcast of a message with the given
    /// type and instruction tags, originally received from `from`.
    /// Out-of-range type tags yield an empty list.
    pub fn select(
        &self,
        type_tag: u8,
        instruction_tag: u8,
        from: &PeerEndpoint,
    ) -> Vec<PeerEndpoint> {
        match self.registry.handler(type_tag) {
            Some(handler) => handler.get_broadcast_list(instruction_tag, from),
            None => {
                warn!("[BroadcastSelector] Unknown message type {type_tag:#04x}");
                Vec::new()
            }
        }
    }
}
