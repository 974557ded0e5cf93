//! # Protocol Module Capability Traits
//!
//! Defines the contract the five protocol modules implement to participate
//! in message dispatch and gossip fan-out.
//!
//! ## Design Philosophy
//!
//! - **Closed set**: the module set is fixed at startup; each module is
//!   addressed by the wire type tag equal to its registry index.
//! - **Capability traits**: the dispatch core knows modules only as
//!   `Executable + Broadcastable`; everything behind that boundary is the
//!   module's own business.
//! - **Untrusted input**: `execute` receives raw network bytes and reports
//!   success or failure; it must never panic on malformed payloads.

use crate::peer::PeerEndpoint;
use async_trait::async_trait;
use std::fmt;

/// Identifies one of the protocol modules. The discriminant is the wire
/// type tag and the module's index in the handler registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ModuleKind {
    /// Peer connection management.
    PeerManager = 0,
    /// Directory-service committee protocol.
    DirectoryService = 1,
    /// Ledger node protocol (blocks, transactions).
    Ledger = 2,
    /// Consensus unit protocol.
    ConsensusUnit = 3,
    /// Lookup protocol (history serving, sync bookkeeping).
    Lookup = 4,
}

impl ModuleKind {
    /// All module kinds in registry (type tag) order.
    pub const ALL: [ModuleKind; 5] = [
        ModuleKind::PeerManager,
        ModuleKind::DirectoryService,
        ModuleKind::Ledger,
        ModuleKind::ConsensusUnit,
        ModuleKind::Lookup,
    ];

    /// The wire type tag for this module.
    pub fn as_tag(self) -> u8 {
        self as u8
    }

    /// Resolve a wire type tag, if it names a known module.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }

    /// Short lowercase name used in log fields.
    pub fn name(self) -> &'static str {
        match self {
            ModuleKind::PeerManager => "peer-manager",
            ModuleKind::DirectoryService => "directory-service",
            ModuleKind::Ledger => "ledger",
            ModuleKind::ConsensusUnit => "consensus-unit",
            ModuleKind::Lookup => "lookup",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Processes one inbound message.
#[async_trait]
pub trait Executable: Send + Sync {
    /// Process `message`, whose module-specific content starts at `offset`
    /// (the instruction tag). Returns whether processing succeeded.
    async fn execute(&self, message: &[u8], offset: usize, from: &PeerEndpoint) -> bool;
}

/// Computes gossip fan-out targets for a just-processed message.
pub trait Broadcastable: Send + Sync {
    /// Peers that should receive a re-broadcast of a message carrying
    /// `instruction_tag`, originally received from `from`.
    fn get_broadcast_list(&self, instruction_tag: u8, from: &PeerEndpoint) -> Vec<PeerEndpoint>;
}

/// A protocol module as seen by the dispatch core.
pub trait ProtocolModule: Executable + Broadcastable {
    /// Which module this is; fixes its registry index.
    fn kind(&self) -> ModuleKind;
}
