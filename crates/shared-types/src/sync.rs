//! # Startup Synchronization Types
//!
//! The sync mode is a one-time startup decision: it selects which protocol
//! module's synchronization routine the node triggers and with what flags.
//! The node role filters which modes are legal, expressed as data rather
//! than compile-time branching between node variants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Synchronization strategy selected once at node startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncMode {
    /// No synchronization; only the peer admission allow-list is set up.
    NoSync,
    /// A brand-new ordinary node syncing from empty state.
    NewNodeSync,
    /// An ordinary node catching up from a late state.
    NormalSync,
    /// An ordinary node syncing via the directory-service protocol.
    DirectoryServiceSync,
    /// A lookup node syncing via the lookup protocol.
    LookupSync,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncMode::NoSync => "no-sync",
            SyncMode::NewNodeSync => "new-node-sync",
            SyncMode::NormalSync => "normal-sync",
            SyncMode::DirectoryServiceSync => "directory-service-sync",
            SyncMode::LookupSync => "lookup-sync",
        };
        f.write_str(name)
    }
}

impl FromStr for SyncMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no-sync" => Ok(SyncMode::NoSync),
            "new-node-sync" => Ok(SyncMode::NewNodeSync),
            "normal-sync" => Ok(SyncMode::NormalSync),
            "directory-service-sync" => Ok(SyncMode::DirectoryServiceSync),
            "lookup-sync" => Ok(SyncMode::LookupSync),
            other => Err(format!("unknown sync mode '{other}'")),
        }
    }
}

/// Deployment role of the node, selected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRole {
    /// A regular network participant.
    OrdinaryNode,
    /// A lookup node serving history and answering queries.
    LookupNode,
}

impl NodeRole {
    /// The sync modes this role may legally start with.
    pub fn allowed_modes(self) -> &'static [SyncMode] {
        match self {
            NodeRole::OrdinaryNode => &[
                SyncMode::NoSync,
                SyncMode::NewNodeSync,
                SyncMode::NormalSync,
                SyncMode::DirectoryServiceSync,
            ],
            NodeRole::LookupNode => &[SyncMode::NoSync, SyncMode::LookupSync],
        }
    }

    /// Whether `mode` is legal for this role.
    pub fn allows(self, mode: SyncMode) -> bool {
        self.allowed_modes().contains(&mode)
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::OrdinaryNode => f.write_str("ordinary-node"),
            NodeRole::LookupNode => f.write_str("lookup-node"),
        }
    }
}

impl FromStr for NodeRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ordinary-node" => Ok(NodeRole::OrdinaryNode),
            "lookup-node" => Ok(NodeRole::LookupNode),
            other => Err(format!("unknown node role '{other}'")),
        }
    }
}

/// Where ledger synchronization picks up from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchUpPoint {
    /// Start from empty state (new node).
    Genesis,
    /// Catch up from a late state.
    Late,
}

/// Sync bookkeeping exposed by the lookup module.
///
/// The mode is written exactly once during startup and is read-only
/// afterwards.
pub trait LookupSyncHandle: Send + Sync {
    /// Record the mode the node started with.
    fn set_sync_mode(&self, mode: SyncMode);

    /// The recorded startup mode, if one was set.
    fn sync_mode(&self) -> Option<SyncMode>;

    /// Begin lookup-node synchronization. Returns whether it started.
    fn start_synchronization(&self) -> bool;
}

/// Synchronization entry point of the ledger module.
pub trait LedgerSyncHandle: Send + Sync {
    /// Begin ledger synchronization from the given catch-up point.
    /// Returns whether it started.
    fn start_synchronization(&self, from: CatchUpPoint) -> bool;
}

/// Synchronization entry point of the directory-service module.
pub trait DirectorySyncHandle: Send + Sync {
    /// Begin directory-service synchronization. Returns whether it started.
    fn start_synchronization(&self) -> bool;
}
