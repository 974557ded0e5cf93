//! # Sync Orchestrator
//!
//! The node-startup decision: given the node's role and configured sync
//! mode, select and trigger the correct synchronization strategy on the
//! appropriate protocol module. This is a single startup decision, not a
//! runtime state machine — once made, ongoing synchronization progress is
//! owned by the invoked module.
//!
//! Invalid role/mode combinations are a soft failure: the node keeps
//! running unsynchronized with a warning rather than aborting.

use crate::allowlist::PeerAllowList;
use shared_types::{
    CatchUpPoint, DirectorySyncHandle, LedgerSyncHandle, LookupSyncHandle, ModuleKind, NodeRole,
    SyncMode,
};
use std::sync::Arc;
use tracing::{info, warn};

/// The synchronization entry points the orchestrator can invoke.
pub struct SyncCollaborators {
    /// Lookup module: sync-mode bookkeeping plus lookup-node sync.
    pub lookup: Arc<dyn LookupSyncHandle>,
    /// Ledger module: new-node and catch-up sync.
    pub ledger: Arc<dyn LedgerSyncHandle>,
    /// Directory-service module sync.
    pub directory: Arc<dyn DirectorySyncHandle>,
    /// Peer admission service, initialized when no sync is requested.
    pub allow_list: Arc<PeerAllowList>,
}

/// Outcome of the startup sync decision, mainly for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
    /// No synchronization; the peer allow-list was initialized.
    AllowListOnly,
    /// A module's synchronization routine was triggered.
    Engaged { module: ModuleKind, mode: SyncMode },
    /// New-node sync combined with history retrieval: contradictory, no
    /// synchronization started.
    HistoryConflict,
    /// Role/mode mismatch: no synchronization started.
    InvalidConfiguration { role: NodeRole, mode: SyncMode },
}

/// Drives the one-shot startup synchronization decision.
pub struct SyncOrchestrator {
    collaborators: SyncCollaborators,
}

impl SyncOrchestrator {
    /// Create the orchestrator over its collaborator set.
    pub fn new(collaborators: SyncCollaborators) -> Self {
        Self { collaborators }
    }

    /// Make the startup decision and trigger the selected strategy.
    ///
    /// Terminal: the orchestrator has nothing further to do after this
    /// returns; subsequent progress belongs to the engaged module.
    pub fn engage(
        &self,
        role: NodeRole,
        mode: SyncMode,
        retrieve_history: bool,
    ) -> SyncDecision {
        if !role.allows(mode) {
            warn!(%role, %mode, "[SyncOrchestrator] Invalid sync type");
            return SyncDecision::InvalidConfiguration { role, mode };
        }

        match mode {
            SyncMode::NoSync => {
                info!("[SyncOrchestrator] No sync needed");
                self.collaborators.allow_list.init();
                SyncDecision::AllowListOnly
            }
            SyncMode::NewNodeSync => {
                if retrieve_history {
                    // New nodes never retrieve local history.
                    warn!(
                        "[SyncOrchestrator] Sync for a new node must not retrieve history; \
                         not starting synchronization"
                    );
                    return SyncDecision::HistoryConflict;
                }
                info!("[SyncOrchestrator] Syncing as a new node");
                self.collaborators.lookup.set_sync_mode(mode);
                self.start_ledger(CatchUpPoint::Genesis);
                SyncDecision::Engaged {
                    module: ModuleKind::Ledger,
                    mode,
                }
            }
            SyncMode::NormalSync => {
                info!("[SyncOrchestrator] Syncing as a normal node");
                self.collaborators.lookup.set_sync_mode(mode);
                self.start_ledger(CatchUpPoint::Late);
                SyncDecision::Engaged {
                    module: ModuleKind::Ledger,
                    mode,
                }
            }
            SyncMode::DirectoryServiceSync => {
                info!("[SyncOrchestrator] Syncing as a directory-service node");
                self.collaborators.lookup.set_sync_mode(mode);
                if !self.collaborators.directory.start_synchronization() {
                    warn!("[SyncOrchestrator] Directory-service sync did not start");
                }
                SyncDecision::Engaged {
                    module: ModuleKind::DirectoryService,
                    mode,
                }
            }
            SyncMode::LookupSync => {
                info!("[SyncOrchestrator] Syncing as a lookup node");
                self.collaborators.lookup.set_sync_mode(mode);
                if !self.collaborators.lookup.start_synchronization() {
                    warn!("[SyncOrchestrator] Lookup sync did not start");
                }
                SyncDecision::Engaged {
                    module: ModuleKind::Lookup,
                    mode,
                }
            }
        }
    }

    fn start_ledger(&self, from: CatchUpPoint) {
        if !self.collaborators.ledger.start_synchronization(from) {
            warn!("[SyncOrchestrator] Ledger sync did not start");
        }
    }
}
