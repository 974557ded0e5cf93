//! # Lookup Module
//!
//! Handles lookup traffic (tag 4): seed-peer queries and state requests
//! served by lookup nodes. Also the bookkeeper of the node's startup sync
//! mode — the mode is written exactly once by the sync orchestrator and is
//! read-only afterwards.

use crate::peers::PeerTable;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{
    Broadcastable, Executable, LookupSyncHandle, ModuleKind, PeerEndpoint, ProtocolModule,
    SyncMode,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lookup instruction tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LookupInstruction {
    /// Request the seed peer list.
    GetSeedPeers = 0x00,
    /// Response carrying seed peers.
    SetSeedPeers = 0x01,
    /// Request ledger state from a seed.
    GetStateFromSeed = 0x02,
}

impl LookupInstruction {
    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x00 => Some(Self::GetSeedPeers),
            0x01 => Some(Self::SetSeedPeers),
            0x02 => Some(Self::GetStateFromSeed),
            _ => None,
        }
    }
}

/// Lookup protocol at the dispatch boundary.
pub struct LookupModule {
    peers: Arc<PeerTable>,
    processed: AtomicU64,
    sync_mode: RwLock<Option<SyncMode>>,
    syncing: AtomicBool,
}

impl LookupModule {
    /// Create the module over the shared peer table.
    pub fn new(peers: Arc<PeerTable>) -> Self {
        Self {
            peers,
            processed: AtomicU64::new(0),
            sync_mode: RwLock::new(None),
            syncing: AtomicBool::new(false),
        }
    }

    /// Messages handled so far.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Whether lookup synchronization has been started.
    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Executable for LookupModule {
    async fn execute(&self, message: &[u8], offset: usize, from: &PeerEndpoint) -> bool {
        let Some(&instruction_tag) = message.get(offset) else {
            warn!(from = %from, "[Lookup] Missing instruction tag");
            return false;
        };
        let Some(instruction) = LookupInstruction::from_tag(instruction_tag) else {
            warn!(
                from = %from,
                "[Lookup] Unknown instruction {instruction_tag:#04x}"
            );
            return false;
        };

        debug!(?instruction, from = %from, "[Lookup] Handling message");
        self.processed.fetch_add(1, Ordering::Relaxed);
        true
    }
}

impl Broadcastable for LookupModule {
    fn get_broadcast_list(&self, _instruction_tag: u8, from: &PeerEndpoint) -> Vec<PeerEndpoint> {
        self.peers.fanout_excluding(from)
    }
}

impl ProtocolModule for LookupModule {
    fn kind(&self) -> ModuleKind {
        ModuleKind::Lookup
    }
}

impl LookupSyncHandle for LookupModule {
    fn set_sync_mode(&self, mode: SyncMode) {
        let mut current = self.sync_mode.write();
        if let Some(existing) = *current {
            warn!(%existing, attempted = %mode, "[Lookup] Sync mode already set; keeping existing");
            return;
        }
        info!(%mode, "[Lookup] Sync mode recorded");
        *current = Some(mode);
    }

    fn sync_mode(&self) -> Option<SyncMode> {
        *self.sync_mode.read()
    }

    fn start_synchronization(&self) -> bool {
        info!("[Lookup] Starting synchronization");
        self.syncing.store(true, Ordering::Relaxed);
        true
    }
}
