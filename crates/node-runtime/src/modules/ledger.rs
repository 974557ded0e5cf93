//! # Ledger Module
//!
//! Handles block and transaction traffic (tag 2) and exposes the ledger
//! synchronization entry point used for new-node and catch-up sync.

use crate::peers::PeerTable;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{
    Broadcastable, CatchUpPoint, Executable, LedgerSyncHandle, ModuleKind, PeerEndpoint,
    ProtocolModule,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Ledger instruction tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LedgerInstruction {
    /// A newly produced block announcement.
    AnnounceBlock = 0x00,
    /// A client transaction entering the network.
    SubmitTransaction = 0x01,
    /// A finalized block.
    FinalBlock = 0x02,
    /// A transaction forwarded between shards.
    ForwardTransaction = 0x03,
}

impl LedgerInstruction {
    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x00 => Some(Self::AnnounceBlock),
            0x01 => Some(Self::SubmitTransaction),
            0x02 => Some(Self::FinalBlock),
            0x03 => Some(Self::ForwardTransaction),
            _ => None,
        }
    }
}

/// Ledger protocol at the dispatch boundary.
pub struct LedgerModule {
    peers: Arc<PeerTable>,
    processed: AtomicU64,
    syncing: AtomicBool,
    catch_up: Mutex<Option<CatchUpPoint>>,
}

impl LedgerModule {
    /// Create the module over the shared peer table.
    pub fn new(peers: Arc<PeerTable>) -> Self {
        Self {
            peers,
            processed: AtomicU64::new(0),
            syncing: AtomicBool::new(false),
            catch_up: Mutex::new(None),
        }
    }

    /// Messages handled so far.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Whether ledger synchronization has been started.
    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Relaxed)
    }

    /// The catch-up point synchronization was started from, if any.
    pub fn catch_up_point(&self) -> Option<CatchUpPoint> {
        *self.catch_up.lock()
    }
}

#[async_trait]
impl Executable for LedgerModule {
    async fn execute(&self, message: &[u8], offset: usize, from: &PeerEndpoint) -> bool {
        let Some(&instruction_tag) = message.get(offset) else {
            warn!(from = %from, "[Ledger] Missing instruction tag");
            return false;
        };
        let Some(instruction) = LedgerInstruction::from_tag(instruction_tag) else {
            warn!(
                from = %from,
                "[Ledger] Unknown instruction {instruction_tag:#04x}"
            );
            return false;
        };

        debug!(
            ?instruction,
            payload_len = message.len().saturating_sub(offset + 1),
            from = %from,
            "[Ledger] Handling message"
        );
        self.processed.fetch_add(1, Ordering::Relaxed);
        true
    }
}

impl Broadcastable for LedgerModule {
    fn get_broadcast_list(&self, _instruction_tag: u8, from: &PeerEndpoint) -> Vec<PeerEndpoint> {
        self.peers.fanout_excluding(from)
    }
}

impl ProtocolModule for LedgerModule {
    fn kind(&self) -> ModuleKind {
        ModuleKind::Ledger
    }
}

impl LedgerSyncHandle for LedgerModule {
    fn start_synchronization(&self, from: CatchUpPoint) -> bool {
        info!(?from, "[Ledger] Starting synchronization");
        *self.catch_up.lock() = Some(from);
        self.syncing.store(true, Ordering::Relaxed);
        true
    }
}
