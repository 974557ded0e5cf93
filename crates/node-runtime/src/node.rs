//! # Node
//!
//! The composition root: builds the protocol modules, wires them into the
//! dispatch core in tag order, and drives the startup sequence.
//!
//! ## Construction Order
//!
//! 1. Protocol modules over the shared peer table
//! 2. Handler registry (index = wire type tag)
//! 3. Message dispatcher (queue + intake loop + worker pool)
//! 4. Self identity log (derived address + port) and self-peer registration
//! 5. Startup sync decision
//! 6. Lookup nodes: listening service attempt (soft failure)
//!
//! Failures beyond this point are terminal to individual messages, never to
//! the process.

use crate::config::NodeConfig;
use crate::listener::ApiListener;
use crate::modules::{
    ConsensusUnitModule, DirectoryServiceModule, LedgerModule, LookupModule, PeerManagerModule,
};
use crate::peers::PeerTable;
use crate::transport::TransportHandle;
use node_core::{
    DispatchMetrics, HandlerRegistry, MessageDispatcher, PeerAllowList, SyncCollaborators,
    SyncDecision, SyncOrchestrator,
};
use shared_crypto::{derive_address, NodeKeyPair};
use shared_types::{
    Address, DirectorySyncHandle, LedgerSyncHandle, LookupSyncHandle, NodeRole, PeerEndpoint,
    ProtocolModule, RawMessage, SyncMode,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Startup parameters supplied by the operator.
pub struct NodeParams {
    /// The node's identity keypair.
    pub key_pair: NodeKeyPair,
    /// The endpoint this node advertises as itself.
    pub self_peer: PeerEndpoint,
    /// Whether the peer manager loads its stored peer configuration.
    pub load_peer_config: bool,
    /// The startup synchronization strategy.
    pub sync_mode: SyncMode,
    /// Whether to retrieve local history before syncing.
    pub retrieve_history: bool,
    /// The node's deployment role.
    pub role: NodeRole,
}

impl NodeParams {
    /// Assemble params from configuration plus the externally supplied
    /// keypair.
    pub fn from_config(key_pair: NodeKeyPair, config: &NodeConfig) -> Self {
        Self {
            key_pair,
            self_peer: config.network.self_peer(),
            load_peer_config: config.sync.load_peer_config,
            sync_mode: config.sync.mode,
            retrieve_history: config.sync.retrieve_history,
            role: config.sync.role,
        }
    }
}

/// A running lattice-chain node.
pub struct Node {
    key_pair: NodeKeyPair,
    address: Address,
    self_peer: PeerEndpoint,
    role: NodeRole,
    dispatcher: MessageDispatcher,
    peer_table: Arc<PeerTable>,
    lookup: Arc<LookupModule>,
    allow_list: Arc<PeerAllowList>,
    sync_decision: SyncDecision,
    listener: Option<ApiListener>,
}

impl Node {
    /// Construct and start the node. Must run inside a tokio runtime.
    pub async fn start(
        params: NodeParams,
        config: &NodeConfig,
        transport: &dyn TransportHandle,
    ) -> Self {
        let public_key = params.key_pair.public_key();
        let peer_table = Arc::new(PeerTable::new());

        let peer_manager = Arc::new(PeerManagerModule::new(
            public_key,
            params.self_peer,
            params.load_peer_config,
            Arc::clone(&peer_table),
        ));
        let directory = Arc::new(DirectoryServiceModule::new(Arc::clone(&peer_table)));
        let ledger = Arc::new(LedgerModule::new(Arc::clone(&peer_table)));
        let consensus = Arc::new(ConsensusUnitModule::new());
        let lookup = Arc::new(LookupModule::new(Arc::clone(&peer_table)));

        // Registry order fixes the wire type tags.
        let registry = Arc::new(HandlerRegistry::new(vec![
            Arc::clone(&peer_manager) as Arc<dyn ProtocolModule>,
            Arc::clone(&directory) as Arc<dyn ProtocolModule>,
            Arc::clone(&ledger) as Arc<dyn ProtocolModule>,
            Arc::clone(&consensus) as Arc<dyn ProtocolModule>,
            Arc::clone(&lookup) as Arc<dyn ProtocolModule>,
        ]));

        let dispatcher =
            MessageDispatcher::start(Arc::clone(&registry), config.dispatch.to_dispatch_config());

        let address = derive_address(&public_key);
        info!(
            address = %hex::encode(address),
            port = params.self_peer.listen_port,
            "[Node] Self node identity"
        );

        transport.register_self_peer(params.self_peer);

        let allow_list = Arc::new(PeerAllowList::new(config.network.allow_list.clone()));
        let orchestrator = SyncOrchestrator::new(SyncCollaborators {
            lookup: Arc::clone(&lookup) as Arc<dyn LookupSyncHandle>,
            ledger: Arc::clone(&ledger) as Arc<dyn LedgerSyncHandle>,
            directory: Arc::clone(&directory) as Arc<dyn DirectorySyncHandle>,
            allow_list: Arc::clone(&allow_list),
        });
        let sync_decision =
            orchestrator.engage(params.role, params.sync_mode, params.retrieve_history);

        let listener = match params.role {
            NodeRole::OrdinaryNode => {
                info!("[Node] Running as an ordinary node");
                None
            }
            NodeRole::LookupNode => {
                info!("[Node] Running as a lookup node");
                match ApiListener::start(config.network.api_port).await {
                    Ok(listener) => {
                        info!("[Node] Listening service started");
                        Some(listener)
                    }
                    Err(e) => {
                        // Degraded but live: the node keeps serving the
                        // P2P network without the listening service.
                        warn!("[Node] Listening service couldn't start: {e}");
                        None
                    }
                }
            }
        };

        Self {
            key_pair: params.key_pair,
            address,
            self_peer: params.self_peer,
            role: params.role,
            dispatcher,
            peer_table,
            lookup,
            allow_list,
            sync_decision,
            listener,
        }
    }

    /// Hand an inbound message to the dispatch core. Blocks while the
    /// inbound queue is full.
    pub async fn dispatch(&self, msg: RawMessage) {
        self.dispatcher.dispatch(msg).await;
    }

    /// Gossip fan-out targets for a message kind.
    pub fn broadcast_list(
        &self,
        type_tag: u8,
        instruction_tag: u8,
        from: &PeerEndpoint,
    ) -> Vec<PeerEndpoint> {
        self.dispatcher.broadcast_list(type_tag, instruction_tag, from)
    }

    /// The dispatcher's message accounting.
    pub fn dispatch_metrics(&self) -> &DispatchMetrics {
        self.dispatcher.metrics()
    }

    /// The node's derived on-chain address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The node's public key.
    pub fn public_key(&self) -> shared_crypto::NodePublicKey {
        self.key_pair.public_key()
    }

    /// The endpoint this node advertises.
    pub fn self_peer(&self) -> PeerEndpoint {
        self.self_peer
    }

    /// The node's deployment role.
    pub fn role(&self) -> NodeRole {
        self.role
    }

    /// What the startup sync decision was.
    pub fn sync_decision(&self) -> SyncDecision {
        self.sync_decision
    }

    /// The sync mode recorded on the lookup module, if any.
    pub fn sync_mode(&self) -> Option<SyncMode> {
        self.lookup.sync_mode()
    }

    /// The shared peer table.
    pub fn peer_table(&self) -> &Arc<PeerTable> {
        &self.peer_table
    }

    /// The peer admission allow-list.
    pub fn allow_list(&self) -> &Arc<PeerAllowList> {
        &self.allow_list
    }

    /// Whether the lookup listening service is up.
    pub fn listener_port(&self) -> Option<u16> {
        self.listener.as_ref().map(ApiListener::local_port)
    }

    /// Stop the listening service and drain the dispatcher. Messages still
    /// queued are released without execution.
    pub async fn shutdown(&self) {
        info!("[Node] Initiating graceful shutdown");
        if let Some(listener) = &self.listener {
            listener.stop();
        }
        self.dispatcher.shutdown().await;
        info!("[Node] Shutdown complete");
    }
}
