//! # Node Configuration
//!
//! Plain-struct configuration with sane defaults and environment-variable
//! overrides (`LATTICE_*`). Invalid override values are logged and ignored
//! rather than aborting startup.

use node_core::DispatchConfig;
use shared_types::{NodeRole, PeerEndpoint, SyncMode};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tracing::warn;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Network configuration.
    pub network: NetworkConfig,
    /// Inbound queue and worker pool sizing.
    pub dispatch: DispatchSettings,
    /// Startup synchronization configuration.
    pub sync: SyncSettings,
}

/// Network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Host address the node advertises to peers.
    pub host: IpAddr,
    /// P2P listening port (the node's own endpoint).
    pub p2p_port: u16,
    /// Lookup-node listening service port.
    pub api_port: u16,
    /// Peers admitted when the node runs without synchronization.
    /// Empty list = open network.
    pub allow_list: Vec<PeerEndpoint>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            p2p_port: 30303,
            api_port: 4201,
            allow_list: Vec::new(),
        }
    }
}

impl NetworkConfig {
    /// The endpoint this node advertises as itself.
    pub fn self_peer(&self) -> PeerEndpoint {
        PeerEndpoint::new(self.host, self.p2p_port)
    }
}

/// Inbound queue and worker pool sizing.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Bounded inbound queue capacity.
    pub queue_capacity: usize,
    /// Concurrent worker job limit.
    pub worker_count: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            queue_capacity: 4096,
            worker_count: num_cpus::get().max(1),
        }
    }
}

impl DispatchSettings {
    /// Convert into the dispatcher's own configuration type.
    pub fn to_dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            queue_capacity: self.queue_capacity,
            worker_count: self.worker_count,
        }
    }
}

/// Startup synchronization configuration.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Deployment role of this node.
    pub role: NodeRole,
    /// Synchronization strategy to start with.
    pub mode: SyncMode,
    /// Whether to retrieve local history before syncing.
    pub retrieve_history: bool,
    /// Whether the peer manager loads its stored peer configuration.
    pub load_peer_config: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            role: NodeRole::OrdinaryNode,
            mode: SyncMode::NoSync,
            retrieve_history: false,
            load_peer_config: false,
        }
    }
}

impl NodeConfig {
    /// Load configuration from defaults plus `LATTICE_*` environment
    /// overrides.
    pub fn from_env() -> Self {
        let mut config = NodeConfig::default();

        if let Ok(host) = std::env::var("LATTICE_HOST") {
            match host.parse() {
                Ok(h) => config.network.host = h,
                Err(_) => warn!("LATTICE_HOST is not a valid address: {host}"),
            }
        }
        if let Ok(port) = std::env::var("LATTICE_P2P_PORT") {
            match port.parse() {
                Ok(p) => config.network.p2p_port = p,
                Err(_) => warn!("LATTICE_P2P_PORT is not a valid port: {port}"),
            }
        }
        if let Ok(port) = std::env::var("LATTICE_API_PORT") {
            match port.parse() {
                Ok(p) => config.network.api_port = p,
                Err(_) => warn!("LATTICE_API_PORT is not a valid port: {port}"),
            }
        }
        if let Ok(capacity) = std::env::var("LATTICE_QUEUE_CAPACITY") {
            match capacity.parse() {
                Ok(c) => config.dispatch.queue_capacity = c,
                Err(_) => warn!("LATTICE_QUEUE_CAPACITY is not a valid size: {capacity}"),
            }
        }
        if let Ok(workers) = std::env::var("LATTICE_WORKERS") {
            match workers.parse() {
                Ok(w) => config.dispatch.worker_count = w,
                Err(_) => warn!("LATTICE_WORKERS is not a valid count: {workers}"),
            }
        }
        if let Ok(role) = std::env::var("LATTICE_ROLE") {
            match role.parse() {
                Ok(r) => config.sync.role = r,
                Err(e) => warn!("LATTICE_ROLE rejected: {e}"),
            }
        }
        if let Ok(mode) = std::env::var("LATTICE_SYNC_MODE") {
            match mode.parse() {
                Ok(m) => config.sync.mode = m,
                Err(e) => warn!("LATTICE_SYNC_MODE rejected: {e}"),
            }
        }
        if let Ok(retrieve) = std::env::var("LATTICE_RETRIEVE_HISTORY") {
            config.sync.retrieve_history = retrieve == "1" || retrieve.eq_ignore_ascii_case("true");
        }
        if let Ok(list) = std::env::var("LATTICE_ALLOW_LIST") {
            config.network.allow_list = parse_allow_list(&list);
        }

        config
    }
}

/// Parse a comma-separated list of `host:port` peers, skipping (and
/// warning about) entries that do not parse.
fn parse_allow_list(raw: &str) -> Vec<PeerEndpoint> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.parse::<SocketAddr>() {
            Ok(addr) => Some(PeerEndpoint::from(addr)),
            Err(_) => {
                warn!("LATTICE_ALLOW_LIST entry is not host:port, skipping: {entry}");
                None
            }
        })
        .collect()
}
