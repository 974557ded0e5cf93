//! # Lattice-Chain Node Runtime
//!
//! The composition root of the lattice-chain node.
//!
//! ## Modular Structure
//!
//! - `config` - Node configuration with environment overrides
//! - `modules/` - The five protocol modules at their interface boundary
//! - `peers` - Shared peer table feeding gossip fan-out
//! - `transport` - Transport-layer handle (self-peer registration)
//! - `listener` - Optional lookup-node listening service
//! - `node` - The `Node` itself: construction order and lifecycle
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging and load configuration (env overrides)
//! 2. Build the protocol modules and the tag-indexed handler registry
//! 3. Start the message dispatcher (queue + intake loop + worker pool)
//! 4. Log the node's derived address and register the self peer
//! 5. Engage the startup sync decision for the configured role and mode
//! 6. Lookup nodes: attempt to start the listening service (soft failure)

pub mod config;
pub mod listener;
pub mod modules;
pub mod node;
pub mod peers;
pub mod transport;

pub use config::NodeConfig;
pub use node::{Node, NodeParams};
pub use peers::PeerTable;
pub use transport::{InProcessTransport, TransportHandle};
