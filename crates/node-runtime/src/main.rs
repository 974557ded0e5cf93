//! # Lattice-Chain Node
//!
//! Binary entry point: initializes logging, loads configuration from the
//! environment, constructs the node, and runs until interrupted.

use anyhow::Result;
use node_runtime::{InProcessTransport, Node, NodeConfig, NodeParams};
use shared_crypto::NodeKeyPair;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Load the node keypair from `LATTICE_NODE_SEED` (64 hex chars), falling
/// back to a freshly generated ephemeral identity.
fn load_keypair() -> NodeKeyPair {
    if let Ok(seed_hex) = std::env::var("LATTICE_NODE_SEED") {
        match hex::decode(&seed_hex) {
            Ok(bytes) if bytes.len() == 32 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes);
                info!("Loaded node identity seed from environment");
                return NodeKeyPair::from_seed(seed);
            }
            _ => warn!("LATTICE_NODE_SEED must be 32 bytes (64 hex chars); ignoring"),
        }
    }
    warn!("No node identity seed configured; generating an ephemeral identity");
    NodeKeyPair::generate()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("===========================================");
    info!("  Lattice-Chain Node v0.1.0");
    info!("===========================================");

    // Load configuration and identity
    let config = NodeConfig::from_env();
    let key_pair = load_keypair();
    let params = NodeParams::from_config(key_pair, &config);

    // Construct and start the node
    let transport = InProcessTransport::new();
    let node = Node::start(params, &config, &transport).await;

    // Keep the node running
    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    // Graceful shutdown
    node.shutdown().await;

    Ok(())
}
