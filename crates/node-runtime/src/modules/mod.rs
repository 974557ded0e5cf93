//! # Protocol Modules
//!
//! The five protocol modules at their interface boundary. Each implements
//! `Executable` (inbound message handling) and `Broadcastable` (gossip
//! fan-out policy); the ledger, directory-service, and lookup modules
//! additionally expose the synchronization entry points consumed by the
//! sync orchestrator.
//!
//! The registry order fixes the wire type tags:
//!
//! | tag | module            |
//! |-----|-------------------|
//! | 0   | peer-manager      |
//! | 1   | directory-service |
//! | 2   | ledger            |
//! | 3   | consensus-unit    |
//! | 4   | lookup            |
//!
//! Protocol internals (consensus rounds, block validation, history serving)
//! live behind this boundary and are not part of the runtime.

pub mod consensus_unit;
pub mod directory_service;
pub mod ledger;
pub mod lookup;
pub mod peer_manager;

pub use consensus_unit::ConsensusUnitModule;
pub use directory_service::DirectoryServiceModule;
pub use ledger::LedgerModule;
pub use lookup::LookupModule;
pub use peer_manager::PeerManagerModule;
