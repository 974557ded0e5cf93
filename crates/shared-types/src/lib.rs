//! # Shared Types Crate
//!
//! This crate contains the domain types shared across the lattice-chain node:
//! the wire message model, peer endpoints, protocol-module capability traits,
//! and the startup sync mode/role enums.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Single-Owner Messages**: `RawMessage` is a moved value and never
//!   implements `Clone`; ownership flows queue → worker → release.
//! - **Closed Module Set**: The protocol-module set is fixed at startup and
//!   addressed by a byte-sized type tag.

pub mod errors;
pub mod peer;
pub mod protocol;
pub mod sync;
pub mod wire;

pub use errors::MessageError;
pub use peer::PeerEndpoint;
pub use protocol::{Broadcastable, Executable, ModuleKind, ProtocolModule};
pub use sync::{
    CatchUpPoint, DirectorySyncHandle, LedgerSyncHandle, LookupSyncHandle, NodeRole, SyncMode,
};
pub use wire::{MessageOffset, RawMessage};

/// A 20-byte on-chain address, the trailing bytes of the hashed public key.
pub type Address = [u8; 20];

/// A 32-byte Ed25519 public key in serialized form.
pub type PublicKeyBytes = [u8; 32];
