//! # Shared Crypto Crate
//!
//! Node identity primitives: the Ed25519 keypair supplied at node
//! construction and the pure address-derivation function consumed by the
//! composition root at startup.

pub mod errors;
pub mod identity;
pub mod keys;

pub use errors::CryptoError;
pub use identity::derive_address;
pub use keys::{NodeKeyPair, NodePublicKey, NodeSignature};
