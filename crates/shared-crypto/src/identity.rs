//! # Address Derivation
//!
//! Derives the node's on-chain address from its public key: SHA-256 over
//! the serialized key, truncated to the 20-byte address width by taking
//! the hash's trailing bytes.
//!
//! Pure and deterministic: the same public key yields the same address on
//! every call and in every process.

use crate::keys::NodePublicKey;
use sha2::{Digest, Sha256};
use shared_types::Address;

/// Derive the 20-byte on-chain address for `public_key`.
pub fn derive_address(public_key: &NodePublicKey) -> Address {
    let digest = Sha256::digest(public_key.as_bytes());

    let mut address = Address::default();
    let addr_len = address.len();
    address.copy_from_slice(&digest[digest.len() - addr_len..]);
    address
}
