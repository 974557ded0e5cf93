//! # Node Keypair
//!
//! Ed25519 keypair wrapper. The keypair is generated or loaded outside the
//! node and handed in at construction; secret material is zeroized on drop.

use crate::CryptoError;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use shared_types::PublicKeyBytes;
use zeroize::Zeroize;

/// Serialized Ed25519 public key (32 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodePublicKey(PublicKeyBytes);

impl NodePublicKey {
    /// Create from bytes, validating the curve point.
    pub fn from_bytes(bytes: PublicKeyBytes) -> Result<Self, CryptoError> {
        VerifyingKey::from_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Serialized key bytes.
    pub fn as_bytes(&self) -> &PublicKeyBytes {
        &self.0
    }

    /// Verify a signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &NodeSignature) -> Result<(), CryptoError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// Ed25519 signature (64 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeSignature([u8; 64]);

impl NodeSignature {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Raw signature bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

/// The node's identity keypair.
pub struct NodeKeyPair {
    signing_key: SigningKey,
}

impl NodeKeyPair {
    /// Generate a random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from a secret seed (32 bytes).
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        Self { signing_key }
    }

    /// The public half of the keypair.
    pub fn public_key(&self) -> NodePublicKey {
        NodePublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message (deterministic nonce, no RNG needed).
    pub fn sign(&self, message: &[u8]) -> NodeSignature {
        NodeSignature(self.signing_key.sign(message).to_bytes())
    }
}

impl Drop for NodeKeyPair {
    fn drop(&mut self) {
        let mut bytes = self.signing_key.to_bytes();
        bytes.zeroize();
    }
}
