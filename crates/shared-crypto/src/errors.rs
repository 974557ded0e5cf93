//! Crypto error types.

use thiserror::Error;

/// Errors from key handling and verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Bytes do not encode a valid public key.
    #[error("invalid public key encoding")]
    InvalidPublicKey,

    /// Signature did not verify against the message.
    #[error("signature verification failed")]
    SignatureVerificationFailed,
}
