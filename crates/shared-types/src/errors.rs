//! # Error Types
//!
//! Classification of why an inbound message was rejected. Rejections are
//! terminal to the message, never to the process: the network is untrusted
//! and malformed input is logged and discarded.

use thiserror::Error;

/// Why an inbound message could not be routed to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MessageError {
    /// Message shorter than the fixed header.
    #[error("message too short: {len} bytes, minimum {minimum}")]
    TooShort { len: usize, minimum: usize },

    /// Type tag outside the handler registry range.
    #[error("unknown message type {tag:#04x}")]
    UnknownType { tag: u8 },
}
