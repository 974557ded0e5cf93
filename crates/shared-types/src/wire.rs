//! # Wire Message Model
//!
//! The deframed byte buffer handed to the node by the transport layer,
//! together with its fixed header layout:
//!
//! ```text
//! byte 0:        type tag        (selects protocol module)
//! byte 1:        instruction tag (module-specific)
//! bytes 2..N:    payload
//! ```
//!
//! Anything shorter than `MessageOffset::BODY` is not dispatchable.

use crate::peer::PeerEndpoint;

/// Byte offsets into a deframed wire message.
pub struct MessageOffset;

impl MessageOffset {
    /// Offset of the type tag selecting the protocol module.
    pub const TYPE: usize = 0;
    /// Offset of the module-specific instruction tag.
    pub const INST: usize = 1;
    /// Offset of the payload; also the minimum dispatchable length.
    pub const BODY: usize = 2;
}

/// An owned inbound message plus its originating peer.
///
/// Deliberately not `Clone`: a `RawMessage` has exactly one owner at any
/// point in time (network layer, queue, or worker job), so it is released
/// exactly once and never duplicated on the hot path.
#[derive(Debug)]
pub struct RawMessage {
    bytes: Vec<u8>,
    from: PeerEndpoint,
}

impl RawMessage {
    /// Wrap a deframed buffer received from `from`.
    pub fn new(bytes: Vec<u8>, from: PeerEndpoint) -> Self {
        Self { bytes, from }
    }

    /// Total message length including the header.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for zero-length buffers.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the message is long enough to carry a full header.
    pub fn is_dispatchable(&self) -> bool {
        self.bytes.len() >= MessageOffset::BODY
    }

    /// The type tag, if the message is long enough to carry one header.
    ///
    /// Callers must check `is_dispatchable` first; a message with a type tag
    /// but no instruction tag is still invalid.
    pub fn type_tag(&self) -> Option<u8> {
        if self.is_dispatchable() {
            Some(self.bytes[MessageOffset::TYPE])
        } else {
            None
        }
    }

    /// The module-specific instruction tag.
    pub fn instruction_tag(&self) -> Option<u8> {
        if self.is_dispatchable() {
            Some(self.bytes[MessageOffset::INST])
        } else {
            None
        }
    }

    /// The full buffer, header included. Handlers receive this together with
    /// the offset at which their instruction tag starts.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The peer this message arrived from.
    pub fn from(&self) -> &PeerEndpoint {
        &self.from
    }
}
