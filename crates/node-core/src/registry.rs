//! # Handler Registry
//!
//! The fixed, tag-indexed table of protocol modules. Built once during node
//! construction and never mutated afterwards, so concurrent reads from any
//! number of worker jobs need no synchronization.

use shared_types::ProtocolModule;
use std::sync::Arc;

/// Ordered table mapping type tag → protocol module, index = tag value.
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn ProtocolModule>>,
}

impl HandlerRegistry {
    /// Build the registry from the module set in tag order.
    ///
    /// Each module's `kind()` must match its position; the registry is the
    /// authoritative tag mapping and a misordered set is a wiring bug.
    pub fn new(handlers: Vec<Arc<dyn ProtocolModule>>) -> Self {
        for (index, handler) in handlers.iter().enumerate() {
            debug_assert_eq!(
                handler.kind().as_tag() as usize,
                index,
                "module {} registered at wrong index {index}",
                handler.kind()
            );
        }
        Self { handlers }
    }

    /// Number of registered modules; tags at or above this are unknown.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True if no modules are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// The module for `tag`, or `None` for out-of-range tags.
    pub fn handler(&self, tag: u8) -> Option<&Arc<dyn ProtocolModule>> {
        self.handlers.get(tag as usize)
    }
}
