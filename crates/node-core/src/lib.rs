//! # Node Core
//!
//! The message-ingestion and role-synchronization core of a lattice-chain
//! node. Inbound payloads arrive asynchronously from many peers; this crate
//! decouples network reception from processing, routes each payload to the
//! correct protocol module by its type tag, answers gossip fan-out queries,
//! and drives the one-shot startup sync decision.
//!
//! ## Architecture Role
//!
//! ```text
//! [Transport] ──dispatch(RawMessage)──→ [bounded queue]
//!                                            │ intake loop (dedicated task)
//!                                            ↓
//!                                      [worker pool]
//!                                            │ process_message
//!                                            ↓
//!                              registry[type tag].execute(...)
//! ```
//!
//! ## Guarantees
//!
//! - A well-formed message is never dropped: a full queue blocks the
//!   producer (backpressure) instead of discarding.
//! - Every message is owned by exactly one place at a time (queue or worker)
//!   and is released exactly once.
//! - Malformed input is discarded with a warning; it never crashes or stalls
//!   the dispatcher.

pub mod allowlist;
pub mod broadcast;
pub mod config;
pub mod dispatch;
pub mod metrics;
pub mod registry;
pub mod sync;

pub use allowlist::PeerAllowList;
pub use broadcast::BroadcastSelector;
pub use config::DispatchConfig;
pub use dispatch::MessageDispatcher;
pub use metrics::{DispatchMetrics, DispatchMetricsSnapshot};
pub use registry::HandlerRegistry;
pub use sync::{SyncCollaborators, SyncDecision, SyncOrchestrator};
