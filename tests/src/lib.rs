//! # Lattice-Chain Test Suite
//!
//! Unified test crate for cross-crate scenarios. Per-crate behavior is
//! covered by each crate's own `#[cfg(test)]` modules; what lives here is
//! the interplay: full dispatch pipelines through a real node and the
//! startup decision matrix.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── pipeline.rs   # Ingestion pipeline end-to-end
//!     └── startup.rs    # Role × sync-mode startup scenarios
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lattice-tests
//! ```

#![allow(dead_code)]

pub mod integration;
