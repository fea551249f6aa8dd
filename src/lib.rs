//! # dskv
//!
//! Batched, binary-safe key-value commands over an embedded ordered engine:
//! - GET / SET / DEL on single keys
//! - MGET aggregated into one delimited, binary-safe reply
//! - MSET and multi-key DEL committed as one atomic write batch
//! - Per-call options and batches released on every exit path
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Command Processor (embedder)                 │
//! │                argv → Command → ... → Reply                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Batch Executor                            │
//! │    point get/set/del · multi get · multi set/del batches     │
//! └───────┬─────────────────────┬───────────────────────────────┘
//!         │                     │
//!         ▼                     ▼
//!  ┌─────────────┐      ┌──────────────┐
//!  │  Aggregator │      │   Context    │  scoped read/write options,
//!  │ (url-style) │      │  (ledger)    │  write batches
//!  └─────────────┘      └──────┬───────┘
//!                              │
//!                              ▼
//!                      ┌──────────────┐
//!                      │    Engine    │  sled / in-memory
//!                      └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod engine;
pub mod scope;
pub mod context;
pub mod executor;
pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DsError, Result};
pub use config::{Compression, Config};
pub use context::Context;
pub use engine::{MemoryEngine, SledEngine, StorageEngine};
pub use executor::BatchExecutor;
pub use protocol::{Command, Reply};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of dskv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
