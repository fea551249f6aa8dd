//! Engine Module
//!
//! The call contract dskv assumes of the embedded storage engine, plus the
//! engines that satisfy it.
//!
//! ## Contract
//! - Ordered, persistent point get/put/delete
//! - Atomic write batches: all operations apply, in order, or none do
//! - Internally synchronized: one handle is shared by every command
//! - Failures come back as `DsError::Engine` carrying the engine's own text
//!
//! ## Engines
//! - [`SledEngine`]: on-disk store backed by `sled`
//! - [`MemoryEngine`]: in-memory store with fault injection, for tests and
//!   embedders that do not need durability

mod memory;
mod sled;

pub use self::memory::{MemoryEngine, ReadStats};
pub use self::sled::SledEngine;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Compression;
use crate::error::Result;

/// Interface every storage engine exposes to the command layer.
///
/// All methods take `&self`; implementations synchronize internally so that a
/// single handle can serve concurrent commands.
pub trait StorageEngine: Send + Sync + 'static {
    /// Open the engine using the process-wide options template and cache
    fn open(options: &EngineOptions, cache: &BlockCache) -> Result<Self>
    where
        Self: Sized;

    /// Look up one key. `Ok(None)` means the key has no entry.
    fn get(&self, options: &ReadOptions, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Store one key
    fn put(&self, options: &WriteOptions, key: &[u8], value: &[u8]) -> Result<()>;

    /// Remove one key. Removing an absent key is not an error.
    fn delete(&self, options: &WriteOptions, key: &[u8]) -> Result<()>;

    /// Commit a batch atomically
    fn write(&self, options: &WriteOptions, batch: &WriteBatch) -> Result<()>;

    /// Push buffered writes to durable storage
    fn flush(&self) -> Result<()>;
}

// =============================================================================
// Process-wide state
// =============================================================================

/// Options template used to open the engine. Built once from `Config`.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub path: PathBuf,
    pub create_if_missing: bool,
    pub error_if_exists: bool,
    pub paranoid_checks: bool,
    pub write_buffer_size: usize,
    pub max_open_files: usize,
    pub block_size: usize,
    pub block_restart_interval: usize,
    pub compression: Compression,
}

/// Handle to the process-wide block cache.
///
/// Records the capacity the engine sizes its own cache with; the engine and
/// the context each hold a handle for as long as they live. Cloning yields
/// another handle to the same cache.
#[derive(Debug, Clone)]
pub struct BlockCache {
    inner: Arc<CacheInner>,
}

#[derive(Debug)]
struct CacheInner {
    capacity: u64,
}

impl BlockCache {
    /// Describe a cache of `capacity` bytes; the engine owns the eviction policy
    pub fn lru(capacity: u64) -> Self {
        Self {
            inner: Arc::new(CacheInner { capacity }),
        }
    }

    /// Capacity in bytes
    pub fn capacity(&self) -> u64 {
        self.inner.capacity
    }

    /// Number of live handles to this cache
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

// =============================================================================
// Per-call objects
// =============================================================================

/// Options for a single read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Verify stored checksums on the data read
    pub verify_checksums: bool,

    /// Populate the block cache with the data read
    pub fill_cache: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            verify_checksums: false,
            fill_cache: true,
        }
    }
}

/// Options for a single write or batch commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Force the write to durable storage before returning
    pub sync: bool,
}

/// One operation inside a write batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

impl BatchOp {
    pub fn key(&self) -> &[u8] {
        match self {
            BatchOp::Put { key, .. } | BatchOp::Delete { key } => key,
        }
    }
}

/// Ordered sequence of puts and deletes committed as one atomic unit.
///
/// A later operation on a key overrides an earlier one in the same batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.ops.push(BatchOp::Put {
            key: key.to_vec(),
            value: value.to_vec(),
        });
    }

    pub fn delete(&mut self, key: &[u8]) {
        self.ops.push(BatchOp::Delete { key: key.to_vec() });
    }

    /// Operations in submission order
    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
