//! Process-wide store context
//!
//! Owns the engine handle, the options template and the block cache for the
//! lifetime of the process, and hands out per-call objects.
//!
//! ## Lifecycle
//! - `open`: cache → options template → engine handle
//! - `close`: engine handle → options template → cache
//!
//! Commands borrow the context; per-call guards borrow it too, so nothing a
//! command acquires can outlive the context.

use crate::config::Config;
use crate::engine::{BlockCache, EngineOptions, ReadOptions, SledEngine, StorageEngine, WriteBatch, WriteOptions};
use crate::error::{DsError, Result};
use crate::executor::BatchExecutor;
use crate::scope::{ResourceKind, ResourceLedger, Scoped};

/// Process-wide state shared by every command.
///
/// Field order is drop order: handle, template, cache.
pub struct Context<E: StorageEngine = SledEngine> {
    /// Engine handle, synchronized internally by the engine
    engine: E,

    /// Options template the engine was opened with
    options: EngineOptions,

    /// Block cache shared with the engine
    cache: BlockCache,

    /// Accounting for per-call objects
    ledger: ResourceLedger,
}

impl<E: StorageEngine> Context<E> {
    /// Create the cache and options template, then open the engine.
    ///
    /// Any failure is returned as `DsError::Open`; callers treat it as fatal.
    pub fn open(config: &Config) -> Result<Self> {
        let cache = BlockCache::lru(config.cache_size);
        let options = config.engine_options();

        tracing::info!(
            path = %options.path.display(),
            cache_size = cache.capacity(),
            create_if_missing = options.create_if_missing,
            error_if_exists = options.error_if_exists,
            paranoid_checks = options.paranoid_checks,
            compression = ?options.compression,
            "Opening store"
        );

        let engine = E::open(&options, &cache).map_err(|e| match e {
            DsError::Open(_) => e,
            other => DsError::Open(other.to_string()),
        })?;

        tracing::info!("Store opened at {}", options.path.display());

        Ok(Self {
            engine,
            options,
            cache,
            ledger: ResourceLedger::new(),
        })
    }

    /// Build a context around an engine that is already open.
    ///
    /// `cache` must be the cache the engine was opened with.
    pub fn with_engine(engine: E, cache: BlockCache, config: &Config) -> Self {
        Self {
            engine,
            options: config.engine_options(),
            cache,
            ledger: ResourceLedger::new(),
        }
    }

    // =========================================================================
    // Per-call objects
    // =========================================================================

    /// Read options for command reads: no checksum verification, fill cache
    pub fn read_options(&self) -> Scoped<'_, ReadOptions> {
        let options = ReadOptions {
            verify_checksums: false,
            fill_cache: true,
        };
        self.ledger.acquire(ResourceKind::ReadOptions, options)
    }

    /// Write options with the engine's default durability
    pub fn write_options(&self) -> Scoped<'_, WriteOptions> {
        self.ledger
            .acquire(ResourceKind::WriteOptions, WriteOptions::default())
    }

    /// An empty write batch
    pub fn write_batch(&self) -> Scoped<'_, WriteBatch> {
        self.ledger.acquire(ResourceKind::WriteBatch, WriteBatch::new())
    }

    /// Command executor bound to this context
    pub fn executor(&self) -> BatchExecutor<'_, E> {
        BatchExecutor::new(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn cache(&self) -> &BlockCache {
        &self.cache
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    // =========================================================================
    // Shutdown
    // =========================================================================

    /// Flush and release the engine handle, then the options template, then
    /// the cache.
    pub fn close(self) -> Result<()> {
        let Context {
            engine,
            options,
            cache,
            ledger,
        } = self;

        let flushed = engine.flush();
        drop(engine);
        tracing::debug!("Engine handle released");

        drop(options);
        tracing::debug!("Options template released");

        drop(cache);
        tracing::debug!("Block cache released");

        tracing::info!(
            acquired = ledger.acquired(),
            released = ledger.released(),
            "Store closed"
        );

        flushed
    }
}
