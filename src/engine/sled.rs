//! Sled-backed engine
//!
//! Maps the engine contract onto `sled::Db`. Batches become a single
//! `sled::Batch` applied with `apply_batch`, which sled commits atomically.
//!
//! sled keeps no separate informational log file; what it reports goes
//! through the `log` facade, which the tracing subscriber picks up.

use ::sled::{Batch, Db};

use crate::config::Compression;
use crate::error::{DsError, Result};

use super::{BatchOp, BlockCache, EngineOptions, ReadOptions, StorageEngine, WriteBatch, WriteOptions};

/// On-disk engine backed by `sled`.
///
/// `sled::Db` is internally synchronized and cheap to clone, so this handle
/// can be shared by every command without extra locking.
#[derive(Clone)]
pub struct SledEngine {
    db: Db,

    /// Sizes sled's page cache; held until the handle is dropped
    cache: BlockCache,
}

impl SledEngine {
    /// Block cache this engine was opened with
    pub fn cache(&self) -> &BlockCache {
        &self.cache
    }

    fn sync_if_requested(&self, options: &WriteOptions) -> Result<()> {
        if options.sync {
            self.db.flush()?;
        }
        Ok(())
    }
}

impl StorageEngine for SledEngine {
    fn open(options: &EngineOptions, cache: &BlockCache) -> Result<Self> {
        if !options.create_if_missing && !options.path.exists() {
            return Err(DsError::Open(format!(
                "{}: does not exist (create_if_missing is false)",
                options.path.display()
            )));
        }

        let mut sled_config = ::sled::Config::new()
            .path(&options.path)
            .cache_capacity(cache.capacity())
            .create_new(options.error_if_exists);

        sled_config = match options.compression {
            Compression::None => sled_config.use_compression(false),
            Compression::Zstd { level } => sled_config
                .use_compression(true)
                .compression_factor(level),
        };

        tracing::debug!(
            write_buffer_size = options.write_buffer_size,
            max_open_files = options.max_open_files,
            block_size = options.block_size,
            block_restart_interval = options.block_restart_interval,
            "sled manages these settings internally; recorded for reference only"
        );

        let db = sled_config
            .open()
            .map_err(|e| DsError::Open(format!("{}: {}", options.path.display(), e)))?;

        if options.paranoid_checks {
            let crc = db
                .checksum()
                .map_err(|e| DsError::Open(format!("paranoid check failed: {}", e)))?;
            tracing::info!(checksum = crc, "Paranoid check passed");
        }

        if db.was_recovered() {
            tracing::info!("Recovered existing store at {}", options.path.display());
        }

        Ok(Self {
            db,
            cache: cache.clone(),
        })
    }

    fn get(&self, _options: &ReadOptions, key: &[u8]) -> Result<Option<Vec<u8>>> {
        // sled verifies page checksums on every disk read and always caches
        // what it reads, so neither read option changes its behavior.
        let value = self.db.get(key)?;
        Ok(value.map(|v| v.to_vec()))
    }

    fn put(&self, options: &WriteOptions, key: &[u8], value: &[u8]) -> Result<()> {
        self.db.insert(key, value)?;
        self.sync_if_requested(options)
    }

    fn delete(&self, options: &WriteOptions, key: &[u8]) -> Result<()> {
        self.db.remove(key)?;
        self.sync_if_requested(options)
    }

    fn write(&self, options: &WriteOptions, batch: &WriteBatch) -> Result<()> {
        let mut sled_batch = Batch::default();
        for op in batch.ops() {
            match op {
                BatchOp::Put { key, value } => sled_batch.insert(key.as_slice(), value.as_slice()),
                BatchOp::Delete { key } => sled_batch.remove(key.as_slice()),
            }
        }
        self.db.apply_batch(sled_batch)?;
        self.sync_if_requested(options)
    }

    fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}
