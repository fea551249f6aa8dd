//! In-memory engine
//!
//! Ordered `BTreeMap` behind a `parking_lot::RwLock`. Each value is stored
//! with a CRC32 that is only checked when the read asks for verification.
//!
//! The engine also supports fault injection so that callers can observe
//! how engine errors propagate:
//! - reads of a given key fail
//! - the next single write fails
//! - a batch fails after staging N operations (nothing is applied)
//! - a stored value is corrupted in place

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::{DsError, Result};

use super::{BatchOp, BlockCache, EngineOptions, ReadOptions, StorageEngine, WriteBatch, WriteOptions};

/// Value plus the checksum taken when it was written
#[derive(Debug, Clone)]
struct StoredValue {
    bytes: Vec<u8>,
    crc: u32,
}

impl StoredValue {
    fn new(bytes: Vec<u8>) -> Self {
        let crc = crc32fast::hash(&bytes);
        Self { bytes, crc }
    }

    fn is_intact(&self) -> bool {
        crc32fast::hash(&self.bytes) == self.crc
    }
}

#[derive(Debug, Default)]
struct Faults {
    failing_reads: HashMap<Vec<u8>, String>,
    next_write: Option<String>,
    batch_after: Option<(usize, String)>,
}

#[derive(Debug, Default)]
struct Counters {
    reads: AtomicU64,
    verified_reads: AtomicU64,
    cache_filling_reads: AtomicU64,
    writes: AtomicU64,
    batches: AtomicU64,
}

#[derive(Debug, Default)]
struct Inner {
    data: RwLock<BTreeMap<Vec<u8>, StoredValue>>,
    faults: Mutex<Faults>,
    counters: Counters,
    /// Cache handed to `open`; absent for engines built with `new`
    cache: Option<BlockCache>,
}

/// Read counters, broken down by the options the reads used
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    pub reads: u64,
    pub verified_reads: u64,
    pub cache_filling_reads: u64,
}

/// In-memory engine. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    inner: Arc<Inner>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.inner.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.data.read().is_empty()
    }

    /// Block cache this engine was opened with
    pub fn cache(&self) -> Option<&BlockCache> {
        self.inner.cache.as_ref()
    }

    pub fn read_stats(&self) -> ReadStats {
        let c = &self.inner.counters;
        ReadStats {
            reads: c.reads.load(Ordering::Relaxed),
            verified_reads: c.verified_reads.load(Ordering::Relaxed),
            cache_filling_reads: c.cache_filling_reads.load(Ordering::Relaxed),
        }
    }

    /// Number of successful single puts/deletes
    pub fn write_count(&self) -> u64 {
        self.inner.counters.writes.load(Ordering::Relaxed)
    }

    /// Number of successfully committed batches
    pub fn batch_count(&self) -> u64 {
        self.inner.counters.batches.load(Ordering::Relaxed)
    }

    // =========================================================================
    // Fault injection
    // =========================================================================

    /// Make every read of `key` fail with `message` until cleared
    pub fn fail_reads_for(&self, key: &[u8], message: &str) {
        self.inner
            .faults
            .lock()
            .failing_reads
            .insert(key.to_vec(), message.to_string());
    }

    pub fn clear_read_failure(&self, key: &[u8]) {
        self.inner.faults.lock().failing_reads.remove(key);
    }

    /// Make the next single put or delete fail with `message`
    pub fn fail_next_write(&self, message: &str) {
        self.inner.faults.lock().next_write = Some(message.to_string());
    }

    /// Make the next batch fail after staging `staged` operations. A batch
    /// with no more than `staged` operations fails once staging completes.
    pub fn fail_batch_after(&self, staged: usize, message: &str) {
        self.inner.faults.lock().batch_after = Some((staged, message.to_string()));
    }

    /// Flip the bits of the first byte stored under `key`, leaving its
    /// checksum untouched. Returns false if there is nothing to corrupt.
    pub fn corrupt(&self, key: &[u8]) -> bool {
        let mut data = self.inner.data.write();
        match data.get_mut(key).and_then(|v| v.bytes.first_mut()) {
            Some(byte) => {
                *byte = !*byte;
                true
            }
            None => false,
        }
    }

    fn take_write_fault(&self) -> Option<String> {
        self.inner.faults.lock().next_write.take()
    }
}

impl StorageEngine for MemoryEngine {
    fn open(options: &EngineOptions, cache: &BlockCache) -> Result<Self> {
        tracing::debug!(
            path = %options.path.display(),
            cache_capacity = cache.capacity(),
            "Opening in-memory engine; path is not used"
        );
        Ok(Self {
            inner: Arc::new(Inner {
                cache: Some(cache.clone()),
                ..Inner::default()
            }),
        })
    }

    fn get(&self, options: &ReadOptions, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let counters = &self.inner.counters;
        counters.reads.fetch_add(1, Ordering::Relaxed);
        if options.verify_checksums {
            counters.verified_reads.fetch_add(1, Ordering::Relaxed);
        }
        if options.fill_cache {
            counters.cache_filling_reads.fetch_add(1, Ordering::Relaxed);
        }

        if let Some(message) = self.inner.faults.lock().failing_reads.get(key) {
            return Err(DsError::Engine(message.clone()));
        }

        let data = self.inner.data.read();
        match data.get(key) {
            None => Ok(None),
            Some(stored) if options.verify_checksums && !stored.is_intact() => Err(
                DsError::Engine("Corruption: block checksum mismatch".to_string()),
            ),
            Some(stored) => Ok(Some(stored.bytes.clone())),
        }
    }

    fn put(&self, _options: &WriteOptions, key: &[u8], value: &[u8]) -> Result<()> {
        if let Some(message) = self.take_write_fault() {
            return Err(DsError::Engine(message));
        }
        self.inner
            .data
            .write()
            .insert(key.to_vec(), StoredValue::new(value.to_vec()));
        self.inner.counters.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn delete(&self, _options: &WriteOptions, key: &[u8]) -> Result<()> {
        if let Some(message) = self.take_write_fault() {
            return Err(DsError::Engine(message));
        }
        self.inner.data.write().remove(key);
        self.inner.counters.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn write(&self, _options: &WriteOptions, batch: &WriteBatch) -> Result<()> {
        let fault = self.inner.faults.lock().batch_after.take();

        // Stage every operation before touching the map, so a fault
        // part-way through leaves the store unchanged.
        let mut staged: Vec<(&[u8], Option<StoredValue>)> = Vec::with_capacity(batch.len());
        for op in batch.ops() {
            if let Some((after, message)) = &fault {
                if staged.len() == *after {
                    return Err(DsError::Engine(message.clone()));
                }
            }
            match op {
                BatchOp::Put { key, value } => {
                    staged.push((key.as_slice(), Some(StoredValue::new(value.clone()))))
                }
                BatchOp::Delete { key } => staged.push((key.as_slice(), None)),
            }
        }

        if let Some((_, message)) = fault {
            return Err(DsError::Engine(message));
        }

        let mut data = self.inner.data.write();
        for (key, value) in staged {
            match value {
                Some(value) => {
                    data.insert(key.to_vec(), value);
                }
                None => {
                    data.remove(key);
                }
            }
        }
        self.inner.counters.batches.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}
