//! Per-call resource scoping
//!
//! Read options, write options and write batches are created fresh for each
//! command. They are handed out as [`Scoped`] guards that record acquisition
//! in a [`ResourceLedger`] and record release when dropped, so every exit
//! path of a command (success, early malformed return, engine error) releases
//! exactly what it acquired.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

/// Kind of per-call object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    ReadOptions,
    WriteOptions,
    WriteBatch,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::ReadOptions => "read options",
            ResourceKind::WriteOptions => "write options",
            ResourceKind::WriteBatch => "write batch",
        };
        f.write_str(name)
    }
}

/// Counts per-call objects handed out and given back.
///
/// Lock-free; shared by all commands running against one context.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    acquired: AtomicU64,
    released: AtomicU64,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `value` in a guard that is accounted for until dropped
    pub fn acquire<T>(&self, kind: ResourceKind, value: T) -> Scoped<'_, T> {
        self.acquired.fetch_add(1, Ordering::AcqRel);
        tracing::trace!("Acquired {}", kind);
        Scoped {
            value,
            kind,
            ledger: self,
        }
    }

    fn release(&self, kind: ResourceKind) {
        self.released.fetch_add(1, Ordering::AcqRel);
        tracing::trace!("Released {}", kind);
    }

    /// Total objects handed out so far
    pub fn acquired(&self) -> u64 {
        self.acquired.load(Ordering::Acquire)
    }

    /// Total objects released so far
    pub fn released(&self) -> u64 {
        self.released.load(Ordering::Acquire)
    }

    /// Objects currently held by in-flight commands
    pub fn outstanding(&self) -> u64 {
        self.acquired().saturating_sub(self.released())
    }
}

/// A per-call object that is released when the guard goes out of scope.
pub struct Scoped<'a, T> {
    value: T,
    kind: ResourceKind,
    ledger: &'a ResourceLedger,
}

impl<T> Scoped<'_, T> {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

impl<T> Deref for Scoped<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Scoped<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T> Drop for Scoped<'_, T> {
    fn drop(&mut self) {
        self.ledger.release(self.kind);
    }
}

impl<T: fmt::Debug> fmt::Debug for Scoped<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scoped")
            .field("kind", &self.kind)
            .field("value", &self.value)
            .finish()
    }
}
