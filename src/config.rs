//! Configuration for dskv
//!
//! Centralized configuration with sensible defaults. The values are opaque
//! inputs: they are handed to the engine when the store is opened and are
//! not validated here beyond what deserialization enforces.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::EngineOptions;
use crate::error::Result;

/// Main configuration for a dskv store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the engine's files
    pub path: PathBuf,

    /// Create the store if `path` does not exist yet
    pub create_if_missing: bool,

    /// Refuse to open a store that already exists
    pub error_if_exists: bool,

    /// Verify stored data aggressively when opening
    pub paranoid_checks: bool,

    // -------------------------------------------------------------------------
    // Cache Configuration
    // -------------------------------------------------------------------------
    /// Block cache capacity (in bytes)
    pub cache_size: u64,

    // -------------------------------------------------------------------------
    // Engine Tuning
    // -------------------------------------------------------------------------
    /// Amount of data buffered in memory before it is written out (in bytes)
    pub write_buffer_size: usize,

    /// Max number of files the engine may keep open
    pub max_open_files: usize,

    /// Approximate size of user data packed per block (in bytes)
    pub block_size: usize,

    /// Number of keys between restart points for delta encoding of keys
    pub block_restart_interval: usize,

    /// Block compression algorithm
    pub compression: Compression,
}

/// Block compression algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Store blocks uncompressed
    None,

    /// zstd compression at the given level
    Zstd { level: i32 },
}

impl Default for Compression {
    fn default() -> Self {
        Compression::Zstd { level: 5 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./dskv_data"),
            create_if_missing: true,
            error_if_exists: false,
            paranoid_checks: false,
            cache_size: 4 * 1024 * 1024, // 4 MB
            write_buffer_size: 4 * 1024 * 1024, // 4 MB
            max_open_files: 1000,
            block_size: 4 * 1024, // 4 KB
            block_restart_interval: 16,
            compression: Compression::default(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Build the engine options template from this config
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            path: self.path.clone(),
            create_if_missing: self.create_if_missing,
            error_if_exists: self.error_if_exists,
            paranoid_checks: self.paranoid_checks,
            write_buffer_size: self.write_buffer_size,
            max_open_files: self.max_open_files,
            block_size: self.block_size,
            block_restart_interval: self.block_restart_interval,
            compression: self.compression,
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the storage path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the block cache capacity (in bytes)
    pub fn cache_size(mut self, bytes: u64) -> Self {
        self.config.cache_size = bytes;
        self
    }

    pub fn create_if_missing(mut self, yes: bool) -> Self {
        self.config.create_if_missing = yes;
        self
    }

    pub fn error_if_exists(mut self, yes: bool) -> Self {
        self.config.error_if_exists = yes;
        self
    }

    /// Set the write buffer size (in bytes)
    pub fn write_buffer_size(mut self, bytes: usize) -> Self {
        self.config.write_buffer_size = bytes;
        self
    }

    pub fn paranoid_checks(mut self, yes: bool) -> Self {
        self.config.paranoid_checks = yes;
        self
    }

    pub fn max_open_files(mut self, count: usize) -> Self {
        self.config.max_open_files = count;
        self
    }

    /// Set the block size (in bytes)
    pub fn block_size(mut self, bytes: usize) -> Self {
        self.config.block_size = bytes;
        self
    }

    pub fn block_restart_interval(mut self, interval: usize) -> Self {
        self.config.block_restart_interval = interval;
        self
    }

    pub fn compression(mut self, compression: Compression) -> Self {
        self.config.compression = compression;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
