//! RocksDB tuning settings.
//!
//! The portal store is small and write-light, so the defaults stay modest;
//! callers embedding the store in a larger process can override them via
//! deserialized config.

use serde::{Deserialize, Serialize};

/// RocksDB settings applied to every column family at open time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocksDbSettings {
    /// Memtable size per column family, in bytes.
    #[serde(default = "default_write_buffer_size")]
    pub write_buffer_size: usize,

    /// Maximum number of memtables per column family.
    #[serde(default = "default_max_write_buffers")]
    pub max_write_buffers: i32,

    /// Shared block cache size, in bytes.
    #[serde(default = "default_block_cache_size")]
    pub block_cache_size: usize,

    /// Maximum number of open SST files.
    #[serde(default = "default_max_open_files")]
    pub max_open_files: i32,
}

fn default_write_buffer_size() -> usize {
    2 * 1024 * 1024
}

fn default_max_write_buffers() -> i32 {
    2
}

fn default_block_cache_size() -> usize {
    4 * 1024 * 1024
}

fn default_max_open_files() -> i32 {
    512
}

impl Default for RocksDbSettings {
    fn default() -> Self {
        Self {
            write_buffer_size: default_write_buffer_size(),
            max_write_buffers: default_max_write_buffers(),
            block_cache_size: default_block_cache_size(),
            max_open_files: default_max_open_files(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = RocksDbSettings::default();
        assert_eq!(settings.write_buffer_size, 2 * 1024 * 1024);
        assert_eq!(settings.max_write_buffers, 2);
        assert_eq!(settings.block_cache_size, 4 * 1024 * 1024);
        assert_eq!(settings.max_open_files, 512);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let settings: RocksDbSettings =
            serde_json::from_str(r#"{"max_open_files": 64}"#).unwrap();
        assert_eq!(settings.max_open_files, 64);
        assert_eq!(settings.write_buffer_size, 2 * 1024 * 1024);
    }
}
