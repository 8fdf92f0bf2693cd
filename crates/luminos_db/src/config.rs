//! # Database Configuration
//!
//! Limits and policies applied when loading and saving `.lum` files.
//! Loaded once at startup from TOML:
//!
//! ```toml
//! max_file_size = 268435456
//! allow_trailing_bytes = false
//! sync_on_save = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DbError, DbResult};

/// Default refusal threshold for `load` (256 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 256 * 1024 * 1024;

/// Policies for file I/O and decoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DbConfig {
    /// `load` refuses files larger than this many bytes.
    pub max_file_size: u64,
    /// Accept bytes after the database's declared size instead of failing.
    pub allow_trailing_bytes: bool,
    /// `fsync` the file after `save` writes it.
    pub sync_on_save: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allow_trailing_bytes: false,
            sync_on_save: true,
        }
    }
}

impl DbConfig {
    /// Lenient preset for inspection tools: tolerates trailing garbage,
    /// skips the fsync, and accepts any file a 32-bit size can describe.
    #[must_use]
    pub const fn tooling() -> Self {
        Self {
            max_file_size: 1 << 32,
            allow_trailing_bytes: true,
            sync_on_save: false,
        }
    }

    /// Parses a config from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> DbResult<Self> {
        toml::from_str(text).map_err(|e| DbError::InvalidConfig(e.to_string()))
    }

    /// Reads and parses a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DbError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }
}
