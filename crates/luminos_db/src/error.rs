//! # Database Error Types
//!
//! All errors that can occur while building, encoding, decoding, loading or
//! saving a database.

use thiserror::Error;

use crate::types::TypeTag;

/// Structural problems found while decoding a byte buffer.
///
/// The format has no resynchronization points, so any of these aborts the
/// decode of the whole tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A node started with a kind marker other than the one expected here.
    #[error("expected {expected} node, found kind marker {found}")]
    UnexpectedKind {
        /// The kind the decoder was asked to read.
        expected: &'static str,
        /// The marker byte actually present.
        found: u8,
    },

    /// A kind marker that names no node type at all.
    #[error("unknown kind marker {0}")]
    UnknownKind(u8),

    /// A primitive type tag outside the eight known types.
    #[error("unknown type tag {0}")]
    UnknownType(u8),

    /// The file does not start with the database magic.
    #[error("bad magic: found {found:?}")]
    BadMagic {
        /// The bytes found where the magic should be.
        found: [u8; 3],
    },

    /// The buffer ended before a value could be read.
    #[error("truncated input at offset {offset}: need {needed} bytes, {remaining} remaining")]
    Truncated {
        /// Offset of the read that failed.
        offset: usize,
        /// Bytes the read needed.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// A node's stored size disagrees with the bytes its body occupies.
    #[error("size mismatch in {name:?}: declared {declared} bytes, consumed {consumed}")]
    SizeMismatch {
        /// Name of the offending node.
        name: String,
        /// Size stored in the node header.
        declared: u32,
        /// Bytes actually consumed by parsing the node.
        consumed: usize,
    },

    /// A name or string payload is not valid UTF-8.
    #[error("invalid UTF-8 at offset {offset}")]
    InvalidUtf8 {
        /// Offset of the first byte of the text.
        offset: usize,
    },

    /// A bool payload byte other than 0 or 1.
    #[error("invalid bool byte {0}")]
    InvalidBool(u8),

    /// Bytes remain after the database's declared size.
    #[error("{0} trailing bytes after database")]
    TrailingBytes(usize),
}

/// Errors that can occur in the database layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    /// The input bytes are malformed.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// The file was written by an unsupported format version.
    #[error("version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Version this build reads and writes.
        expected: u16,
        /// Version stored in the file.
        found: u16,
    },

    /// A typed accessor was called on a node holding another type.
    #[error("type mismatch: requested {expected}, stored {found}")]
    TypeMismatch {
        /// The type the caller asked for.
        expected: TypeTag,
        /// The type the node holds.
        found: TypeTag,
    },

    /// A node name longer than its 16-bit length prefix allows.
    #[error("name too long: {0} bytes (max 65535)")]
    NameTooLong(usize),

    /// A count or size field would overflow its on-disk width.
    #[error("capacity exceeded: {what} limit is {limit}")]
    CapacityExceeded {
        /// What overflowed.
        what: &'static str,
        /// The maximum the format can hold.
        limit: u64,
    },

    /// `load` refused a file larger than the configured limit.
    #[error("file too large: {size} bytes, limit {limit}")]
    FileTooLarge {
        /// Actual file size.
        size: u64,
        /// Configured limit.
        limit: u64,
    },

    /// Filesystem failure during load or save.
    #[error("i/o error: {0}")]
    Io(String),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The single-writer builder's thread is gone.
    #[error("database writer closed")]
    WriterClosed,
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
