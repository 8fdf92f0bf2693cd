//! # Database
//!
//! The versioned, magic-tagged top-level container and its `.lum` file
//! persistence.
//!
//! ## Format
//!
//! ```text
//! [3 bytes: magic "LDB"]
//! [2 bytes: version]
//! [header: kind=Database, name, size]
//! [2 bytes: object count]
//! [objects...]
//! ```
//!
//! `size` in the header covers the whole buffer, magic and version included,
//! so `save` can allocate the file contents in one go.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use tracing::{debug, info, warn};

use crate::codec::{
    check_name, header_size, skip_node_of, ByteReader, ByteWriter, ContainerKind, Node, NodeHeader,
    MAX_NODE_SIZE,
};
use crate::config::DbConfig;
use crate::error::{DbError, DbResult, FormatError};
use crate::object::ObjectRecord;

/// Magic bytes identifying a database file.
pub const DB_MAGIC: [u8; 3] = *b"LDB";

/// Current database format version.
pub const FORMAT_VERSION: u16 = 1;

/// File extension for database files.
pub const LUM_EXTENSION: &str = "lum";

/// Maximum objects per database, bounded by the 16-bit count.
const MAX_OBJECTS: usize = u16::MAX as usize;

/// Fixed bytes preceding the database header.
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C)]
struct Preamble {
    magic: [u8; 3],
    version: [u8; 2],
}

impl Preamble {
    const SIZE: usize = std::mem::size_of::<Self>();

    const fn current() -> Self {
        Self {
            magic: DB_MAGIC,
            version: FORMAT_VERSION.to_le_bytes(),
        }
    }

    /// Reads and validates magic, then version.
    fn read(reader: &mut ByteReader<'_>) -> DbResult<Self> {
        let bytes = reader.read_bytes(Self::SIZE)?;
        let preamble: Self = bytemuck::try_pod_read_unaligned(bytes).map_err(|_| {
            FormatError::Truncated {
                offset: 0,
                needed: Self::SIZE,
                remaining: bytes.len(),
            }
        })?;

        if preamble.magic != DB_MAGIC {
            return Err(FormatError::BadMagic {
                found: preamble.magic,
            }
            .into());
        }
        let version = u16::from_le_bytes(preamble.version);
        if version != FORMAT_VERSION {
            return Err(DbError::VersionMismatch {
                expected: FORMAT_VERSION,
                found: version,
            });
        }
        Ok(preamble)
    }
}

/// A named, versioned collection of object records.
#[derive(Clone, Debug, PartialEq)]
pub struct Database {
    name: String,
    size: usize,
    objects: Vec<ObjectRecord>,
}

impl Database {
    /// Creates an empty database.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let size = Self::base_size(&name);
        Self {
            name,
            size,
            objects: Vec::new(),
        }
    }

    fn base_size(name: &str) -> usize {
        Preamble::SIZE + header_size(name) + 2
    }

    /// The database name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total encoded size in bytes, tracked as objects are added.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Objects in insertion order.
    #[must_use]
    pub fn objects(&self) -> &[ObjectRecord] {
        &self.objects
    }

    /// Number of objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Appends an object, growing the tracked size in the same step.
    ///
    /// On error the database is unchanged.
    pub fn add_object(&mut self, object: ObjectRecord) -> DbResult<()> {
        check_name(object.name())?;
        if self.objects.len() >= MAX_OBJECTS {
            return Err(DbError::CapacityExceeded {
                what: "objects",
                limit: MAX_OBJECTS as u64,
            });
        }
        let size = self
            .size
            .checked_add(object.size())
            .filter(|size| *size <= MAX_NODE_SIZE)
            .ok_or(DbError::CapacityExceeded {
                what: "database size",
                limit: MAX_NODE_SIZE as u64,
            })?;

        self.objects.push(object);
        self.size = size;
        debug_assert_eq!(self.size, self.recompute_size(), "database size drifted");
        Ok(())
    }

    /// First object named `name` (case-sensitive).
    #[must_use]
    pub fn find_object(&self, name: &str) -> Option<&ObjectRecord> {
        self.objects.iter().find(|o| o.name() == name)
    }

    /// Size computed from scratch by walking the whole tree.
    #[must_use]
    pub fn recompute_size(&self) -> usize {
        Self::base_size(&self.name)
            + self
                .objects
                .iter()
                .map(ObjectRecord::recompute_size)
                .sum::<usize>()
    }

    /// `<name>.lum`.
    #[must_use]
    pub fn file_name(&self) -> PathBuf {
        Path::new(&self.name).with_extension(LUM_EXTENSION)
    }

    /// Encodes the whole database into exactly `size()` bytes.
    pub fn encode(&self) -> DbResult<Vec<u8>> {
        let mut writer = ByteWriter::with_capacity(self.size);
        writer.write_bytes(bytemuck::bytes_of(&Preamble::current()));
        writer.write_header(ContainerKind::Database, &self.name, self.size)?;
        writer.write_count_u16(self.objects.len(), "objects")?;
        for object in &self.objects {
            object.encode_into(&mut writer)?;
        }
        debug_assert_eq!(writer.len(), self.size, "database size drifted");
        Ok(writer.into_inner())
    }

    /// Decodes a database with the default config.
    pub fn decode(bytes: &[u8]) -> DbResult<Self> {
        Self::decode_with(bytes, &DbConfig::default())
    }

    /// Decodes a database.
    ///
    /// Magic and version are checked before anything else is parsed. Any
    /// error aborts the whole decode.
    pub fn decode_with(bytes: &[u8], config: &DbConfig) -> DbResult<Self> {
        let mut reader = ByteReader::new(bytes);
        Preamble::read(&mut reader)?;
        let header = NodeHeader::expect_from(&mut reader, ContainerKind::Database, 0)?;

        let object_count = usize::from(reader.read_u16()?);
        let mut objects = Vec::with_capacity(object_count.min(reader.remaining()));
        for _ in 0..object_count {
            let object = ObjectRecord::decode(&mut reader)?;
            debug!(
                object = object.name(),
                size = object.size(),
                children = object.child_count(),
                "decoded object"
            );
            objects.push(object);
        }
        header.finish(&reader)?;

        let trailing = reader.remaining();
        if trailing > 0 {
            if !config.allow_trailing_bytes {
                return Err(FormatError::TrailingBytes(trailing).into());
            }
            warn!(database = %header.name, trailing, "ignoring trailing bytes");
        }

        Ok(Self {
            name: header.name,
            size: header.size as usize,
            objects,
        })
    }

    /// Lists the database header and every object header without parsing
    /// object bodies, jumping from object to object by stored size alone.
    pub fn scan(bytes: &[u8]) -> DbResult<(NodeHeader, Vec<NodeHeader>)> {
        let mut reader = ByteReader::new(bytes);
        Preamble::read(&mut reader)?;
        let header = NodeHeader::expect_from(&mut reader, ContainerKind::Database, 0)?;

        let object_count = usize::from(reader.read_u16()?);
        let mut objects = Vec::with_capacity(object_count.min(reader.remaining()));
        for _ in 0..object_count {
            objects.push(skip_node_of(&mut reader, ContainerKind::Object)?);
        }
        header.finish(&reader)?;
        Ok((header, objects))
    }

    /// Saves to `path` with the default config.
    pub fn save(&self, path: impl AsRef<Path>) -> DbResult<()> {
        self.save_with(path, &DbConfig::default())
    }

    /// Encodes the database and writes it to `path` in one write.
    pub fn save_with(&self, path: impl AsRef<Path>, config: &DbConfig) -> DbResult<()> {
        let bytes = self.encode()?;
        write_file(path.as_ref(), &bytes, self.objects.len(), config)
    }

    /// Loads from `path` with the default config.
    pub fn load(path: impl AsRef<Path>) -> DbResult<Self> {
        Self::load_with(path, &DbConfig::default())
    }

    /// Reads the whole file into memory, then decodes it.
    pub fn load_with(path: impl AsRef<Path>, config: &DbConfig) -> DbResult<Self> {
        let path = path.as_ref();
        let bytes = read_file(path, config.max_file_size)?;
        debug!(path = %path.display(), bytes = bytes.len(), "read database file");

        let database = Self::decode_with(&bytes, config)?;
        info!(
            path = %path.display(),
            database = %database.name,
            objects = database.objects.len(),
            "loaded database"
        );
        Ok(database)
    }
}

/// Writes an encoded database to `path`.
///
/// The file handle is closed on every exit path.
pub(crate) fn write_file(
    path: &Path,
    bytes: &[u8],
    objects: usize,
    config: &DbConfig,
) -> DbResult<()> {
    let mut file = File::create(path).map_err(|e| io_error("create", path, &e))?;
    file.write_all(bytes)
        .map_err(|e| io_error("write", path, &e))?;
    if config.sync_on_save {
        file.sync_all().map_err(|e| io_error("sync", path, &e))?;
    }

    info!(
        path = %path.display(),
        objects,
        bytes = bytes.len(),
        "saved database"
    );
    Ok(())
}

fn io_error(action: &str, path: &Path, err: &std::io::Error) -> DbError {
    DbError::Io(format!("failed to {action} {}: {err}", path.display()))
}

/// Reads a whole file, refusing anything larger than `limit`.
fn read_file(path: &Path, limit: u64) -> DbResult<Vec<u8>> {
    let mut file = File::open(path).map_err(|e| io_error("open", path, &e))?;
    let len = file
        .metadata()
        .map_err(|e| io_error("stat", path, &e))?
        .len();
    if len > limit {
        return Err(DbError::FileTooLarge { size: len, limit });
    }

    let mut bytes = Vec::with_capacity(usize::try_from(len).unwrap_or(0));
    file.read_to_end(&mut bytes)
        .map_err(|e| io_error("read", path, &e))?;
    Ok(bytes)
}
