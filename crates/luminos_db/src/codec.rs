//! # Byte Codec
//!
//! Little-endian cursor primitives and the container header shared by every
//! node.
//!
//! ## Header Layout
//!
//! ```text
//! [kind:u8][name_len:u16][name:name_len bytes][size:u32]
//! ```
//!
//! `size` is the total encoded length of the node, header and children
//! included. A reader that does not understand a node can jump over it with
//! [`skip_node`] without looking at the body.

use crate::error::{DbError, DbResult, FormatError};

/// Bytes of header that do not depend on the name: kind + name length + size.
pub const HEADER_FIXED_SIZE: usize = 1 + 2 + 4;

/// Largest encodable node, bounded by the 32-bit size field.
pub const MAX_NODE_SIZE: usize = u32::MAX as usize;

/// Largest encodable name, bounded by the 16-bit length prefix.
pub const MAX_NAME_LEN: usize = u16::MAX as usize;

/// Encoded header length for a node with the given name.
#[inline]
#[must_use]
pub const fn header_size(name: &str) -> usize {
    HEADER_FIXED_SIZE + name.len()
}

/// Kind marker identifying what a node is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ContainerKind {
    /// A single scalar.
    Field = 1,
    /// A named aggregate of fields, strings and arrays.
    Object = 2,
    /// A homogeneous array of scalars.
    Array = 3,
    /// UTF-8 text.
    String = 4,
    /// The top-level container.
    Database = 5,
}

impl ContainerKind {
    /// Converts from u8.
    #[must_use]
    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Self::Field),
            2 => Some(Self::Object),
            3 => Some(Self::Array),
            4 => Some(Self::String),
            5 => Some(Self::Database),
            _ => None,
        }
    }

    /// Lowercase display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Database => "database",
        }
    }
}

/// Fails with [`DbError::NameTooLong`] if `name` cannot be length-prefixed.
pub fn check_name(name: &str) -> DbResult<()> {
    if name.len() > MAX_NAME_LEN {
        return Err(DbError::NameTooLong(name.len()));
    }
    Ok(())
}

/// Growable little-endian writer.
///
/// Callers size the buffer from `size()` up front, so encoding a tree is a
/// single allocation.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buffer: Vec<u8>,
}

impl ByteWriter {
    /// Creates a writer with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of bytes written.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if no bytes have been written.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns a slice of the written data.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the writer, returning the buffer.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Writes a u16 in little-endian format.
    #[inline]
    pub fn write_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a u32 in little-endian format.
    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a u64 in little-endian format.
    #[inline]
    pub fn write_u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Writes a `u32` length prefix, rejecting lengths that do not fit.
    pub fn write_len_u32(&mut self, len: usize, what: &'static str) -> DbResult<()> {
        let len = u32::try_from(len).map_err(|_| DbError::CapacityExceeded {
            what,
            limit: u64::from(u32::MAX),
        })?;
        self.write_u32(len);
        Ok(())
    }

    /// Writes a `u16` count prefix, rejecting counts that do not fit.
    pub fn write_count_u16(&mut self, count: usize, what: &'static str) -> DbResult<()> {
        let count = u16::try_from(count).map_err(|_| DbError::CapacityExceeded {
            what,
            limit: u64::from(u16::MAX),
        })?;
        self.write_u16(count);
        Ok(())
    }

    /// Writes a container header.
    pub fn write_header(&mut self, kind: ContainerKind, name: &str, size: usize) -> DbResult<()> {
        check_name(name)?;
        let size = u32::try_from(size).map_err(|_| DbError::CapacityExceeded {
            what: "node size",
            limit: u64::from(u32::MAX),
        })?;
        self.write_u8(kind as u8);
        #[allow(clippy::cast_possible_truncation)] // checked above
        self.write_u16(name.len() as u16);
        self.write_bytes(name.as_bytes());
        self.write_u32(size);
        Ok(())
    }
}

/// Bounds-checked little-endian reader over a borrowed buffer.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a new reader from a buffer.
    #[must_use]
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Current offset from the start of the buffer.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the number of bytes remaining.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    fn truncated(&self, needed: usize) -> FormatError {
        FormatError::Truncated {
            offset: self.position,
            needed,
            remaining: self.remaining(),
        }
    }

    /// Reads `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> DbResult<&'a [u8]> {
        let end = self
            .position
            .checked_add(len)
            .filter(|end| *end <= self.buffer.len())
            .ok_or_else(|| self.truncated(len))?;
        let buffer: &'a [u8] = self.buffer;
        let bytes = buffer
            .get(self.position..end)
            .ok_or_else(|| self.truncated(len))?;
        self.position = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> DbResult<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> DbResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Reads a u16 in little-endian format.
    #[inline]
    pub fn read_u16(&mut self) -> DbResult<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    /// Reads a u32 in little-endian format.
    #[inline]
    pub fn read_u32(&mut self) -> DbResult<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    /// Reads a u64 in little-endian format.
    #[inline]
    pub fn read_u64(&mut self) -> DbResult<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    /// Returns the next byte without consuming it.
    #[must_use]
    pub fn peek_u8(&self) -> Option<u8> {
        self.buffer.get(self.position).copied()
    }

    /// Advances the cursor by `len` bytes.
    pub fn skip(&mut self, len: usize) -> DbResult<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Reads a u16-prefixed UTF-8 name.
    pub fn read_name(&mut self) -> DbResult<String> {
        let len = usize::from(self.read_u16()?);
        self.read_utf8(len)
    }

    /// Reads `len` bytes of UTF-8 text.
    pub fn read_utf8(&mut self, len: usize) -> DbResult<String> {
        let offset = self.position;
        let bytes = self.read_bytes(len)?;
        let text = std::str::from_utf8(bytes).map_err(|_| FormatError::InvalidUtf8 { offset })?;
        Ok(text.to_owned())
    }
}

/// A parsed container header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeHeader {
    /// What the node is.
    pub kind: ContainerKind,
    /// The node's name.
    pub name: String,
    /// Total encoded size of the node.
    pub size: u32,
    /// Offset of the node's first byte.
    pub start: usize,
}

impl NodeHeader {
    /// Reads a header of any kind at the reader's position.
    ///
    /// The declared size is checked against the header length and the bytes
    /// left in the buffer.
    pub fn read(reader: &mut ByteReader<'_>) -> DbResult<Self> {
        let start = reader.position();
        Self::read_from(reader, start)
    }

    /// Reads a header, failing unless it has the `expected` kind.
    pub fn expect(reader: &mut ByteReader<'_>, expected: ContainerKind) -> DbResult<Self> {
        let start = reader.position();
        Self::expect_from(reader, expected, start)
    }

    /// Like [`NodeHeader::expect`], but the node began at `start`, before
    /// the reader's position.
    pub(crate) fn expect_from(
        reader: &mut ByteReader<'_>,
        expected: ContainerKind,
        start: usize,
    ) -> DbResult<Self> {
        let found = reader.peek_u8().ok_or(FormatError::Truncated {
            offset: reader.position(),
            needed: 1,
            remaining: 0,
        })?;
        if found != expected as u8 {
            return Err(FormatError::UnexpectedKind {
                expected: expected.name(),
                found,
            }
            .into());
        }
        Self::read_from(reader, start)
    }

    fn read_from(reader: &mut ByteReader<'_>, start: usize) -> DbResult<Self> {
        let marker = reader.read_u8()?;
        let kind = ContainerKind::from_u8(marker).ok_or(FormatError::UnknownKind(marker))?;
        let name = reader.read_name()?;
        let size = reader.read_u32()?;

        let header_end = reader.position() - start;
        let body = (size as usize).checked_sub(header_end).ok_or_else(|| {
            FormatError::SizeMismatch {
                name: name.clone(),
                declared: size,
                consumed: header_end,
            }
        })?;
        if body > reader.remaining() {
            return Err(FormatError::Truncated {
                offset: reader.position(),
                needed: body,
                remaining: reader.remaining(),
            }
            .into());
        }

        Ok(Self {
            kind,
            name,
            size,
            start,
        })
    }

    /// Reads the header at the start of `bytes` without touching the body.
    pub fn peek(bytes: &[u8]) -> DbResult<Self> {
        Self::read(&mut ByteReader::new(bytes))
    }

    /// Offset one past the node's last byte.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.size as usize
    }

    /// Checks that parsing the body left the reader exactly at the node's end.
    pub fn finish(&self, reader: &ByteReader<'_>) -> DbResult<()> {
        let consumed = reader.position() - self.start;
        if consumed != self.size as usize {
            return Err(FormatError::SizeMismatch {
                name: self.name.clone(),
                declared: self.size,
                consumed,
            }
            .into());
        }
        Ok(())
    }
}

/// Jumps over the node at the reader's position using only its stored size.
///
/// Returns the skipped node's header.
pub fn skip_node(reader: &mut ByteReader<'_>) -> DbResult<NodeHeader> {
    let header = NodeHeader::read(reader)?;
    reader.skip(header.end() - reader.position())?;
    Ok(header)
}

/// Like [`skip_node`], but fails with `UnexpectedKind` unless the node is an
/// `expected` one.
pub fn skip_node_of(reader: &mut ByteReader<'_>, expected: ContainerKind) -> DbResult<NodeHeader> {
    let header = NodeHeader::expect(reader, expected)?;
    reader.skip(header.end() - reader.position())?;
    Ok(header)
}

/// A tree node with a self-describing encoding.
pub trait Node: Sized {
    /// Kind marker written at the start of the node.
    const KIND: ContainerKind;

    /// The node's name.
    fn name(&self) -> &str;

    /// Exact number of bytes [`Node::encode_into`] writes.
    fn size(&self) -> usize;

    /// Appends the encoded node to `writer`.
    fn encode_into(&self, writer: &mut ByteWriter) -> DbResult<()>;

    /// Parses one node at the reader's position.
    fn decode(reader: &mut ByteReader<'_>) -> DbResult<Self>;

    /// Encodes the node into a freshly allocated buffer of exactly `size()`
    /// bytes.
    fn to_bytes(&self) -> DbResult<Vec<u8>> {
        let mut writer = ByteWriter::with_capacity(self.size());
        self.encode_into(&mut writer)?;
        debug_assert_eq!(writer.len(), self.size(), "size drift in {:?}", self.name());
        Ok(writer.into_inner())
    }

    /// Decodes a buffer holding exactly one node.
    fn from_bytes(bytes: &[u8]) -> DbResult<Self> {
        let mut reader = ByteReader::new(bytes);
        let node = Self::decode(&mut reader)?;
        if reader.remaining() > 0 {
            return Err(FormatError::TrailingBytes(reader.remaining()).into());
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_reader_little_endian() {
        let mut w = ByteWriter::with_capacity(15);
        w.write_u8(0xAB);
        w.write_u16(0x1234);
        w.write_u32(0xDEAD_BEEF);
        w.write_u64(1);
        assert_eq!(&w.as_slice()[..3], &[0xAB, 0x34, 0x12]);

        let bytes = w.into_inner();
        let mut r = ByteReader::new(&bytes);
        assert_eq!(r.read_u8().unwrap(), 0xAB);
        assert_eq!(r.read_u16().unwrap(), 0x1234);
        assert_eq!(r.read_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(r.read_u64().unwrap(), 1);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_read_past_end_is_truncated() {
        let mut r = ByteReader::new(&[1, 2, 3]);
        assert_eq!(
            r.read_u32(),
            Err(DbError::Format(FormatError::Truncated {
                offset: 0,
                needed: 4,
                remaining: 3
            }))
        );
        // A failed read does not move the cursor.
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn test_header_roundtrip_and_peek() {
        let mut w = ByteWriter::default();
        w.write_header(ContainerKind::String, "ttp", header_size("ttp") + 2)
            .unwrap();
        w.write_bytes(&[9, 9]);
        let bytes = w.into_inner();

        let header = NodeHeader::peek(&bytes).unwrap();
        assert_eq!(header.kind, ContainerKind::String);
        assert_eq!(header.name, "ttp");
        assert_eq!(header.size as usize, bytes.len());
    }

    #[test]
    fn test_header_size_smaller_than_header_is_rejected() {
        let mut w = ByteWriter::default();
        w.write_header(ContainerKind::Field, "hp", 3).unwrap();
        let err = NodeHeader::peek(w.as_slice()).unwrap_err();
        assert!(matches!(err, DbError::Format(FormatError::SizeMismatch { .. })));
    }

    #[test]
    fn test_header_size_past_buffer_is_truncated() {
        let mut w = ByteWriter::default();
        w.write_header(ContainerKind::Field, "hp", 1_000).unwrap();
        let err = NodeHeader::peek(w.as_slice()).unwrap_err();
        assert!(matches!(err, DbError::Format(FormatError::Truncated { .. })));
    }

    #[test]
    fn test_unknown_kind_marker() {
        let err = NodeHeader::peek(&[42, 0, 0, 7, 0, 0, 0]).unwrap_err();
        assert_eq!(err, DbError::Format(FormatError::UnknownKind(42)));
    }

    #[test]
    fn test_expect_rejects_other_kind() {
        let mut w = ByteWriter::default();
        w.write_header(ContainerKind::Array, "a", header_size("a")).unwrap();
        let bytes = w.into_inner();
        let err = NodeHeader::expect(&mut ByteReader::new(&bytes), ContainerKind::Field)
            .unwrap_err();
        assert_eq!(
            err,
            DbError::Format(FormatError::UnexpectedKind {
                expected: "field",
                found: ContainerKind::Array as u8
            })
        );
    }

    #[test]
    fn test_skip_node_of_checks_kind() {
        let mut w = ByteWriter::default();
        w.write_header(ContainerKind::Field, "hp", header_size("hp") + 3)
            .unwrap();
        w.write_bytes(&[2, 5, 0]);
        let bytes = w.into_inner();

        let mut reader = ByteReader::new(&bytes);
        let err = skip_node_of(&mut reader, ContainerKind::Object).unwrap_err();
        assert!(matches!(err, DbError::Format(FormatError::UnexpectedKind { .. })));
        assert_eq!(reader.position(), 0);

        let header = skip_node_of(&mut reader, ContainerKind::Field).unwrap();
        assert_eq!(header.name, "hp");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_name_too_long() {
        let name = "x".repeat(MAX_NAME_LEN + 1);
        let mut w = ByteWriter::default();
        assert_eq!(
            w.write_header(ContainerKind::Field, &name, 0),
            Err(DbError::NameTooLong(MAX_NAME_LEN + 1))
        );
        assert!(w.is_empty());
    }

    #[test]
    fn test_invalid_utf8_name() {
        let bytes = [ContainerKind::Field as u8, 2, 0, 0xFF, 0xFE, 9, 0, 0, 0];
        let err = NodeHeader::peek(&bytes).unwrap_err();
        assert_eq!(err, DbError::Format(FormatError::InvalidUtf8 { offset: 3 }));
    }
}
