//! # String Value
//!
//! One named UTF-8 string.
//!
//! ```text
//! [header][len:u32][len bytes of UTF-8]
//! ```
//!
//! `len` counts UTF-8 bytes, so non-ASCII text round-trips with the exact
//! same byte count.

use crate::codec::{header_size, ByteReader, ByteWriter, ContainerKind, Node, NodeHeader};
use crate::error::DbResult;

/// A named UTF-8 string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringValue {
    name: String,
    text: String,
}

impl StringValue {
    /// Creates a string value.
    #[must_use]
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// The stored text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length of the text in UTF-8 bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns true if the text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Consumes the value, returning the text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }
}

impl Node for StringValue {
    const KIND: ContainerKind = ContainerKind::String;

    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> usize {
        header_size(&self.name) + 4 + self.text.len()
    }

    fn encode_into(&self, writer: &mut ByteWriter) -> DbResult<()> {
        writer.write_header(Self::KIND, &self.name, self.size())?;
        writer.write_len_u32(self.text.len(), "string length")?;
        writer.write_bytes(self.text.as_bytes());
        Ok(())
    }

    fn decode(reader: &mut ByteReader<'_>) -> DbResult<Self> {
        let header = NodeHeader::expect(reader, Self::KIND)?;
        let len = reader.read_u32()? as usize;
        let text = reader.read_utf8(len)?;
        header.finish(reader)?;
        Ok(Self {
            name: header.name,
            text,
        })
    }
}

impl PartialEq<str> for StringValue {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for StringValue {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}
