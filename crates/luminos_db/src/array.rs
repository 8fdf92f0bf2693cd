//! # Array Value
//!
//! One named homogeneous array.
//!
//! ```text
//! [header][type:u8][count:u32][payload: count * width(type) bytes]
//! ```

use crate::codec::{header_size, ByteReader, ByteWriter, ContainerKind, Node, NodeHeader};
use crate::error::{DbError, DbResult};
use crate::types::{TypeTag, ValueArray};

/// Bytes between the header and the payload: type tag + count.
const ARRAY_PREFIX_SIZE: usize = 1 + 4;

/// A named array of one primitive type.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayValue {
    name: String,
    values: ValueArray,
}

impl ArrayValue {
    /// Creates an array value.
    #[must_use]
    pub fn new(name: impl Into<String>, values: ValueArray) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Creates a byte array.
    #[must_use]
    pub fn byte(name: impl Into<String>, values: &[i8]) -> Self {
        Self::new(name, ValueArray::Byte(values.to_vec()))
    }

    /// Creates a short array.
    #[must_use]
    pub fn short(name: impl Into<String>, values: &[i16]) -> Self {
        Self::new(name, ValueArray::Short(values.to_vec()))
    }

    /// Creates a char array from UTF-16 code units.
    #[must_use]
    pub fn char(name: impl Into<String>, values: &[u16]) -> Self {
        Self::new(name, ValueArray::Char(values.to_vec()))
    }

    /// Creates an int array.
    #[must_use]
    pub fn int(name: impl Into<String>, values: &[i32]) -> Self {
        Self::new(name, ValueArray::Int(values.to_vec()))
    }

    /// Creates a long array.
    #[must_use]
    pub fn long(name: impl Into<String>, values: &[i64]) -> Self {
        Self::new(name, ValueArray::Long(values.to_vec()))
    }

    /// Creates a float array.
    #[must_use]
    pub fn float(name: impl Into<String>, values: &[f32]) -> Self {
        Self::new(name, ValueArray::Float(values.to_vec()))
    }

    /// Creates a double array.
    #[must_use]
    pub fn double(name: impl Into<String>, values: &[f64]) -> Self {
        Self::new(name, ValueArray::Double(values.to_vec()))
    }

    /// Creates a bool array.
    #[must_use]
    pub fn bool(name: impl Into<String>, values: &[bool]) -> Self {
        Self::new(name, ValueArray::Bool(values.to_vec()))
    }

    /// The stored values.
    #[must_use]
    pub const fn values(&self) -> &ValueArray {
        &self.values
    }

    /// Consumes the array, returning the values.
    #[must_use]
    pub fn into_values(self) -> ValueArray {
        self.values
    }

    /// The element type.
    #[must_use]
    pub const fn tag(&self) -> TypeTag {
        self.values.tag()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the array has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Payload bytes, a pure function of type and count.
    #[must_use]
    pub fn data_size(&self) -> usize {
        self.values.data_size()
    }

    fn mismatch(&self, expected: TypeTag) -> DbError {
        DbError::TypeMismatch {
            expected,
            found: self.tag(),
        }
    }

    /// Returns the byte elements, or `TypeMismatch`.
    pub fn as_bytes(&self) -> DbResult<&[i8]> {
        match &self.values {
            ValueArray::Byte(v) => Ok(v),
            _ => Err(self.mismatch(TypeTag::Byte)),
        }
    }

    /// Returns the short elements, or `TypeMismatch`.
    pub fn as_shorts(&self) -> DbResult<&[i16]> {
        match &self.values {
            ValueArray::Short(v) => Ok(v),
            _ => Err(self.mismatch(TypeTag::Short)),
        }
    }

    /// Returns the UTF-16 code units, or `TypeMismatch`.
    pub fn as_chars(&self) -> DbResult<&[u16]> {
        match &self.values {
            ValueArray::Char(v) => Ok(v),
            _ => Err(self.mismatch(TypeTag::Char)),
        }
    }

    /// Returns the int elements, or `TypeMismatch`.
    pub fn as_ints(&self) -> DbResult<&[i32]> {
        match &self.values {
            ValueArray::Int(v) => Ok(v),
            _ => Err(self.mismatch(TypeTag::Int)),
        }
    }

    /// Returns the long elements, or `TypeMismatch`.
    pub fn as_longs(&self) -> DbResult<&[i64]> {
        match &self.values {
            ValueArray::Long(v) => Ok(v),
            _ => Err(self.mismatch(TypeTag::Long)),
        }
    }

    /// Returns the float elements, or `TypeMismatch`.
    pub fn as_floats(&self) -> DbResult<&[f32]> {
        match &self.values {
            ValueArray::Float(v) => Ok(v),
            _ => Err(self.mismatch(TypeTag::Float)),
        }
    }

    /// Returns the double elements, or `TypeMismatch`.
    pub fn as_doubles(&self) -> DbResult<&[f64]> {
        match &self.values {
            ValueArray::Double(v) => Ok(v),
            _ => Err(self.mismatch(TypeTag::Double)),
        }
    }

    /// Returns the bool elements, or `TypeMismatch`.
    pub fn as_bools(&self) -> DbResult<&[bool]> {
        match &self.values {
            ValueArray::Bool(v) => Ok(v),
            _ => Err(self.mismatch(TypeTag::Bool)),
        }
    }
}

impl Node for ArrayValue {
    const KIND: ContainerKind = ContainerKind::Array;

    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> usize {
        header_size(&self.name) + ARRAY_PREFIX_SIZE + self.data_size()
    }

    fn encode_into(&self, writer: &mut ByteWriter) -> DbResult<()> {
        writer.write_header(Self::KIND, &self.name, self.size())?;
        writer.write_u8(self.tag() as u8);
        writer.write_len_u32(self.len(), "array count")?;
        self.values.write(writer);
        Ok(())
    }

    fn decode(reader: &mut ByteReader<'_>) -> DbResult<Self> {
        let header = NodeHeader::expect(reader, Self::KIND)?;
        let tag = TypeTag::read(reader)?;
        let count = reader.read_u32()? as usize;
        let values = ValueArray::read(tag, count, reader)?;
        header.finish(reader)?;
        Ok(Self {
            name: header.name,
            values,
        })
    }
}
