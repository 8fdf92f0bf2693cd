//! # Field
//!
//! One named scalar value.
//!
//! ```text
//! [header][type:u8][payload: width(type) bytes]
//! ```

use crate::codec::{header_size, ByteReader, ByteWriter, ContainerKind, Node, NodeHeader};
use crate::error::{DbError, DbResult};
use crate::types::{TypeTag, Value};

/// A named scalar of one of the eight primitive types.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    name: String,
    value: Value,
}

impl Field {
    /// Creates a field holding `value`.
    #[must_use]
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Creates a byte field.
    #[must_use]
    pub fn byte(name: impl Into<String>, value: i8) -> Self {
        Self::new(name, Value::Byte(value))
    }

    /// Creates a short field.
    #[must_use]
    pub fn short(name: impl Into<String>, value: i16) -> Self {
        Self::new(name, Value::Short(value))
    }

    /// Creates a char field from one UTF-16 code unit.
    #[must_use]
    pub fn char(name: impl Into<String>, value: u16) -> Self {
        Self::new(name, Value::Char(value))
    }

    /// Creates an int field.
    #[must_use]
    pub fn int(name: impl Into<String>, value: i32) -> Self {
        Self::new(name, Value::Int(value))
    }

    /// Creates a long field.
    #[must_use]
    pub fn long(name: impl Into<String>, value: i64) -> Self {
        Self::new(name, Value::Long(value))
    }

    /// Creates a float field.
    #[must_use]
    pub fn float(name: impl Into<String>, value: f32) -> Self {
        Self::new(name, Value::Float(value))
    }

    /// Creates a double field.
    #[must_use]
    pub fn double(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, Value::Double(value))
    }

    /// Creates a bool field.
    #[must_use]
    pub fn bool(name: impl Into<String>, value: bool) -> Self {
        Self::new(name, Value::Bool(value))
    }

    /// The stored value.
    #[must_use]
    pub const fn value(&self) -> Value {
        self.value
    }

    /// The stored type tag.
    #[must_use]
    pub const fn tag(&self) -> TypeTag {
        self.value.tag()
    }

    fn mismatch(&self, expected: TypeTag) -> DbError {
        DbError::TypeMismatch {
            expected,
            found: self.tag(),
        }
    }

    /// Returns the byte value, or `TypeMismatch`.
    pub fn as_byte(&self) -> DbResult<i8> {
        match self.value {
            Value::Byte(v) => Ok(v),
            _ => Err(self.mismatch(TypeTag::Byte)),
        }
    }

    /// Returns the short value, or `TypeMismatch`.
    pub fn as_short(&self) -> DbResult<i16> {
        match self.value {
            Value::Short(v) => Ok(v),
            _ => Err(self.mismatch(TypeTag::Short)),
        }
    }

    /// Returns the UTF-16 code unit, or `TypeMismatch`.
    pub fn as_char(&self) -> DbResult<u16> {
        match self.value {
            Value::Char(v) => Ok(v),
            _ => Err(self.mismatch(TypeTag::Char)),
        }
    }

    /// Returns the int value, or `TypeMismatch`.
    pub fn as_int(&self) -> DbResult<i32> {
        match self.value {
            Value::Int(v) => Ok(v),
            _ => Err(self.mismatch(TypeTag::Int)),
        }
    }

    /// Returns the long value, or `TypeMismatch`.
    pub fn as_long(&self) -> DbResult<i64> {
        match self.value {
            Value::Long(v) => Ok(v),
            _ => Err(self.mismatch(TypeTag::Long)),
        }
    }

    /// Returns the float value, or `TypeMismatch`.
    pub fn as_float(&self) -> DbResult<f32> {
        match self.value {
            Value::Float(v) => Ok(v),
            _ => Err(self.mismatch(TypeTag::Float)),
        }
    }

    /// Returns the double value, or `TypeMismatch`.
    pub fn as_double(&self) -> DbResult<f64> {
        match self.value {
            Value::Double(v) => Ok(v),
            _ => Err(self.mismatch(TypeTag::Double)),
        }
    }

    /// Returns the bool value, or `TypeMismatch`.
    pub fn as_bool(&self) -> DbResult<bool> {
        match self.value {
            Value::Bool(v) => Ok(v),
            _ => Err(self.mismatch(TypeTag::Bool)),
        }
    }
}

impl Node for Field {
    const KIND: ContainerKind = ContainerKind::Field;

    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> usize {
        header_size(&self.name) + 1 + usize::from(self.tag().width())
    }

    fn encode_into(&self, writer: &mut ByteWriter) -> DbResult<()> {
        writer.write_header(Self::KIND, &self.name, self.size())?;
        writer.write_u8(self.tag() as u8);
        self.value.write(writer);
        Ok(())
    }

    fn decode(reader: &mut ByteReader<'_>) -> DbResult<Self> {
        let header = NodeHeader::expect(reader, Self::KIND)?;
        let tag = TypeTag::read(reader)?;
        let value = Value::read(tag, reader)?;
        header.finish(reader)?;
        Ok(Self {
            name: header.name,
            value,
        })
    }
}
