//! # Primitive Types
//!
//! The eight primitive types a [`Field`](crate::Field) or
//! [`ArrayValue`](crate::ArrayValue) can hold, their on-disk widths, and the
//! closed sum types carrying one payload each.
//!
//! | tag | type   | width | Rust    |
//! |-----|--------|-------|---------|
//! | 1   | Byte   | 1     | `i8`    |
//! | 2   | Short  | 2     | `i16`   |
//! | 3   | Char   | 2     | `u16` (UTF-16 code unit) |
//! | 4   | Int    | 4     | `i32`   |
//! | 5   | Long   | 8     | `i64`   |
//! | 6   | Float  | 4     | `f32`   |
//! | 7   | Double | 8     | `f64`   |
//! | 8   | Bool   | 1     | `bool`  |
//!
//! Floats are stored as raw IEEE-754 bits, so NaN payloads survive a
//! round-trip unchanged.

use std::fmt;

use crate::codec::{ByteReader, ByteWriter};
use crate::error::{DbError, DbResult, FormatError};

/// Identifies which primitive type a payload holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    /// Signed 8-bit integer.
    Byte = 1,
    /// Signed 16-bit integer.
    Short = 2,
    /// UTF-16 code unit.
    Char = 3,
    /// Signed 32-bit integer.
    Int = 4,
    /// Signed 64-bit integer.
    Long = 5,
    /// 32-bit float.
    Float = 6,
    /// 64-bit float.
    Double = 7,
    /// Boolean stored as one byte.
    Bool = 8,
}

impl TypeTag {
    /// All tags in on-disk order.
    pub const ALL: [Self; 8] = [
        Self::Byte,
        Self::Short,
        Self::Char,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
        Self::Bool,
    ];

    /// Encoded width of one value in bytes.
    #[inline]
    #[must_use]
    pub const fn width(self) -> u8 {
        match self {
            Self::Byte | Self::Bool => 1,
            Self::Short | Self::Char => 2,
            Self::Int | Self::Float => 4,
            Self::Long | Self::Double => 8,
        }
    }

    /// Converts from u8.
    #[must_use]
    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Self::Byte),
            2 => Some(Self::Short),
            3 => Some(Self::Char),
            4 => Some(Self::Int),
            5 => Some(Self::Long),
            6 => Some(Self::Float),
            7 => Some(Self::Double),
            8 => Some(Self::Bool),
            _ => None,
        }
    }

    /// Reads a tag byte, rejecting unknown tags.
    pub(crate) fn read(reader: &mut ByteReader<'_>) -> DbResult<Self> {
        let raw = reader.read_u8()?;
        Self::from_u8(raw).ok_or_else(|| FormatError::UnknownType(raw).into())
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Char => "char",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bool => "bool",
        };
        f.write_str(name)
    }
}

fn read_bool(reader: &mut ByteReader<'_>) -> DbResult<bool> {
    match reader.read_u8()? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(FormatError::InvalidBool(other).into()),
    }
}

/// One scalar of one primitive type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    /// Signed 8-bit integer.
    Byte(i8),
    /// Signed 16-bit integer.
    Short(i16),
    /// UTF-16 code unit.
    Char(u16),
    /// Signed 32-bit integer.
    Int(i32),
    /// Signed 64-bit integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Boolean.
    Bool(bool),
}

impl Value {
    /// The tag of the active payload.
    #[must_use]
    pub const fn tag(&self) -> TypeTag {
        match self {
            Self::Byte(_) => TypeTag::Byte,
            Self::Short(_) => TypeTag::Short,
            Self::Char(_) => TypeTag::Char,
            Self::Int(_) => TypeTag::Int,
            Self::Long(_) => TypeTag::Long,
            Self::Float(_) => TypeTag::Float,
            Self::Double(_) => TypeTag::Double,
            Self::Bool(_) => TypeTag::Bool,
        }
    }

    pub(crate) fn write(&self, writer: &mut ByteWriter) {
        match *self {
            Self::Byte(v) => writer.write_bytes(&v.to_le_bytes()),
            Self::Short(v) => writer.write_bytes(&v.to_le_bytes()),
            Self::Char(v) => writer.write_u16(v),
            Self::Int(v) => writer.write_bytes(&v.to_le_bytes()),
            Self::Long(v) => writer.write_bytes(&v.to_le_bytes()),
            Self::Float(v) => writer.write_u32(v.to_bits()),
            Self::Double(v) => writer.write_u64(v.to_bits()),
            Self::Bool(v) => writer.write_u8(u8::from(v)),
        }
    }

    #[allow(clippy::cast_possible_wrap)] // two's complement reinterpretation
    pub(crate) fn read(tag: TypeTag, reader: &mut ByteReader<'_>) -> DbResult<Self> {
        Ok(match tag {
            TypeTag::Byte => Self::Byte(reader.read_u8()? as i8),
            TypeTag::Short => Self::Short(reader.read_u16()? as i16),
            TypeTag::Char => Self::Char(reader.read_u16()?),
            TypeTag::Int => Self::Int(reader.read_u32()? as i32),
            TypeTag::Long => Self::Long(reader.read_u64()? as i64),
            TypeTag::Float => Self::Float(f32::from_bits(reader.read_u32()?)),
            TypeTag::Double => Self::Double(f64::from_bits(reader.read_u64()?)),
            TypeTag::Bool => Self::Bool(read_bool(reader)?),
        })
    }
}

/// A homogeneous array of one primitive type.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueArray {
    /// Signed 8-bit integers.
    Byte(Vec<i8>),
    /// Signed 16-bit integers.
    Short(Vec<i16>),
    /// UTF-16 code units.
    Char(Vec<u16>),
    /// Signed 32-bit integers.
    Int(Vec<i32>),
    /// Signed 64-bit integers.
    Long(Vec<i64>),
    /// 32-bit floats.
    Float(Vec<f32>),
    /// 64-bit floats.
    Double(Vec<f64>),
    /// Booleans.
    Bool(Vec<bool>),
}

impl ValueArray {
    /// The element tag.
    #[must_use]
    pub const fn tag(&self) -> TypeTag {
        match self {
            Self::Byte(_) => TypeTag::Byte,
            Self::Short(_) => TypeTag::Short,
            Self::Char(_) => TypeTag::Char,
            Self::Int(_) => TypeTag::Int,
            Self::Long(_) => TypeTag::Long,
            Self::Float(_) => TypeTag::Float,
            Self::Double(_) => TypeTag::Double,
            Self::Bool(_) => TypeTag::Bool,
        }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Byte(v) => v.len(),
            Self::Short(v) => v.len(),
            Self::Char(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Long(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::Bool(v) => v.len(),
        }
    }

    /// Returns true if the array has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Payload bytes: `count * width(tag)`.
    #[must_use]
    pub fn data_size(&self) -> usize {
        data_size(self.tag(), self.len())
    }

    pub(crate) fn write(&self, writer: &mut ByteWriter) {
        match self {
            Self::Byte(v) => v.iter().for_each(|x| writer.write_bytes(&x.to_le_bytes())),
            Self::Short(v) => v.iter().for_each(|x| writer.write_bytes(&x.to_le_bytes())),
            Self::Char(v) => v.iter().for_each(|x| writer.write_u16(*x)),
            Self::Int(v) => v.iter().for_each(|x| writer.write_bytes(&x.to_le_bytes())),
            Self::Long(v) => v.iter().for_each(|x| writer.write_bytes(&x.to_le_bytes())),
            Self::Float(v) => v.iter().for_each(|x| writer.write_u32(x.to_bits())),
            Self::Double(v) => v.iter().for_each(|x| writer.write_u64(x.to_bits())),
            Self::Bool(v) => v.iter().for_each(|x| writer.write_u8(u8::from(*x))),
        }
    }

    /// Reads `count` elements of `tag`.
    ///
    /// The whole payload length is checked against the buffer before any
    /// allocation, so a corrupt count cannot trigger a huge reservation.
    pub(crate) fn read(tag: TypeTag, count: usize, reader: &mut ByteReader<'_>) -> DbResult<Self> {
        let needed = count
            .checked_mul(usize::from(tag.width()))
            .ok_or(DbError::CapacityExceeded {
                what: "array payload",
                limit: u64::from(u32::MAX),
            })?;
        if needed > reader.remaining() {
            return Err(FormatError::Truncated {
                offset: reader.position(),
                needed,
                remaining: reader.remaining(),
            }
            .into());
        }

        fn collect<T>(
            count: usize,
            reader: &mut ByteReader<'_>,
            mut read_one: impl FnMut(&mut ByteReader<'_>) -> DbResult<T>,
        ) -> DbResult<Vec<T>> {
            let mut out = Vec::with_capacity(count);
            for _ in 0..count {
                out.push(read_one(reader)?);
            }
            Ok(out)
        }

        #[allow(clippy::cast_possible_wrap)]
        let array = match tag {
            TypeTag::Byte => Self::Byte(collect(count, reader, |r| Ok(r.read_u8()? as i8))?),
            TypeTag::Short => Self::Short(collect(count, reader, |r| Ok(r.read_u16()? as i16))?),
            TypeTag::Char => Self::Char(collect(count, reader, |r| r.read_u16())?),
            TypeTag::Int => Self::Int(collect(count, reader, |r| Ok(r.read_u32()? as i32))?),
            TypeTag::Long => Self::Long(collect(count, reader, |r| Ok(r.read_u64()? as i64))?),
            TypeTag::Float => {
                Self::Float(collect(count, reader, |r| r.read_u32().map(f32::from_bits))?)
            }
            TypeTag::Double => {
                Self::Double(collect(count, reader, |r| r.read_u64().map(f64::from_bits))?)
            }
            TypeTag::Bool => Self::Bool(collect(count, reader, read_bool)?),
        };
        Ok(array)
    }
}

/// Payload bytes for `count` elements of `tag`.
#[inline]
#[must_use]
pub const fn data_size(tag: TypeTag, count: usize) -> usize {
    count * tag.width() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths() {
        let widths: Vec<u8> = TypeTag::ALL.iter().map(|t| t.width()).collect();
        assert_eq!(widths, vec![1, 2, 2, 4, 8, 4, 8, 1]);
    }

    #[test]
    fn test_tag_from_u8() {
        for tag in TypeTag::ALL {
            assert_eq!(TypeTag::from_u8(tag as u8), Some(tag));
        }
        assert_eq!(TypeTag::from_u8(0), None);
        assert_eq!(TypeTag::from_u8(9), None);
    }

    #[test]
    fn test_value_writes_exactly_width_bytes() {
        let values = [
            Value::Byte(-1),
            Value::Short(i16::MIN),
            Value::Char(0xD83D),
            Value::Int(i32::MAX),
            Value::Long(i64::MIN),
            Value::Float(f32::NEG_INFINITY),
            Value::Double(f64::MAX),
            Value::Bool(true),
        ];
        for value in values {
            let mut w = ByteWriter::default();
            value.write(&mut w);
            assert_eq!(w.len(), usize::from(value.tag().width()), "{value:?}");

            let bytes = w.into_inner();
            let back = Value::read(value.tag(), &mut ByteReader::new(&bytes)).unwrap();
            assert_eq!(back, value);
        }
    }

    #[test]
    fn test_nan_bits_preserved() {
        let nan = f32::from_bits(0x7FC0_1234);
        let mut w = ByteWriter::default();
        Value::Float(nan).write(&mut w);
        let bytes = w.into_inner();
        match Value::read(TypeTag::Float, &mut ByteReader::new(&bytes)).unwrap() {
            Value::Float(v) => assert_eq!(v.to_bits(), 0x7FC0_1234),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_invalid_bool_byte() {
        let err = Value::read(TypeTag::Bool, &mut ByteReader::new(&[2])).unwrap_err();
        assert_eq!(err, DbError::Format(FormatError::InvalidBool(2)));
    }

    #[test]
    fn test_array_count_larger_than_buffer() {
        let err = ValueArray::read(TypeTag::Double, 1_000_000, &mut ByteReader::new(&[0; 16]))
            .unwrap_err();
        assert!(matches!(err, DbError::Format(FormatError::Truncated { needed: 8_000_000, .. })));
    }

    #[test]
    fn test_data_size() {
        assert_eq!(data_size(TypeTag::Float, 300), 1200);
        assert_eq!(data_size(TypeTag::Bool, 0), 0);
        assert_eq!(ValueArray::Long(vec![1, 2, 3]).data_size(), 24);
    }
}
