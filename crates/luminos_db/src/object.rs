//! # Object Record
//!
//! A named aggregate of fields, strings and arrays.
//!
//! ```text
//! [header]
//! [field_count:u16]  fields...
//! [string_count:u16] strings...
//! [array_count:u16]  arrays...
//! ```
//!
//! Children are append-only. Each `add_*` call pushes the child and grows the
//! tracked size in the same step; the counts are the list lengths, so they
//! can never disagree with the contents.
//!
//! Lookups are case-sensitive exact matches and return the first child with
//! the requested name.

use crate::array::ArrayValue;
use crate::codec::{
    check_name, header_size, ByteReader, ByteWriter, ContainerKind, Node, NodeHeader,
    MAX_NODE_SIZE,
};
use crate::error::{DbError, DbResult};
use crate::field::Field;
use crate::string::StringValue;

/// Bytes taken by the three child counts.
const COUNTS_SIZE: usize = 3 * 2;

/// Maximum children of one kind, bounded by the 16-bit count.
const MAX_CHILDREN: usize = u16::MAX as usize;

/// A named aggregate of fields, strings and arrays.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectRecord {
    name: String,
    size: usize,
    fields: Vec<Field>,
    strings: Vec<StringValue>,
    arrays: Vec<ArrayValue>,
}

impl ObjectRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let size = header_size(&name) + COUNTS_SIZE;
        Self {
            name,
            size,
            fields: Vec::new(),
            strings: Vec::new(),
            arrays: Vec::new(),
        }
    }

    /// Validates a prospective child and returns the record size after
    /// adding it. Nothing is mutated.
    fn grown_size(
        &self,
        len: usize,
        what: &'static str,
        child_name: &str,
        child_size: usize,
    ) -> DbResult<usize> {
        check_name(child_name)?;
        if len >= MAX_CHILDREN {
            return Err(DbError::CapacityExceeded {
                what,
                limit: MAX_CHILDREN as u64,
            });
        }
        self.size
            .checked_add(child_size)
            .filter(|size| *size <= MAX_NODE_SIZE)
            .ok_or(DbError::CapacityExceeded {
                what: "object size",
                limit: MAX_NODE_SIZE as u64,
            })
    }

    /// Appends a field.
    pub fn add_field(&mut self, field: Field) -> DbResult<()> {
        let size = self.grown_size(self.fields.len(), "fields", field.name(), field.size())?;
        self.fields.push(field);
        self.size = size;
        self.debug_check_size();
        Ok(())
    }

    /// Appends a string.
    pub fn add_string(&mut self, string: StringValue) -> DbResult<()> {
        let size = self.grown_size(self.strings.len(), "strings", string.name(), string.size())?;
        self.strings.push(string);
        self.size = size;
        self.debug_check_size();
        Ok(())
    }

    /// Appends an array.
    pub fn add_array(&mut self, array: ArrayValue) -> DbResult<()> {
        let size = self.grown_size(self.arrays.len(), "arrays", array.name(), array.size())?;
        self.arrays.push(array);
        self.size = size;
        self.debug_check_size();
        Ok(())
    }

    /// First field named `name`.
    #[must_use]
    pub fn find_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// First string named `name`.
    #[must_use]
    pub fn find_string(&self, name: &str) -> Option<&StringValue> {
        self.strings.iter().find(|s| s.name() == name)
    }

    /// First array named `name`.
    #[must_use]
    pub fn find_array(&self, name: &str) -> Option<&ArrayValue> {
        self.arrays.iter().find(|a| a.name() == name)
    }

    /// Fields in insertion order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Strings in insertion order.
    #[must_use]
    pub fn strings(&self) -> &[StringValue] {
        &self.strings
    }

    /// Arrays in insertion order.
    #[must_use]
    pub fn arrays(&self) -> &[ArrayValue] {
        &self.arrays
    }

    /// Total number of children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.fields.len() + self.strings.len() + self.arrays.len()
    }

    /// Size computed from scratch by walking every child.
    ///
    /// Always equals [`Node::size`]; exposed so callers and tests can check
    /// the incremental bookkeeping.
    #[must_use]
    pub fn recompute_size(&self) -> usize {
        header_size(&self.name)
            + COUNTS_SIZE
            + self.fields.iter().map(Node::size).sum::<usize>()
            + self.strings.iter().map(Node::size).sum::<usize>()
            + self.arrays.iter().map(Node::size).sum::<usize>()
    }

    #[inline]
    fn debug_check_size(&self) {
        debug_assert_eq!(
            self.size,
            self.recompute_size(),
            "tracked size drifted in object {:?}",
            self.name
        );
    }
}

impl Node for ObjectRecord {
    const KIND: ContainerKind = ContainerKind::Object;

    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> usize {
        self.size
    }

    fn encode_into(&self, writer: &mut ByteWriter) -> DbResult<()> {
        writer.write_header(Self::KIND, &self.name, self.size)?;

        writer.write_count_u16(self.fields.len(), "fields")?;
        for field in &self.fields {
            field.encode_into(writer)?;
        }

        writer.write_count_u16(self.strings.len(), "strings")?;
        for string in &self.strings {
            string.encode_into(writer)?;
        }

        writer.write_count_u16(self.arrays.len(), "arrays")?;
        for array in &self.arrays {
            array.encode_into(writer)?;
        }

        Ok(())
    }

    fn decode(reader: &mut ByteReader<'_>) -> DbResult<Self> {
        let header = NodeHeader::expect(reader, Self::KIND)?;

        let field_count = usize::from(reader.read_u16()?);
        let mut fields = Vec::with_capacity(field_count.min(reader.remaining()));
        for _ in 0..field_count {
            fields.push(Field::decode(reader)?);
        }

        let string_count = usize::from(reader.read_u16()?);
        let mut strings = Vec::with_capacity(string_count.min(reader.remaining()));
        for _ in 0..string_count {
            strings.push(StringValue::decode(reader)?);
        }

        let array_count = usize::from(reader.read_u16()?);
        let mut arrays = Vec::with_capacity(array_count.min(reader.remaining()));
        for _ in 0..array_count {
            arrays.push(ArrayValue::decode(reader)?);
        }

        header.finish(reader)?;

        // Every byte between start and end was consumed by the children, so
        // the declared size is also the recomputed size.
        let record = Self {
            name: header.name,
            size: header.size as usize,
            fields,
            strings,
            arrays,
        };
        record.debug_check_size();
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;

    fn build(n: usize, m: usize, k: usize) -> ObjectRecord {
        let mut record = ObjectRecord::new("composite");
        for i in 0..n {
            record.add_field(Field::int(format!("f{i}"), i as i32 * 10)).unwrap();
            assert_eq!(record.size(), record.recompute_size());
        }
        for i in 0..m {
            record.add_string(StringValue::new(format!("s{i}"), "x".repeat(i))).unwrap();
            assert_eq!(record.size(), record.recompute_size());
        }
        for i in 0..k {
            record
                .add_array(ArrayValue::double(format!("a{i}"), &vec![i as f64; i]))
                .unwrap();
            assert_eq!(record.size(), record.recompute_size());
        }
        record
    }

    #[test]
    fn test_composite_roundtrip_preserves_order() {
        for n in [0, 1, 5] {
            for m in [0, 1, 5] {
                for k in [0, 1, 5] {
                    let record = build(n, m, k);
                    let bytes = record.to_bytes().unwrap();
                    assert_eq!(bytes.len(), record.size());

                    let back = ObjectRecord::from_bytes(&bytes).unwrap();
                    assert_eq!(back, record, "n={n} m={m} k={k}");
                    let names: Vec<&str> = back.fields().iter().map(Node::name).collect();
                    let expected: Vec<String> = (0..n).map(|i| format!("f{i}")).collect();
                    assert_eq!(names, expected);
                }
            }
        }
    }

    #[test]
    fn test_empty_record_size() {
        let record = ObjectRecord::new("e");
        // 7 header + 1 name + 6 counts
        assert_eq!(record.size(), 14);
        assert_eq!(record.to_bytes().unwrap().len(), 14);
    }

    #[test]
    fn test_find_returns_first_match() {
        let mut record = ObjectRecord::new("dup");
        record.add_field(Field::int("hp", 1)).unwrap();
        record.add_field(Field::int("hp", 2)).unwrap();
        assert_eq!(record.find_field("hp").unwrap().as_int().unwrap(), 1);
    }

    #[test]
    fn test_find_missing_is_none() {
        let record = build(2, 2, 2);
        assert!(record.find_field("nope").is_none());
        assert!(record.find_string("f0").is_none());
        assert!(record.find_array("s1").is_none());
    }

    #[test]
    fn test_find_is_case_sensitive() {
        let mut record = ObjectRecord::new("terrain");
        record.add_string(StringValue::new("ttp", "main")).unwrap();
        assert!(record.find_string("ttp").is_some());
        assert!(record.find_string("TTP").is_none());
    }

    #[test]
    fn test_name_too_long_leaves_record_untouched() {
        let mut record = ObjectRecord::new("r");
        let before = record.size();
        let err = record
            .add_field(Field::bool("n".repeat(70_000), true))
            .unwrap_err();
        assert_eq!(err, DbError::NameTooLong(70_000));
        assert_eq!(record.size(), before);
        assert!(record.fields().is_empty());
    }

    #[test]
    fn test_field_limit() {
        let mut record = ObjectRecord::new("many");
        record.fields = vec![Field::bool("", true); MAX_CHILDREN];
        record.size = record.recompute_size();
        let err = record.add_field(Field::bool("", true)).unwrap_err();
        assert!(matches!(err, DbError::CapacityExceeded { what: "fields", .. }));
        assert_eq!(record.fields().len(), MAX_CHILDREN);
        assert_eq!(record.to_bytes().unwrap().len(), record.size());
    }

    #[test]
    fn test_child_corruption_aborts_decode() {
        let mut record = ObjectRecord::new("o");
        record.add_field(Field::int("hp", 5)).unwrap();
        let mut bytes = record.to_bytes().unwrap();
        // object header (8) + field count (2) puts the field's kind at 10
        bytes[10] = ContainerKind::Array as u8;
        assert!(matches!(
            ObjectRecord::from_bytes(&bytes),
            Err(DbError::Format(FormatError::UnexpectedKind { .. }))
        ));
    }

    #[test]
    fn test_truncated_record() {
        let bytes = build(1, 1, 1).to_bytes().unwrap();
        for cut in [1, 8, bytes.len() / 2, bytes.len() - 1] {
            assert!(ObjectRecord::from_bytes(&bytes[..cut]).is_err(), "cut at {cut}");
        }
    }
}
