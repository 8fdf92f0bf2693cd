//! # LUMINOS Asset Database
//!
//! Binary container format for engine assets (`.lum` files).
//!
//! A database is a named list of object records. Each record holds typed
//! scalar fields, UTF-8 strings and homogeneous arrays. Everything is
//! length-prefixed and little-endian, so a reader can skip any node without
//! understanding its contents.
//!
//! ## Design Principles
//!
//! 1. **Size is always known** - every node tracks its encoded size as it is
//!    built; encoding allocates exactly once
//! 2. **Fail fast** - decoding checks magic, version, kinds, type tags and
//!    declared sizes before trusting any length
//! 3. **No partial state** - a rejected `add_*` leaves the parent untouched
//! 4. **Explicit sharing** - [`Database`] has no internal locking; use
//!    [`SharedDatabase`] or [`DatabaseWriter`] across threads
//!
//! ## Example
//!
//! ```rust,ignore
//! use luminos_db::{ArrayValue, Database, Field, ObjectRecord};
//!
//! let mut tile = ObjectRecord::new("tile_0_0");
//! tile.add_field(Field::long("id", 42))?;
//! tile.add_array(ArrayValue::float("vertices", &vertices))?;
//!
//! let mut db = Database::new("terrain");
//! db.add_object(tile)?;
//! db.save(db.file_name())?;
//!
//! let loaded = Database::load("terrain.lum")?;
//! let id = loaded.find_object("tile_0_0").and_then(|o| o.find_field("id"));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod array;
pub mod codec;
pub mod config;
pub mod database;
pub mod error;
pub mod field;
pub mod object;
pub mod records;
pub mod shared;
pub mod string;
pub mod types;

pub use array::ArrayValue;
pub use codec::{skip_node, skip_node_of, ByteReader, ByteWriter, ContainerKind, Node, NodeHeader};
pub use config::DbConfig;
pub use database::{Database, DB_MAGIC, FORMAT_VERSION, LUM_EXTENSION};
pub use error::{DbError, DbResult, FormatError};
pub use field::Field;
pub use object::ObjectRecord;
pub use records::{object_kind, tag_object, ObjectKind, TerrainMesh};
pub use shared::{DatabaseWriter, ObjectSender, SharedDatabase};
pub use string::StringValue;
pub use types::{TypeTag, Value, ValueArray};
