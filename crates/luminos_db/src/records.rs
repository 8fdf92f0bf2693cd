//! # Record Conventions
//!
//! Naming conventions the engine's asset pipeline layers on top of plain
//! object records. The codec knows nothing about them.
//!
//! - Every object may carry a byte field `"type"` holding an [`ObjectKind`].
//! - Terrain tiles are objects with the arrays `vertices`, `textureCoords`,
//!   `normals`, `position` and `indices`, plus the texture-pack string `ttp`.

use crate::array::ArrayValue;
use crate::error::DbResult;
use crate::field::Field;
use crate::object::ObjectRecord;
use crate::string::StringValue;

/// Name of the byte field holding the object kind.
pub const OBJECT_KIND_FIELD: &str = "type";

const VERTICES: &str = "vertices";
const TEXTURE_COORDS: &str = "textureCoords";
const NORMALS: &str = "normals";
const POSITION: &str = "position";
const INDICES: &str = "indices";
const TEXTURE_PACK: &str = "ttp";

/// What an object record describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ObjectKind {
    /// A renderable model.
    Model = 0,
    /// A terrain tile.
    Terrain = 1,
    /// A material definition.
    Material = 2,
    /// A scene object.
    GameObject = 3,
}

impl ObjectKind {
    /// Parses a stored kind byte.
    #[must_use]
    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Model),
            1 => Some(Self::Terrain),
            2 => Some(Self::Material),
            3 => Some(Self::GameObject),
            _ => None,
        }
    }
}

/// Adds the `"type"` field to `object`.
pub fn tag_object(object: &mut ObjectRecord, kind: ObjectKind) -> DbResult<()> {
    #[allow(clippy::cast_possible_wrap)]
    let byte = kind as i8;
    object.add_field(Field::byte(OBJECT_KIND_FIELD, byte))
}

/// Reads the `"type"` field. `None` if it is missing, not a byte, or unknown.
#[must_use]
pub fn object_kind(object: &ObjectRecord) -> Option<ObjectKind> {
    let byte = object.find_field(OBJECT_KIND_FIELD)?.as_byte().ok()?;
    #[allow(clippy::cast_sign_loss)]
    let byte = byte as u8;
    ObjectKind::from_u8(byte)
}

/// Mesh data of one terrain tile.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TerrainMesh {
    /// Vertex positions, xyz interleaved.
    pub vertices: Vec<f32>,
    /// Texture coordinates, uv interleaved.
    pub texture_coords: Vec<f32>,
    /// Vertex normals, xyz interleaved.
    pub normals: Vec<f32>,
    /// Triangle indices into `vertices`.
    pub indices: Vec<i32>,
    /// World position of the tile.
    pub position: [f32; 3],
    /// Texture pack the tile samples from.
    pub texture_pack: String,
}

impl TerrainMesh {
    /// Builds the object record for this tile, tagged [`ObjectKind::Terrain`].
    pub fn to_record(&self, name: impl Into<String>) -> DbResult<ObjectRecord> {
        let mut record = ObjectRecord::new(name);
        tag_object(&mut record, ObjectKind::Terrain)?;
        record.add_array(ArrayValue::float(VERTICES, &self.vertices))?;
        record.add_array(ArrayValue::float(TEXTURE_COORDS, &self.texture_coords))?;
        record.add_array(ArrayValue::float(NORMALS, &self.normals))?;
        record.add_array(ArrayValue::float(POSITION, &self.position))?;
        record.add_array(ArrayValue::int(INDICES, &self.indices))?;
        record.add_string(StringValue::new(TEXTURE_PACK, self.texture_pack.as_str()))?;
        Ok(record)
    }

    /// Reads a tile back. `None` if a member is missing or has the wrong type.
    ///
    /// The `"type"` field is not required.
    #[must_use]
    pub fn from_record(record: &ObjectRecord) -> Option<Self> {
        let floats = |name: &str| {
            record
                .find_array(name)
                .and_then(|a| a.as_floats().ok())
                .map(<[f32]>::to_vec)
        };

        let position = record.find_array(POSITION)?.as_floats().ok()?;
        let position: [f32; 3] = position.try_into().ok()?;

        Some(Self {
            vertices: floats(VERTICES)?,
            texture_coords: floats(TEXTURE_COORDS)?,
            normals: floats(NORMALS)?,
            indices: record.find_array(INDICES)?.as_ints().ok()?.to_vec(),
            position,
            texture_pack: record.find_string(TEXTURE_PACK)?.as_str().to_owned(),
        })
    }
}
