//! Integration test for `.lum` file save/load.

use luminos_db::{
    object_kind, ArrayValue, Database, DbConfig, DbError, Field, ObjectKind, ObjectRecord,
    StringValue, TerrainMesh,
};
use std::path::PathBuf;

fn temp_lum_path(tag: &str) -> PathBuf {
    let id = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("test_{tag}_{id}.lum"))
}

fn terrain_db(tiles: usize) -> Database {
    let mut db = Database::new("terrain");
    for t in 0..tiles {
        let mesh = TerrainMesh {
            vertices: vec![t as f32; 96],
            texture_coords: vec![0.5; 64],
            normals: vec![0.0, 1.0, 0.0].repeat(32),
            indices: (0..48).collect(),
            position: [t as f32 * 32.0, 0.0, 0.0],
            texture_pack: format!("pack_{}", t % 3),
        };
        db.add_object(mesh.to_record(format!("tile_{t}")).unwrap()).unwrap();
    }
    db
}

#[test]
fn test_save_then_load() {
    let path = temp_lum_path("save_load");
    let db = terrain_db(4);

    db.save(&path).unwrap();
    assert_eq!(std::fs::metadata(&path).unwrap().len() as usize, db.size());

    let loaded = Database::load(&path).unwrap();
    assert_eq!(loaded, db);

    let tile = loaded.find_object("tile_2").unwrap();
    assert_eq!(object_kind(tile), Some(ObjectKind::Terrain));
    let mesh = TerrainMesh::from_record(tile).unwrap();
    assert_eq!(mesh.position, [64.0, 0.0, 0.0]);
    assert_eq!(mesh.texture_pack, "pack_2");

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_save_overwrites() {
    let path = temp_lum_path("overwrite");
    terrain_db(6).save(&path).unwrap();

    let small = Database::new("small");
    small.save(&path).unwrap();
    assert_eq!(Database::load(&path).unwrap(), small);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_load_missing_file() {
    let err = Database::load(temp_lum_path("missing")).unwrap_err();
    assert!(matches!(err, DbError::Io(_)));
}

#[test]
fn test_load_refuses_oversized_file() {
    let path = temp_lum_path("too_large");
    let db = terrain_db(2);
    db.save(&path).unwrap();

    let config = DbConfig {
        max_file_size: 16,
        ..DbConfig::default()
    };
    assert_eq!(
        Database::load_with(&path, &config),
        Err(DbError::FileTooLarge {
            size: db.size() as u64,
            limit: 16
        })
    );

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_trailing_bytes_policy() {
    let path = temp_lum_path("trailing");
    let db = terrain_db(1);
    let mut bytes = db.encode().unwrap();
    bytes.extend_from_slice(b"junk");
    std::fs::write(&path, &bytes).unwrap();

    assert!(Database::load(&path).is_err());
    assert_eq!(Database::load_with(&path, &DbConfig::tooling()).unwrap(), db);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_config_from_file() {
    let path = std::env::temp_dir().join(format!(
        "test_luminos_config_{}.toml",
        std::process::id()
    ));
    std::fs::write(&path, "max_file_size = 1024\nsync_on_save = false\n").unwrap();

    let config = DbConfig::load(&path).unwrap();
    assert_eq!(config.max_file_size, 1024);
    assert!(!config.sync_on_save);
    assert!(!config.allow_trailing_bytes);

    let db_path = temp_lum_path("configured");
    let mut db = Database::new("configured");
    let mut object = ObjectRecord::new("settings");
    object.add_field(Field::double("gravity", -9.81)).unwrap();
    object.add_string(StringValue::new("biome", "tundra")).unwrap();
    object.add_array(ArrayValue::bool("flags", &[true, false])).unwrap();
    db.add_object(object).unwrap();
    db.save_with(&db_path, &config).unwrap();
    assert_eq!(Database::load_with(&db_path, &config).unwrap(), db);

    std::fs::remove_file(&path).ok();
    std::fs::remove_file(&db_path).ok();
}
