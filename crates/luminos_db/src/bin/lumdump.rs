//! # LUM Dump
//!
//! Command-line inspector for `.lum` asset databases. Prints the node tree
//! with kinds, sizes and value previews, or with `--headers` only walks the
//! object headers.

use std::process::ExitCode;

use luminos_db::{ArrayValue, Database, DbConfig, Node, ObjectRecord, ValueArray};

/// Array elements printed before eliding the rest.
const PREVIEW_LEN: usize = 8;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let Some(path) = args.iter().skip(1).find(|a| !a.starts_with("--")) else {
        println!("Usage: lumdump <database.lum> [--headers]");
        println!();
        println!("Options:");
        println!("  --headers    List object headers without decoding bodies");
        return ExitCode::FAILURE;
    };
    let headers_only = args.iter().any(|a| a == "--headers");

    let result = if headers_only {
        dump_headers(path)
    } else {
        dump_tree(path)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn dump_headers(path: &str) -> Result<(), String> {
    let bytes = std::fs::read(path).map_err(|e| format!("could not read {path}: {e}"))?;
    let (header, objects) = Database::scan(&bytes).map_err(|e| e.to_string())?;

    println!("database {:?} ({} bytes, {} objects)", header.name, header.size, objects.len());
    for object in &objects {
        println!(
            "  @{:<10} {:<8} {:?} ({} bytes)",
            object.start,
            object.kind.name(),
            object.name,
            object.size
        );
    }
    Ok(())
}

fn dump_tree(path: &str) -> Result<(), String> {
    let db = Database::load_with(path, &DbConfig::tooling()).map_err(|e| e.to_string())?;

    println!(
        "database {:?} ({} bytes, {} objects)",
        db.name(),
        db.size(),
        db.object_count()
    );
    for object in db.objects() {
        print_object(object);
    }
    Ok(())
}

fn print_object(object: &ObjectRecord) {
    println!("  object {:?} ({} bytes)", object.name(), object.size());
    for field in object.fields() {
        println!("    field  {:?}: {} = {:?}", field.name(), field.tag(), field.value());
    }
    for string in object.strings() {
        println!("    string {:?} = {:?}", string.name(), string.as_str());
    }
    for array in object.arrays() {
        println!(
            "    array  {:?}: {}[{}] = {}",
            array.name(),
            array.tag(),
            array.len(),
            preview(array)
        );
    }
}

fn preview(array: &ArrayValue) -> String {
    fn head<T: std::fmt::Debug>(values: &[T]) -> String {
        let shown = &values[..values.len().min(PREVIEW_LEN)];
        let mut text = format!("{shown:?}");
        if values.len() > PREVIEW_LEN {
            text.insert_str(text.len() - 1, ", ...");
        }
        text
    }

    match array.values() {
        ValueArray::Byte(v) => head(v),
        ValueArray::Short(v) => head(v),
        ValueArray::Char(v) => head(v),
        ValueArray::Int(v) => head(v),
        ValueArray::Long(v) => head(v),
        ValueArray::Float(v) => head(v),
        ValueArray::Double(v) => head(v),
        ValueArray::Bool(v) => head(v),
    }
}
