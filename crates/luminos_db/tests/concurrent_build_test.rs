//! Integration test for building one database from many threads.

use luminos_db::{
    ArrayValue, Database, DatabaseWriter, DbError, Field, Node, ObjectRecord, SharedDatabase,
};
use std::collections::HashSet;
use std::thread;

const THREADS: usize = 8;
const PER_THREAD: usize = 64;

fn tile(t: usize, i: usize) -> ObjectRecord {
    let mut object = ObjectRecord::new(format!("tile_{t}_{i}"));
    object.add_field(Field::int("worker", t as i32)).unwrap();
    object.add_array(ArrayValue::float("heights", &vec![i as f32; i % 17])).unwrap();
    object
}

fn assert_complete(db: &Database) {
    assert_eq!(db.object_count(), THREADS * PER_THREAD);
    assert_eq!(db.size(), db.recompute_size());

    let names: HashSet<&str> = db.objects().iter().map(Node::name).collect();
    assert_eq!(names.len(), THREADS * PER_THREAD);

    let bytes = db.encode().unwrap();
    assert_eq!(bytes.len(), db.size());
    assert_eq!(&Database::decode(&bytes).unwrap(), db);
}

#[test]
fn test_shared_database_parallel_adds() {
    let shared = SharedDatabase::new("parallel");

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let shared = shared.clone();
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    shared.add_object(tile(t, i)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_complete(&shared.into_database());
}

#[test]
fn test_shared_snapshot_while_writing() {
    let shared = SharedDatabase::new("snapshots");

    let writer = {
        let shared = shared.clone();
        thread::spawn(move || {
            for i in 0..PER_THREAD {
                shared.add_object(tile(0, i)).unwrap();
            }
        })
    };

    // Every snapshot must be internally consistent, whatever its length.
    for _ in 0..32 {
        let bytes = shared.encode().unwrap();
        let db = Database::decode(&bytes).unwrap();
        assert_eq!(db.size(), bytes.len());
    }
    writer.join().unwrap();
    assert_eq!(shared.object_count(), PER_THREAD);
}

#[test]
fn test_writer_actor_parallel_producers() {
    let writer = DatabaseWriter::spawn(Database::new("actor"));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let sender = writer.sender();
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    sender.submit(tile(t, i)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_complete(&writer.finish().unwrap());
}

#[test]
fn test_writer_preserves_single_producer_order() {
    let writer = DatabaseWriter::spawn(Database::new("ordered"));
    let sender = writer.sender();
    for i in 0..PER_THREAD {
        sender.submit(tile(0, i)).unwrap();
    }
    drop(sender);

    let db = writer.finish().unwrap();
    let names: Vec<String> = db.objects().iter().map(|o| o.name().to_owned()).collect();
    let expected: Vec<String> = (0..PER_THREAD).map(|i| format!("tile_0_{i}")).collect();
    assert_eq!(names, expected);
}

#[test]
fn test_submit_after_writer_failed() {
    let writer = DatabaseWriter::spawn(Database::new("failing"));
    let sender = writer.sender();
    sender.submit(ObjectRecord::new("n".repeat(70_000))).unwrap();

    // The writer exits on the bad record and drops its receiver.
    let mut closed = false;
    for i in 0..10_000 {
        if sender.submit(tile(1, i)) == Err(DbError::WriterClosed) {
            closed = true;
            break;
        }
        thread::yield_now();
    }
    assert!(closed);

    drop(sender);
    assert_eq!(writer.finish(), Err(DbError::NameTooLong(70_000)));
}
