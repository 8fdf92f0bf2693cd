//! # Concurrent Builders
//!
//! A [`Database`] is a plain value with no internal locking. Asset workers
//! that build objects in parallel go through one of these instead:
//!
//! - [`SharedDatabase`]: the database behind a mutex. Every mutation takes
//!   the lock, so the object list and the running size always move together.
//! - [`DatabaseWriter`]: a single writer thread owns the database; producers
//!   submit finished records over a channel.
//!
//! ```text
//!   Worker 1 ──┐
//!   Worker 2 ──┼──> [bounded channel] ──> [writer thread] ──> Database
//!   Worker N ──┘     (ObjectSender)        (single owner)
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::debug;

use crate::codec::Node;
use crate::config::DbConfig;
use crate::database::{write_file, Database};
use crate::error::{DbError, DbResult};
use crate::object::ObjectRecord;

/// Pending records the writer channel holds before producers block.
pub const WRITER_QUEUE_DEPTH: usize = 256;

/// How long the writer waits for a record before rechecking its signals.
const WRITER_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// A database shared between threads behind a mutex.
#[derive(Clone, Debug)]
pub struct SharedDatabase {
    inner: Arc<Mutex<Database>>,
}

impl SharedDatabase {
    /// Creates an empty shared database.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_database(Database::new(name))
    }

    /// Wraps an existing database.
    #[must_use]
    pub fn from_database(database: Database) -> Self {
        Self {
            inner: Arc::new(Mutex::new(database)),
        }
    }

    /// Appends an object under the lock.
    pub fn add_object(&self, object: ObjectRecord) -> DbResult<()> {
        self.inner.lock().add_object(object)
    }

    /// Number of objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.inner.lock().object_count()
    }

    /// Current encoded size.
    #[must_use]
    pub fn size(&self) -> usize {
        self.inner.lock().size()
    }

    /// Clone of the first object named `name`.
    #[must_use]
    pub fn find_object(&self, name: &str) -> Option<ObjectRecord> {
        self.inner.lock().find_object(name).cloned()
    }

    /// Runs `f` with the database locked.
    pub fn with<R>(&self, f: impl FnOnce(&Database) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Encodes a consistent snapshot.
    pub fn encode(&self) -> DbResult<Vec<u8>> {
        self.inner.lock().encode()
    }

    /// Saves a snapshot with the default config.
    pub fn save(&self, path: impl AsRef<Path>) -> DbResult<()> {
        self.save_with(path, &DbConfig::default())
    }

    /// Saves a consistent snapshot to `path`.
    pub fn save_with(&self, path: impl AsRef<Path>, config: &DbConfig) -> DbResult<()> {
        // Encode under the lock, write outside it.
        let (bytes, objects) = {
            let database = self.inner.lock();
            (database.encode()?, database.object_count())
        };
        write_file(path.as_ref(), &bytes, objects, config)
    }

    /// Takes the database out, cloning it if other handles are still alive.
    #[must_use]
    pub fn into_database(self) -> Database {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner(),
            Err(shared) => shared.lock().clone(),
        }
    }
}

/// Handle producers use to submit records to a [`DatabaseWriter`].
#[derive(Clone, Debug)]
pub struct ObjectSender {
    sender: Sender<ObjectRecord>,
}

impl ObjectSender {
    /// Queues a finished record. Blocks while the queue is full.
    ///
    /// Fails with [`DbError::WriterClosed`] once the writer has stopped,
    /// either because it finished or because an earlier add failed.
    pub fn submit(&self, object: ObjectRecord) -> DbResult<()> {
        self.sender.send(object).map_err(|_| DbError::WriterClosed)
    }
}

/// Signals from the owning [`DatabaseWriter`] to its thread.
#[derive(Debug, Default)]
struct WriterSignals {
    /// Append what is queued, then return the database.
    finish: AtomicBool,
    /// Return immediately; the database is being discarded.
    shutdown: AtomicBool,
}

/// Single-writer builder: one thread owns the database and appends records
/// in arrival order.
///
/// The writer never waits on producers: [`DatabaseWriter::finish`] and
/// `drop` both return while [`ObjectSender`]s are still alive, and those
/// senders then fail with [`DbError::WriterClosed`].
pub struct DatabaseWriter {
    sender: Sender<ObjectRecord>,
    signals: Arc<WriterSignals>,
    handle: Option<JoinHandle<DbResult<Database>>>,
}

impl DatabaseWriter {
    /// Starts the writer thread around `database`.
    #[must_use]
    pub fn spawn(database: Database) -> Self {
        let (sender, receiver) = bounded(WRITER_QUEUE_DEPTH);
        let signals = Arc::new(WriterSignals::default());

        let writer_signals = Arc::clone(&signals);
        let handle =
            thread::spawn(move || Self::writer_loop(database, &receiver, &writer_signals));

        Self {
            sender,
            signals,
            handle: Some(handle),
        }
    }

    /// Writer thread main loop. Stops at the first failed add.
    fn writer_loop(
        mut database: Database,
        receiver: &Receiver<ObjectRecord>,
        signals: &WriterSignals,
    ) -> DbResult<Database> {
        loop {
            if signals.shutdown.load(Ordering::Acquire) {
                return Ok(database);
            }
            if signals.finish.load(Ordering::Acquire) {
                for object in receiver.try_iter() {
                    Self::append(&mut database, object)?;
                }
                return Ok(database);
            }

            match receiver.recv_timeout(WRITER_POLL_INTERVAL) {
                Ok(object) => Self::append(&mut database, object)?,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Ok(database),
            }
        }
    }

    fn append(database: &mut Database, object: ObjectRecord) -> DbResult<()> {
        debug!(object = object.name(), "writer appending object");
        database.add_object(object)
    }

    /// A new producer handle.
    #[must_use]
    pub fn sender(&self) -> ObjectSender {
        ObjectSender {
            sender: self.sender.clone(),
        }
    }

    /// Stops the writer and returns the finished database, or the first add
    /// error.
    ///
    /// Every record whose `submit` returned before this call is appended.
    /// Submit everything first: a `submit` racing with `finish` may be
    /// dropped, and later ones fail with [`DbError::WriterClosed`].
    pub fn finish(mut self) -> DbResult<Database> {
        self.signals.finish.store(true, Ordering::Release);
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| DbError::WriterClosed)?,
            None => Err(DbError::WriterClosed),
        }
    }
}

impl Drop for DatabaseWriter {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.signals.shutdown.store(true, Ordering::Release);
            let _ = handle.join();
        }
    }
}
