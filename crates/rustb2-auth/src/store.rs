//! Session persistence.
//!
//! A [`SessionStore`] is a tiny key/value store for JSON values. It does not
//! know about expiry; that is the [`crate::SessionManager`]'s job. Both
//! implementations take a read-write lock so concurrent readers never block
//! each other while a writer is exclusive.

use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use rustb2_core::B2Result;
use serde_json::{Map, Value};
use tracing::debug;

/// Name of the file a [`DiskStore`] writes inside its directory.
pub const CACHE_FILE_NAME: &str = "cache.json";

/// A key/value store for cached session data.
pub trait SessionStore: Send + Sync + Debug {
    /// Read the value stored under `key`. A missing value is `Ok(None)`.
    fn get(&self, key: &str) -> B2Result<Option<Value>>;

    /// Store `value` under `key`.
    fn set(&self, key: &str, value: Value) -> B2Result<()>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local store, used when the disk cache is disabled.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemoryStore {
    fn get(&self, key: &str) -> B2Result<Option<Value>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> B2Result<()> {
        self.entries.write().insert(key.to_owned(), value);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Disk
// ---------------------------------------------------------------------------

/// Single-file JSON store.
///
/// Every [`set`](SessionStore::set) replaces the whole file with
/// `{key: value}` under an exclusive lock, so readers sharing the store see
/// either the previous contents or the new ones. On unix the directory
/// is created with mode `0700` and the file with mode `0600`, since it holds
/// a bearer token.
#[derive(Debug)]
pub struct DiskStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl DiskStore {
    /// Open a store in `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> B2Result<Self> {
        let dir = dir.as_ref();
        create_private_dir(dir)?;
        let path = dir.join(CACHE_FILE_NAME);
        debug!(path = %path.display(), "Opened session cache");
        Ok(Self {
            path,
            lock: RwLock::new(()),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for DiskStore {
    fn get(&self, key: &str) -> B2Result<Option<Value>> {
        let _guard = self.lock.read();

        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut entries: Map<String, Value> = serde_json::from_slice(&bytes)?;
        Ok(entries.remove(key).filter(|v| !v.is_null()))
    }

    fn set(&self, key: &str, value: Value) -> B2Result<()> {
        let _guard = self.lock.write();

        let mut entries = Map::new();
        entries.insert(key.to_owned(), value);
        let bytes = serde_json::to_vec_pretty(&Value::Object(entries))?;

        let mut file = private_file_options().open(&self.path)?;
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

fn private_file_options() -> fs::OpenOptions {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
}
