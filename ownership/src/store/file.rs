use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fd_lock::RwLock;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::ExpiringStore;
use crate::error::StoreError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    entries: BTreeMap<String, Entry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl Snapshot {
    fn prune(&mut self, now: DateTime<Utc>) {
        self.entries.retain(|_, entry| now < entry.expires_at);
    }

    fn insert(&mut self, key: &str, value: &str, ttl: Duration) {
        self.entries.insert(
            key.to_owned(),
            Entry {
                value: value.to_owned(),
                expires_at: expiry(Utc::now(), ttl),
            },
        );
    }
}

/// JSON file on disk, for challenges that must outlive the process.
///
/// Every read-modify-write holds an exclusive advisory lock on a sibling
/// `<path>.lock` file, so stores opened on the same path serialize with each
/// other across threads and processes. The data file is replaced through a
/// uniquely named temporary file and a rename; readers never see a partial
/// write and take no lock.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FileStore {
    /// Uses `path`, which need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_path = path.clone().into_os_string();
        lock_path.push(".lock");
        Self {
            path,
            lock_path: lock_path.into(),
        }
    }

    /// Runs `op` on the current snapshot under the lock, saving it when `op`
    /// reports a change.
    async fn update<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Snapshot) -> (T, bool) + Send + 'static,
    {
        let path = self.path.clone();
        let lock_path = self.lock_path.clone();
        tokio::task::spawn_blocking(move || {
            let lock_file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&lock_path)?;
            let mut lock = RwLock::new(lock_file);
            let _guard = lock.write()?;

            let mut snapshot = load(&path)?;
            let (out, changed) = op(&mut snapshot);
            if changed {
                save(&path, &snapshot)?;
            }
            Ok(out)
        })
        .await
        .map_err(|e| StoreError::Io(io::Error::other(e)))?
    }
}

fn load(path: &Path) -> Result<Snapshot, StoreError> {
    let mut snapshot = match fs::read(path) {
        Ok(bytes) if bytes.is_empty() => Snapshot::default(),
        Ok(bytes) => serde_json::from_slice(&bytes)?,
        Err(e) if e.kind() == ErrorKind::NotFound => Snapshot::default(),
        Err(e) => return Err(e.into()),
    };
    snapshot.prune(Utc::now());
    Ok(snapshot)
}

fn save(path: &Path, snapshot: &Snapshot) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(snapshot)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[async_trait]
impl ExpiringStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path.clone();
        let snapshot = tokio::task::spawn_blocking(move || load(&path))
            .await
            .map_err(|e| StoreError::Io(io::Error::other(e)))??;
        Ok(snapshot.entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let (key, value) = (key.to_owned(), value.to_owned());
        self.update(move |snapshot| {
            snapshot.insert(&key, &value, ttl);
            ((), true)
        })
        .await
    }

    async fn insert_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<Option<String>, StoreError> {
        let (key, value) = (key.to_owned(), value.to_owned());
        self.update(move |snapshot| match snapshot.entries.get(&key) {
            Some(existing) => (Some(existing.value.clone()), false),
            None => {
                snapshot.insert(&key, &value, ttl);
                (None, true)
            }
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let key = key.to_owned();
        self.update(move |snapshot| {
            let removed = snapshot.entries.remove(&key).is_some();
            (removed, removed)
        })
        .await
    }
}
