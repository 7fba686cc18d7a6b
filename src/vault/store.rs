//! Durable encrypted key-value store.
//!
//! `SecretStore` keeps every physical entry in memory and flushes the
//! whole map to disk on each change.  A flush is one atomic file
//! replacement, so a `WriteBatch` of several entries either fully
//! commits or leaves the file untouched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use zeroize::Zeroizing;

use crate::crypto::KeyProvider;
use crate::errors::{PassVaultError, Result};

use super::format::{self, StoreHeader};

type Entries = BTreeMap<String, Zeroizing<String>>;

/// One mutation inside a `WriteBatch`.
pub enum WriteOp {
    Put {
        key: String,
        value: Zeroizing<String>,
    },
    Remove {
        key: String,
    },
}

/// A group of writes committed by a single flush.
#[derive(Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(mut self, key: impl Into<String>, value: Zeroizing<String>) -> Self {
        self.ops.push(WriteOp::Put {
            key: key.into(),
            value,
        });
        self
    }

    pub fn remove(mut self, key: impl Into<String>) -> Self {
        self.ops.push(WriteOp::Remove { key: key.into() });
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// The keys present in a store at the moment `list_keys` was called.
///
/// Later writes to the store do not affect a snapshot, and it can be
/// iterated any number of times.
#[derive(Debug, Clone, Default)]
pub struct KeySnapshot {
    keys: Vec<String>,
}

impl KeySnapshot {
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.keys.iter()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.binary_search_by(|k| k.as_str().cmp(key)).is_ok()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl IntoIterator for KeySnapshot {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}

impl<'a> IntoIterator for &'a KeySnapshot {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

struct Inner {
    header: StoreHeader,
    entries: Entries,
}

/// The encrypted key-value store.  Open one with `SecretStore::open`.
pub struct SecretStore {
    /// Path to the `.vault` file on disk.
    path: PathBuf,

    /// Seals and opens the payload; the store never sees the key.
    provider: Box<dyn KeyProvider>,

    /// Single-writer guard around the in-memory state.
    inner: Mutex<Inner>,
}

impl SecretStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open the store at `path`, or start an empty one if the file does
    /// not exist yet.  An empty store is written on its first flush.
    pub fn open(path: &Path, provider: Box<dyn KeyProvider>) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "starting empty store");
            let header = StoreHeader::new(provider.name());
            return Ok(Self::from_parts(path, provider, header, Entries::new()));
        }
        Self::open_existing(path, provider)
    }

    /// Open a store that must already exist on disk.
    pub fn open_existing(path: &Path, provider: Box<dyn KeyProvider>) -> Result<Self> {
        if !path.exists() {
            return Err(PassVaultError::storage(format!(
                "no store found at {}",
                path.display()
            )));
        }

        let raw = format::read_store(path)?;

        if raw.header.key_source != provider.name() {
            return Err(PassVaultError::storage(format!(
                "store was sealed with the '{}' key source but '{}' is configured",
                raw.header.key_source,
                provider.name()
            )));
        }

        let entries = open_payload(provider.as_ref(), &raw.sealed)?;
        tracing::debug!(path = %path.display(), entries = entries.len(), "opened store");

        Ok(Self::from_parts(path, provider, raw.header, entries))
    }

    fn from_parts(
        path: &Path,
        provider: Box<dyn KeyProvider>,
        header: StoreHeader,
        entries: Entries,
    ) -> Self {
        Self {
            path: path.to_path_buf(),
            provider,
            inner: Mutex::new(Inner { header, entries }),
        }
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    /// Insert or overwrite one entry and flush.
    pub fn put(&self, key: &str, value: Zeroizing<String>) -> Result<()> {
        self.apply(WriteBatch::new().put(key, value))
    }

    /// Return the value for `key`, or `None` if absent.
    pub fn get(&self, key: &str) -> Result<Option<Zeroizing<String>>> {
        Ok(self.lock()?.entries.get(key).cloned())
    }

    /// Remove one entry.  Removing an absent key is a no-op.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.apply(WriteBatch::new().remove(key))
    }

    pub fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.lock()?.entries.contains_key(key))
    }

    /// Snapshot the stored keys (sorted).
    pub fn list_keys(&self) -> Result<KeySnapshot> {
        let inner = self.lock()?;
        Ok(KeySnapshot {
            keys: inner.entries.keys().cloned().collect(),
        })
    }

    /// Apply every op in `batch` and commit them with one flush.
    ///
    /// If the flush fails, the in-memory state is rolled back so the
    /// batch has no visible effect.
    pub fn apply(&self, batch: WriteBatch) -> Result<()> {
        let mut inner = self.lock()?;

        let header_before = inner.header.clone();
        let mut undo: Vec<(String, Option<Zeroizing<String>>)> = Vec::with_capacity(batch.len());

        for op in batch.ops {
            match op {
                WriteOp::Put { key, value } => {
                    let previous = inner.entries.insert(key.clone(), value);
                    undo.push((key, previous));
                }
                WriteOp::Remove { key } => {
                    if let Some(previous) = inner.entries.remove(&key) {
                        undo.push((key, Some(previous)));
                    }
                }
            }
        }

        if undo.is_empty() {
            return Ok(());
        }

        if let Err(e) = self.flush_locked(&mut inner) {
            for (key, previous) in undo.into_iter().rev() {
                match previous {
                    Some(value) => inner.entries.insert(key, value),
                    None => inner.entries.remove(&key),
                };
            }
            inner.header = header_before;
            return Err(e);
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Seal the current entries and write them to disk atomically.
    pub fn flush(&self) -> Result<()> {
        let mut inner = self.lock()?;
        self.flush_locked(&mut inner)
    }

    fn flush_locked(&self, inner: &mut Inner) -> Result<()> {
        inner.header.updated_at = Utc::now();
        let sealed = seal_payload(self.provider.as_ref(), &inner.entries)?;
        format::write_store(&self.path, &inner.header, &sealed)?;
        tracing::debug!(path = %self.path.display(), entries = inner.entries.len(), "flushed store");
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| PassVaultError::storage("store lock poisoned by a panicked writer"))
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the path to the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of physical entries.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.entries.is_empty())
    }

    /// Returns a copy of the store header.
    pub fn header(&self) -> Result<StoreHeader> {
        Ok(self.lock()?.header.clone())
    }
}

fn seal_payload(provider: &dyn KeyProvider, entries: &Entries) -> Result<Vec<u8>> {
    let plain = Zeroizing::new(
        serde_json::to_vec(entries).map_err(|e| PassVaultError::storage(format!("payload: {e}")))?,
    );
    provider.encrypt(&plain)
}

/// Values deserialize straight into `Zeroizing` wrappers; no plain
/// `String` copy of a secret outlives the parse.
fn open_payload(provider: &dyn KeyProvider, sealed: &[u8]) -> Result<Entries> {
    let plain = Zeroizing::new(provider.decrypt(sealed)?);
    serde_json::from_slice(&plain)
        .map_err(|e| PassVaultError::storage(format!("store payload is corrupt: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{DeviceKey, StaticKeyProvider};
    use tempfile::TempDir;

    fn provider(seed: u8) -> Box<dyn KeyProvider> {
        Box::new(StaticKeyProvider::new(DeviceKey::new([seed; 32]), "test").unwrap())
    }

    fn z(s: &str) -> Zeroizing<String> {
        Zeroizing::new(s.to_string())
    }

    #[test]
    fn open_missing_file_starts_empty_without_writing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("s.vault");

        let store = SecretStore::open(&path, provider(1)).unwrap();
        assert!(store.is_empty().unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn put_get_remove() {
        let dir = TempDir::new().unwrap();
        let store = SecretStore::open(&dir.path().join("s.vault"), provider(1)).unwrap();

        store.put("a-user", z("alice")).unwrap();
        assert_eq!(store.get("a-user").unwrap().unwrap().as_str(), "alice");

        store.remove("a-user").unwrap();
        assert!(store.get("a-user").unwrap().is_none());
    }

    #[test]
    fn remove_absent_key_is_noop_and_does_not_flush() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("s.vault");
        let store = SecretStore::open(&path, provider(1)).unwrap();

        store.remove("ghost").unwrap();
        store.remove("ghost").unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn snapshot_is_unaffected_by_later_writes() {
        let dir = TempDir::new().unwrap();
        let store = SecretStore::open(&dir.path().join("s.vault"), provider(1)).unwrap();
        store.put("a", z("1")).unwrap();

        let snapshot = store.list_keys().unwrap();
        store.put("b", z("2")).unwrap();

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains("a"));
        assert!(!snapshot.contains("b"));
        // Restartable.
        assert_eq!(snapshot.iter().count(), snapshot.iter().count());
    }

    #[test]
    fn failed_flush_rolls_back_batch() {
        let dir = TempDir::new().unwrap();
        // Parent directory does not exist, so every flush fails.
        let path = dir.path().join("missing").join("s.vault");
        let store = SecretStore::open(&path, provider(1)).unwrap();

        let result = store.apply(WriteBatch::new().put("x-user", z("u")).put("x-pass", z("p")));

        assert!(matches!(result, Err(PassVaultError::StorageUnavailable(_))));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn sealed_payload_reopens_into_zeroizing_entries() {
        let provider = provider(4);
        let mut entries = Entries::new();
        entries.insert("Email-user".to_string(), z("alice"));
        entries.insert("Email-pass".to_string(), z("p@ss1"));

        let sealed = seal_payload(provider.as_ref(), &entries).unwrap();
        let opened: Entries = open_payload(provider.as_ref(), &sealed).unwrap();

        assert_eq!(opened.len(), 2);
        assert_eq!(opened["Email-user"].as_str(), "alice");
        assert_eq!(opened["Email-pass"].as_str(), "p@ss1");
    }

    #[test]
    fn wrong_key_is_storage_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("s.vault");
        SecretStore::open(&path, provider(1))
            .unwrap()
            .put("k", z("v"))
            .unwrap();

        let result = SecretStore::open(&path, provider(2));
        assert!(matches!(result, Err(PassVaultError::StorageUnavailable(_))));
    }
}
