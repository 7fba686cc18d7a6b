//! Integration tests for the encrypted `SecretStore`.

use std::fs;
use std::path::PathBuf;

use passvault::crypto::keys::KEY_LEN;
use passvault::crypto::{DeviceKey, KeyProvider, KeyfileProvider, StaticKeyProvider};
use passvault::errors::PassVaultError;
use passvault::vault::{SecretStore, WriteBatch};
use tempfile::TempDir;
use zeroize::Zeroizing;

/// Helper: a store path inside a fresh temp dir.
fn store_path() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("secure_store.vault");
    (dir, path)
}

fn provider() -> Box<dyn KeyProvider> {
    Box::new(StaticKeyProvider::new(DeviceKey::new([3u8; KEY_LEN]), "secure_store").unwrap())
}

fn z(s: &str) -> Zeroizing<String> {
    Zeroizing::new(s.to_string())
}

#[test]
fn entries_persist_across_reopen() {
    let (_dir, path) = store_path();

    let store = SecretStore::open(&path, provider()).unwrap();
    store.put("Email-user", z("alice")).unwrap();
    store.put("Email-pass", z("p@ss1")).unwrap();
    drop(store);

    let store = SecretStore::open_existing(&path, provider()).unwrap();
    assert_eq!(store.len().unwrap(), 2);
    assert_eq!(store.get("Email-user").unwrap().unwrap().as_str(), "alice");
    assert_eq!(store.get("Email-pass").unwrap().unwrap().as_str(), "p@ss1");
}

#[test]
fn get_absent_key_is_none() {
    let (_dir, path) = store_path();
    let store = SecretStore::open(&path, provider()).unwrap();
    assert!(store.get("nobody-user").unwrap().is_none());
}

#[test]
fn put_overwrites() {
    let (_dir, path) = store_path();
    let store = SecretStore::open(&path, provider()).unwrap();
    store.put("k", z("one")).unwrap();
    store.put("k", z("two")).unwrap();
    assert_eq!(store.get("k").unwrap().unwrap().as_str(), "two");
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn remove_is_idempotent() {
    let (_dir, path) = store_path();
    let store = SecretStore::open(&path, provider()).unwrap();
    store.put("k", z("v")).unwrap();

    store.remove("k").unwrap();
    store.remove("k").unwrap();
    assert!(store.get("k").unwrap().is_none());
}

#[test]
fn batch_commits_all_entries_together() {
    let (_dir, path) = store_path();
    let store = SecretStore::open(&path, provider()).unwrap();

    store
        .apply(
            WriteBatch::new()
                .put("Bank-user", z("bob"))
                .put("Bank-pass", z("hunter2"))
                .remove("absent"),
        )
        .unwrap();

    let reopened = SecretStore::open_existing(&path, provider()).unwrap();
    let keys: Vec<String> = reopened.list_keys().unwrap().into_iter().collect();
    assert_eq!(keys, vec!["Bank-pass".to_string(), "Bank-user".to_string()]);
}

#[test]
fn list_keys_snapshot_is_restartable() {
    let (_dir, path) = store_path();
    let store = SecretStore::open(&path, provider()).unwrap();
    store.put("a-user", z("1")).unwrap();
    store.put("b-user", z("2")).unwrap();

    let snapshot = store.list_keys().unwrap();
    let first: Vec<&String> = snapshot.iter().collect();
    let second: Vec<&String> = (&snapshot).into_iter().collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn file_does_not_contain_plaintext() {
    let (_dir, path) = store_path();
    let store = SecretStore::open(&path, provider()).unwrap();
    store.put("Email-user", z("alice@example.com")).unwrap();

    let raw = fs::read(&path).unwrap();
    let text = String::from_utf8_lossy(&raw);
    assert!(!text.contains("alice@example.com"));
    assert!(!text.contains("Email-user"));
}

#[test]
fn header_records_key_source() {
    let (_dir, path) = store_path();
    let store = SecretStore::open(&path, provider()).unwrap();
    store.flush().unwrap();

    let header = store.header().unwrap();
    assert_eq!(header.key_source, "static");
    assert!(header.updated_at >= header.created_at);
}

#[test]
fn open_existing_missing_is_storage_unavailable() {
    let (_dir, path) = store_path();
    assert!(matches!(
        SecretStore::open_existing(&path, provider()),
        Err(PassVaultError::StorageUnavailable(_))
    ));
}

#[test]
fn mismatched_key_source_is_rejected() {
    let (dir, path) = store_path();
    SecretStore::open(&path, provider()).unwrap().flush().unwrap();

    let keyfile: Box<dyn KeyProvider> =
        Box::new(KeyfileProvider::open(&dir.path().join("device.key"), "secure_store").unwrap());
    assert!(matches!(
        SecretStore::open(&path, keyfile),
        Err(PassVaultError::StorageUnavailable(_))
    ));
}

#[test]
fn corrupt_payload_is_storage_unavailable() {
    let (_dir, path) = store_path();
    let store = SecretStore::open(&path, provider()).unwrap();
    store.put("k", z("v")).unwrap();
    drop(store);

    let mut data = fs::read(&path).unwrap();
    let last = data.len() - 1;
    data[last] ^= 0xFF;
    fs::write(&path, data).unwrap();

    assert!(matches!(
        SecretStore::open(&path, provider()),
        Err(PassVaultError::StorageUnavailable(_))
    ));
}

#[test]
fn garbage_file_is_storage_unavailable() {
    let (_dir, path) = store_path();
    fs::write(&path, b"definitely not a vault").unwrap();
    assert!(matches!(
        SecretStore::open(&path, provider()),
        Err(PassVaultError::StorageUnavailable(_))
    ));
}
