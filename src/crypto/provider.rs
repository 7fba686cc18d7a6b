//! Pluggable key-management backends.
//!
//! A `KeyProvider` seals and opens byte blobs with a device-held key.
//! `SecretStore` only ever talks to this trait, so it never handles raw
//! key material and has no dependency on where the key lives.

use std::path::Path;

use zeroize::Zeroizing;

use super::encryption::{decrypt, encrypt};
use super::keyfile;
use super::keys::{DeviceKey, KEY_LEN};
use crate::errors::Result;

/// Encryption collaborator bound to a device-held master key.
pub trait KeyProvider: Send + Sync {
    /// Short identifier recorded in the store header (e.g. `"keyfile"`).
    fn name(&self) -> &'static str;

    /// Seal `plaintext`; the output is self-contained (nonce included).
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Open a blob produced by `encrypt`.
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;
}

/// Store key derived from a device key; shared by every provider below.
struct SealingKey(Zeroizing<[u8; KEY_LEN]>);

impl SealingKey {
    fn derive(device_key: &DeviceKey, store_name: &str) -> Result<Self> {
        Ok(Self(Zeroizing::new(device_key.derive_store_key(store_name)?)))
    }

    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        encrypt(self.0.as_ref(), plaintext)
    }

    fn open(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        decrypt(self.0.as_ref(), ciphertext)
    }
}

// ---------------------------------------------------------------------------
// Keyfile
// ---------------------------------------------------------------------------

/// Device key kept in a local keyfile (created on first use).
pub struct KeyfileProvider {
    key: SealingKey,
}

impl KeyfileProvider {
    /// Load (or generate) the keyfile at `path` and bind it to `store_name`.
    pub fn open(path: &Path, store_name: &str) -> Result<Self> {
        let device_key = keyfile::load_or_create(path)?;
        Ok(Self {
            key: SealingKey::derive(&device_key, store_name)?,
        })
    }
}

impl KeyProvider for KeyfileProvider {
    fn name(&self) -> &'static str {
        "keyfile"
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.key.seal(plaintext)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.key.open(ciphertext)
    }
}

// ---------------------------------------------------------------------------
// OS keyring
// ---------------------------------------------------------------------------

/// Device key kept in the operating system's credential store.
#[cfg(feature = "keyring-store")]
pub struct KeyringProvider {
    key: SealingKey,
}

#[cfg(feature = "keyring-store")]
impl KeyringProvider {
    /// Fetch (or generate and store) the device key for `store_name`.
    pub fn open(store_name: &str) -> Result<Self> {
        let device_key = crate::keyring::load_or_create_device_key(store_name)?;
        Ok(Self {
            key: SealingKey::derive(&device_key, store_name)?,
        })
    }
}

#[cfg(feature = "keyring-store")]
impl KeyProvider for KeyringProvider {
    fn name(&self) -> &'static str {
        "keyring"
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.key.seal(plaintext)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.key.open(ciphertext)
    }
}

// ---------------------------------------------------------------------------
// Embedder-supplied key
// ---------------------------------------------------------------------------

/// Device key handed in by the embedding application, kept only in memory.
pub struct StaticKeyProvider {
    key: SealingKey,
}

impl StaticKeyProvider {
    pub fn new(device_key: DeviceKey, store_name: &str) -> Result<Self> {
        Ok(Self {
            key: SealingKey::derive(&device_key, store_name)?,
        })
    }

    /// A provider with a fresh random key. Data sealed with it cannot be
    /// reopened by any other provider.
    pub fn ephemeral(store_name: &str) -> Result<Self> {
        Self::new(DeviceKey::generate(), store_name)
    }
}

impl KeyProvider for StaticKeyProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.key.seal(plaintext)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.key.open(ciphertext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn keyfile_provider_reopens_with_same_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("device.key");

        let sealed = KeyfileProvider::open(&path, "secure_store")
            .unwrap()
            .encrypt(b"alice")
            .unwrap();

        let reopened = KeyfileProvider::open(&path, "secure_store").unwrap();
        assert_eq!(reopened.decrypt(&sealed).unwrap(), b"alice");
    }

    #[test]
    fn store_name_binds_the_key() {
        let a = StaticKeyProvider::new(DeviceKey::new([1u8; KEY_LEN]), "a").unwrap();
        let b = StaticKeyProvider::new(DeviceKey::new([1u8; KEY_LEN]), "b").unwrap();

        let sealed = a.encrypt(b"p@ss1").unwrap();
        assert!(b.decrypt(&sealed).is_err());
    }

    #[test]
    fn ephemeral_providers_do_not_share_keys() {
        let a = StaticKeyProvider::ephemeral("s").unwrap();
        let b = StaticKeyProvider::ephemeral("s").unwrap();

        let sealed = a.encrypt(b"secret").unwrap();
        assert!(b.decrypt(&sealed).is_err());
    }
}
