//! Device key handling.
//!
//! The device key is 32 random bytes held by a key source (keyfile, OS
//! keyring, or the embedder).  It is never used directly as a cipher
//! key: HKDF-SHA256 expands it into a store key bound to a context
//! string, so one device key can serve several independent stores.

use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::errors::{PassVaultError, Result};

/// Length of device keys and derived sub-keys (256 bits).
pub const KEY_LEN: usize = 32;

/// Derive the cipher key for one named store from a device key.
///
/// `info` is `"passvault-store:<store_name>"`.
pub fn derive_store_key(device_key: &[u8], store_name: &str) -> Result<[u8; KEY_LEN]> {
    let info = format!("passvault-store:{store_name}");

    // No salt: the device key is already uniformly random.
    let hk = Hkdf::<Sha256>::new(None, device_key);

    let mut okm = [0u8; KEY_LEN];
    hk.expand(info.as_bytes(), &mut okm)
        .map_err(|e| PassVaultError::storage(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}

/// A 32-byte device key that zeroes its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct DeviceKey {
    bytes: [u8; KEY_LEN],
}

impl DeviceKey {
    /// Wrap existing key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Generate a fresh random device key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::rng().fill_bytes(&mut bytes);
        let key = Self::new(bytes);
        bytes.zeroize();
        key
    }

    /// Build a key from a byte slice, rejecting the wrong length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; KEY_LEN] = bytes.try_into().map_err(|_| {
            PassVaultError::storage(format!(
                "device key must be exactly {KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self::new(arr))
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Derive the cipher key for `store_name` from this device key.
    pub fn derive_store_key(&self, store_name: &str) -> Result<[u8; KEY_LEN]> {
        derive_store_key(&self.bytes, store_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_store_key_is_deterministic() {
        let key = DeviceKey::new([7u8; KEY_LEN]);
        assert_eq!(
            key.derive_store_key("secure_store").unwrap(),
            key.derive_store_key("secure_store").unwrap()
        );
    }

    #[test]
    fn different_stores_get_different_keys() {
        let key = DeviceKey::new([7u8; KEY_LEN]);
        assert_ne!(
            key.derive_store_key("a").unwrap(),
            key.derive_store_key("b").unwrap()
        );
    }

    #[test]
    fn generated_keys_differ() {
        assert_ne!(DeviceKey::generate().as_bytes(), DeviceKey::generate().as_bytes());
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        assert!(DeviceKey::from_slice(&[0u8; 16]).is_err());
        assert!(DeviceKey::from_slice(&[0u8; KEY_LEN]).is_ok());
    }
}
