//! OS keyring integration for the device key.
//!
//! Stores the device key (base64) in the operating system's secure
//! credential store:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring / KDE Wallet)
//!
//! Every failure is a storage error: without the key the store cannot
//! be opened.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use zeroize::Zeroizing;

use crate::crypto::DeviceKey;
use crate::errors::{PassVaultError, Result};

/// Service name used in the OS keyring.
const SERVICE_NAME: &str = "passvault";

fn entry_key(store_name: &str) -> String {
    format!("device-key:{store_name}")
}

fn entry(store_name: &str) -> Result<keyring::Entry> {
    keyring::Entry::new(SERVICE_NAME, &entry_key(store_name))
        .map_err(|e| PassVaultError::storage(format!("failed to create keyring entry: {e}")))
}

/// Fetch the device key for `store_name`, generating and saving one if
/// the keyring has none yet.
pub fn load_or_create_device_key(store_name: &str) -> Result<DeviceKey> {
    let entry = entry(store_name)?;

    match entry.get_password() {
        Ok(encoded) => {
            let encoded = Zeroizing::new(encoded);
            let bytes = Zeroizing::new(BASE64.decode(encoded.as_bytes()).map_err(|e| {
                PassVaultError::storage(format!("keyring entry is not valid base64: {e}"))
            })?);
            DeviceKey::from_slice(&bytes)
        }
        Err(keyring::Error::NoEntry) => {
            tracing::debug!(store = store_name, "generating new device key in OS keyring");
            let key = DeviceKey::generate();
            let encoded = Zeroizing::new(BASE64.encode(key.as_bytes()));
            entry.set_password(&encoded).map_err(|e| {
                PassVaultError::storage(format!("failed to store device key in keyring: {e}"))
            })?;
            Ok(key)
        }
        Err(e) => Err(PassVaultError::storage(format!(
            "failed to read from keyring: {e}"
        ))),
    }
}

