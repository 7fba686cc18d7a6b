//! Device keyfile on local disk.
//!
//! The keyfile holds the 32-byte device key.  It is created once, on
//! first use, with owner-only permissions and is never rewritten; losing
//! it makes the store unrecoverable.

use std::fs;
use std::io::Write;
use std::path::Path;

use zeroize::Zeroizing;

use super::keys::{DeviceKey, KEY_LEN};
use crate::errors::{PassVaultError, Result};

/// Load the device key from `path`, generating it if the file is missing.
pub fn load_or_create(path: &Path) -> Result<DeviceKey> {
    if path.exists() {
        return load(path);
    }

    tracing::debug!(path = %path.display(), "generating new device keyfile");
    let key = DeviceKey::generate();
    write_keyfile(path, key.as_bytes())?;
    Ok(key)
}

/// Load an existing device key and validate its length.
pub fn load(path: &Path) -> Result<DeviceKey> {
    if !path.exists() {
        return Err(PassVaultError::storage(format!(
            "device keyfile not found at {}",
            path.display()
        )));
    }

    let data = Zeroizing::new(
        fs::read(path)
            .map_err(|e| PassVaultError::storage(format!("failed to read device keyfile: {e}")))?,
    );

    DeviceKey::from_slice(&data)
}

fn write_keyfile(path: &Path, bytes: &[u8; KEY_LEN]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                PassVaultError::storage(format!("cannot create keyfile directory: {e}"))
            })?;
        }
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .map_err(|e| PassVaultError::storage(format!("failed to create device keyfile: {e}")))?;
    file.write_all(bytes)
        .and_then(|()| file.sync_all())
        .map_err(|e| PassVaultError::storage(format!("failed to write device keyfile: {e}")))?;

    Ok(())
}
