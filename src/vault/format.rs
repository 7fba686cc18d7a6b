//! Binary container format for the secret store.
//!
//! A `.vault` file has this layout:
//!
//! ```text
//! [PVLT: 4 bytes][version: 1 byte][header_len: 4 bytes LE][header JSON][sealed payload]
//! ```
//!
//! - **Magic** (`PVLT`): identifies the file as a PassVault store.
//! - **Version**: format version (currently `1`).
//! - **Header length**: little-endian u32 telling us where the header
//!   JSON ends and the sealed payload begins.
//! - **Header JSON**: serialized `StoreHeader` (plain, no secrets).
//! - **Sealed payload**: the entry map as JSON, sealed by the store's
//!   `KeyProvider`.  Keys and values are both inside the seal.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{PassVaultError, Result};

/// Magic bytes at the start of every store file.
const MAGIC: &[u8; 4] = b"PVLT";

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 1;

/// Fixed-size prefix: 4 (magic) + 1 (version) + 4 (header_len).
const PREFIX_LEN: usize = 9;

/// Metadata stored in the clear at the beginning of a store file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreHeader {
    /// Format version.
    pub version: u8,

    /// When this store was first created.
    pub created_at: DateTime<Utc>,

    /// When the store was last flushed.
    pub updated_at: DateTime<Utc>,

    /// Name of the key provider that sealed the payload.
    pub key_source: String,
}

impl StoreHeader {
    pub fn new(key_source: &str) -> Self {
        let now = Utc::now();
        Self {
            version: CURRENT_VERSION,
            created_at: now,
            updated_at: now,
            key_source: key_source.to_string(),
        }
    }
}

/// Write a store file to disk **atomically**.
///
/// The bytes go to a temp file in the same directory, are fsynced, and
/// the temp file is renamed over `path`.  Readers see either the old
/// file or the new one, never a mix.
pub fn write_store(path: &Path, header: &StoreHeader, sealed: &[u8]) -> Result<()> {
    let header_bytes = serde_json::to_vec(header)
        .map_err(|e| PassVaultError::storage(format!("header: {e}")))?;

    let header_len = u32::try_from(header_bytes.len()).map_err(|_| {
        PassVaultError::storage(format!(
            "header length {} exceeds u32::MAX",
            header_bytes.len()
        ))
    })?;

    let mut buf = Vec::with_capacity(PREFIX_LEN + header_bytes.len() + sealed.len());
    buf.extend_from_slice(MAGIC);
    buf.push(CURRENT_VERSION);
    buf.extend_from_slice(&header_len.to_le_bytes());
    buf.extend_from_slice(&header_bytes);
    buf.extend_from_slice(sealed);

    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    let io_err = |e: std::io::Error| PassVaultError::storage(format!("write {}: {e}", path.display()));

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&tmp_path).map_err(io_err)?;
    let written = file
        .write_all(&buf)
        .and_then(|()| file.sync_all())
        .and_then(|()| {
            drop(file);
            fs::rename(&tmp_path, path)
        });

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_err(e));
    }

    Ok(())
}

/// A store file split into its header and still-sealed payload.
pub struct RawStore {
    pub header: StoreHeader,
    pub sealed: Vec<u8>,
}

/// Read a store file and validate its envelope.
///
/// The payload is returned sealed; opening it is the caller's job.
pub fn read_store(path: &Path) -> Result<RawStore> {
    let data = fs::read(path)
        .map_err(|e| PassVaultError::storage(format!("read {}: {e}", path.display())))?;

    if data.len() < PREFIX_LEN {
        return Err(corrupt("file too small to be a valid store"));
    }

    if &data[0..4] != MAGIC {
        return Err(corrupt("missing PVLT magic bytes"));
    }

    let version = data[4];
    if version != CURRENT_VERSION {
        return Err(corrupt(&format!(
            "unsupported version {version}, expected {CURRENT_VERSION}"
        )));
    }

    let header_len_u32 = u32::from_le_bytes(
        data[5..9]
            .try_into()
            .map_err(|_| corrupt("bad header length"))?,
    );
    let header_len = usize::try_from(header_len_u32)
        .map_err(|_| corrupt("header length exceeds platform address space"))?;

    let header_end = PREFIX_LEN
        .checked_add(header_len)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| corrupt("header length exceeds file size"))?;

    let header: StoreHeader = serde_json::from_slice(&data[PREFIX_LEN..header_end])
        .map_err(|e| corrupt(&format!("header JSON: {e}")))?;

    Ok(RawStore {
        header,
        sealed: data[header_end..].to_vec(),
    })
}

fn corrupt(detail: &str) -> PassVaultError {
    PassVaultError::storage(format!("store file is corrupt: {detail}"))
}
