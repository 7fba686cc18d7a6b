//! Cryptographic primitives for PassVault.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - Device keys and HKDF store-key derivation (`keys`)
//! - The on-disk device keyfile (`keyfile`)
//! - The `KeyProvider` trait and its backends (`provider`)

pub mod encryption;
pub mod keyfile;
pub mod keys;
pub mod provider;

pub use encryption::{decrypt, encrypt};
pub use keys::{derive_store_key, DeviceKey};
#[cfg(feature = "keyring-store")]
pub use provider::KeyringProvider;
pub use provider::{KeyProvider, KeyfileProvider, StaticKeyProvider};
