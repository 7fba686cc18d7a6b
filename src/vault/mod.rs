//! Vault module: authentication-gated encrypted credential storage.
//!
//! This module provides:
//! - The `Credential` record (`credential`)
//! - Credential <-> physical entry mapping (`codec`)
//! - Binary store file format (`format`)
//! - The encrypted key-value `SecretStore` (`store`)
//! - The gated `VaultController` (`controller`)

pub mod codec;
pub mod controller;
pub mod credential;
pub mod format;
pub mod store;

// Re-export the most commonly used items.
pub use controller::VaultController;
pub use credential::Credential;
pub use format::StoreHeader;
pub use store::{KeySnapshot, SecretStore, WriteBatch};
