use thiserror::Error;

use crate::auth::AuthResult;

/// All errors that can occur in PassVault.
#[derive(Debug, Error)]
pub enum PassVaultError {
    // --- Caller-recoverable errors ---
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not authorized: {0}")]
    NotAuthorized(AuthResult),

    #[error("Credential '{0}' not found")]
    NotFound(String),

    // --- Fatal to the current operation ---
    #[error("Secure storage unavailable: {0}")]
    StorageUnavailable(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl PassVaultError {
    /// Shorthand used by the storage and key layers.
    pub(crate) fn storage(msg: impl Into<String>) -> Self {
        PassVaultError::StorageUnavailable(msg.into())
    }
}

/// Convenience type alias for PassVault results.
pub type Result<T> = std::result::Result<T, PassVaultError>;
