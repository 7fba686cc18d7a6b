use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::auth::AuthMethod;
use crate::errors::{PassVaultError, Result};

/// Where the device key lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    /// A 32-byte keyfile next to the store.
    Keyfile,
    /// The OS keyring (needs the `keyring-store` feature).
    Keyring,
}

/// Data-directory configuration, loaded from `passvault.toml`.
///
/// Every field has a sensible default so PassVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Name of the store container (file `<store_name>.vault`).
    #[serde(default = "default_store_name")]
    pub store_name: String,

    /// Where the device key is kept.
    #[serde(default = "default_key_source")]
    pub key_source: KeySource,

    /// Wrong PIN entries allowed before a prompt gives up.
    #[serde(default = "default_max_auth_attempts")]
    pub max_auth_attempts: u32,

    /// Authentication methods the gate may use.
    #[serde(default = "default_allowed_methods")]
    pub allowed_methods: Vec<AuthMethod>,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_store_name() -> String {
    "secure_store".to_string()
}

fn default_key_source() -> KeySource {
    KeySource::Keyfile
}

fn default_max_auth_attempts() -> u32 {
    3
}

fn default_allowed_methods() -> Vec<AuthMethod> {
    AuthMethod::DEFAULT.to_vec()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_name: default_store_name(),
            key_source: default_key_source(),
            max_auth_attempts: default_max_auth_attempts(),
            allowed_methods: default_allowed_methods(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the data directory.
    const FILE_NAME: &'static str = "passvault.toml";

    /// Load settings from `<data_dir>/passvault.toml`.
    ///
    /// If the file does not exist, defaults are returned.  If it exists
    /// but cannot be parsed or holds invalid values, an error is returned.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            PassVaultError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.store_name.is_empty()
            || !self
                .store_name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(PassVaultError::Config(format!(
                "store_name '{}' is invalid — only ASCII letters, digits, underscores, and hyphens are allowed",
                self.store_name
            )));
        }
        if self.max_auth_attempts < 1 {
            return Err(PassVaultError::Config(
                "max_auth_attempts must be at least 1".into(),
            ));
        }
        if self.allowed_methods.is_empty() {
            return Err(PassVaultError::Config(
                "allowed_methods cannot be empty".into(),
            ));
        }
        Ok(())
    }

    /// Path of the store container, e.g. `data_dir/secure_store.vault`.
    pub fn store_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(format!("{}.vault", self.store_name))
    }

    /// Path of the device keyfile.
    pub fn keyfile_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join("device.key")
    }

    /// Path of the enrolled PIN verifier.
    pub fn pin_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join("pin")
    }
}

// ── Tests ────────────────────────────────────────────────────────────
