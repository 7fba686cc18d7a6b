//! Device PIN enrollment and verification.
//!
//! The PIN is never stored.  Only an Argon2id PHC string
//! (`$argon2id$v=19$...`) is kept, in a small owner-only file.

use std::fs;
use std::path::Path;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::errors::{PassVaultError, Result};

/// Minimum PIN length to prevent trivially guessable PINs.
pub const MIN_PIN_LEN: usize = 4;

/// A verifier for the enrolled device PIN.
#[derive(Debug, Clone)]
pub struct PinVerifier {
    phc: String,
}

impl PinVerifier {
    /// Hash `pin` into a new verifier.
    pub fn from_pin(pin: &str) -> Result<Self> {
        if pin.chars().count() < MIN_PIN_LEN {
            return Err(PassVaultError::Validation(format!(
                "PIN must be at least {MIN_PIN_LEN} characters"
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        let phc = Argon2::default()
            .hash_password(pin.as_bytes(), &salt)
            .map_err(|e| PassVaultError::CommandFailed(format!("PIN hashing failed: {e}")))?
            .to_string();

        Ok(Self { phc })
    }

    /// Load the verifier at `path`.  `Ok(None)` means no PIN is enrolled.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let phc = fs::read_to_string(path)?.trim().to_string();
        PasswordHash::new(&phc).map_err(|e| {
            PassVaultError::Config(format!("PIN verifier at {} is corrupt: {e}", path.display()))
        })?;

        Ok(Some(Self { phc }))
    }

    /// Write the verifier to `path` with owner-only permissions.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.phc)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Check a candidate PIN in constant time.
    pub fn verify(&self, pin: &str) -> bool {
        match PasswordHash::new(&self.phc) {
            Ok(parsed) => Argon2::default()
                .verify_password(pin.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn verify_accepts_only_the_enrolled_pin() {
        let v = PinVerifier::from_pin("1234").unwrap();
        assert!(v.verify("1234"));
        assert!(!v.verify("4321"));
        assert!(!v.verify(""));
    }

    #[test]
    fn rejects_short_pin() {
        assert!(matches!(
            PinVerifier::from_pin("12"),
            Err(PassVaultError::Validation(_))
        ));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pin");

        PinVerifier::from_pin("2468").unwrap().save(&path).unwrap();
        let loaded = PinVerifier::load(&path).unwrap().unwrap();
        assert!(loaded.verify("2468"));
    }

    #[test]
    fn load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(PinVerifier::load(&dir.path().join("pin")).unwrap().is_none());
    }

    #[test]
    fn load_corrupt_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pin");
        fs::write(&path, "not a phc string").unwrap();
        assert!(PinVerifier::load(&path).is_err());
    }

    #[test]
    fn stored_file_does_not_contain_pin() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pin");
        PinVerifier::from_pin("987654").unwrap().save(&path).unwrap();
        assert!(!fs::read_to_string(&path).unwrap().contains("987654"));
    }
}
