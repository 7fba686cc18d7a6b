//! Terminal PIN prompt: the `Authenticator` used by the CLI.
//!
//! Only the device-credential method exists on a terminal.  The PIN can
//! also come from `PASSVAULT_PIN` for scripted use; a wrong PIN from the
//! environment is a plain denial since nobody is there to retry.

use std::path::PathBuf;

use zeroize::Zeroizing;

use crate::auth::pin::PinVerifier;
use crate::auth::{AuthMethod, AuthResult, Authenticator, Availability};
use crate::cli::output;

/// Environment variable holding a non-interactive PIN.
pub const PIN_ENV: &str = "PASSVAULT_PIN";

/// Read the PIN from `PASSVAULT_PIN`, if set and non-empty.
pub fn pin_from_env() -> Option<Zeroizing<String>> {
    std::env::var(PIN_ENV)
        .ok()
        .filter(|pin| !pin.is_empty())
        .map(Zeroizing::new)
}

pub struct PinAuthenticator {
    pin_path: PathBuf,
    max_attempts: u32,
}

impl PinAuthenticator {
    pub fn new(pin_path: PathBuf, max_attempts: u32) -> Self {
        Self {
            pin_path,
            max_attempts,
        }
    }
}

impl Authenticator for PinAuthenticator {
    fn availability(&self, methods: &[AuthMethod]) -> Availability {
        if !methods.contains(&AuthMethod::DeviceCredential) {
            return Availability::Unavailable(
                "this terminal only supports device PIN authentication".into(),
            );
        }

        match PinVerifier::load(&self.pin_path) {
            Ok(Some(_)) => Availability::Available,
            Ok(None) => Availability::Unavailable(
                "no device PIN enrolled — run `passvault init`".into(),
            ),
            Err(e) => Availability::Unavailable(e.to_string()),
        }
    }

    fn show(&self, purpose: &str, _methods: &[AuthMethod]) -> AuthResult {
        let verifier = match PinVerifier::load(&self.pin_path) {
            Ok(Some(v)) => v,
            Ok(None) => return AuthResult::Error("no device PIN enrolled".into()),
            Err(e) => return AuthResult::Error(e.to_string()),
        };

        if let Some(pin) = pin_from_env() {
            return if verifier.verify(&pin) {
                AuthResult::Approved
            } else {
                AuthResult::Denied
            };
        }

        for attempt in 1..=self.max_attempts {
            let pin = match dialoguer::Password::new()
                .with_prompt(format!("{purpose} — device PIN (empty to cancel)"))
                .allow_empty_password(true)
                .interact()
            {
                Ok(pin) => Zeroizing::new(pin),
                Err(e) => return AuthResult::Error(format!("PIN prompt failed: {e}")),
            };

            if pin.is_empty() {
                return AuthResult::Cancelled;
            }
            if verifier.verify(&pin) {
                return AuthResult::Approved;
            }

            let left = self.max_attempts - attempt;
            if left > 0 {
                output::warning(&format!("Wrong PIN, {left} attempt(s) left."));
            }
        }

        AuthResult::Error("too many failed attempts".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn unavailable_without_enrolled_pin() {
        let dir = TempDir::new().unwrap();
        let auth = PinAuthenticator::new(dir.path().join("pin"), 3);
        assert!(matches!(
            auth.availability(&AuthMethod::DEFAULT),
            Availability::Unavailable(_)
        ));
    }

    #[test]
    fn available_once_enrolled() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pin");
        PinVerifier::from_pin("1234").unwrap().save(&path).unwrap();

        let auth = PinAuthenticator::new(path, 3);
        assert_eq!(auth.availability(&AuthMethod::DEFAULT), Availability::Available);
    }

    #[test]
    fn unavailable_when_pin_method_not_allowed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pin");
        PinVerifier::from_pin("1234").unwrap().save(&path).unwrap();

        let auth = PinAuthenticator::new(path, 3);
        assert!(matches!(
            auth.availability(&[AuthMethod::BiometricStrong]),
            Availability::Unavailable(_)
        ));
    }

    #[test]
    fn show_without_enrolled_pin_is_error() {
        let dir = TempDir::new().unwrap();
        let auth = PinAuthenticator::new(dir.path().join("pin"), 3);
        assert!(matches!(
            auth.show("View 'Email'", &AuthMethod::DEFAULT),
            AuthResult::Error(_)
        ));
    }
}
