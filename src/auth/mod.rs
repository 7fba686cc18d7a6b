//! Authentication gate.
//!
//! `AuthGate` wraps a platform `Authenticator` (biometric or PIN prompt)
//! and turns each request into exactly one terminal `AuthResult`.  Nothing
//! is cached between calls: every sensitive operation asks again.

pub mod pin;

use std::fmt;

use serde::{Deserialize, Serialize};

/// A way the user can prove presence or identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    BiometricStrong,
    BiometricWeak,
    /// Device PIN, pattern or password.
    DeviceCredential,
}

impl AuthMethod {
    /// Methods allowed when nothing else is configured.
    pub const DEFAULT: [AuthMethod; 2] = [AuthMethod::BiometricWeak, AuthMethod::DeviceCredential];
}

/// Whether the device can authenticate with any allowed method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable(String),
}

/// Terminal outcome of one authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    Approved,
    Denied,
    Cancelled,
    Error(String),
}

impl AuthResult {
    pub fn is_approved(&self) -> bool {
        matches!(self, AuthResult::Approved)
    }
}

impl fmt::Display for AuthResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthResult::Approved => write!(f, "authentication approved"),
            AuthResult::Denied => write!(f, "authentication denied"),
            AuthResult::Cancelled => write!(f, "authentication cancelled"),
            AuthResult::Error(reason) => write!(f, "authentication error: {reason}"),
        }
    }
}

/// Where a single `authenticate` call is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Idle,
    Checking,
    Prompting,
    Done(AuthResult),
}

impl AuthState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AuthState::Done(_))
    }
}

/// The platform prompt collaborator.
///
/// `show` blocks until the user approves, cancels, or the platform gives
/// up (too many attempts, lockout).  Implementations must not cache.
pub trait Authenticator {
    fn availability(&self, methods: &[AuthMethod]) -> Availability;

    fn show(&self, purpose: &str, methods: &[AuthMethod]) -> AuthResult;
}

/// Request-scoped authentication check in front of every secret access.
pub struct AuthGate {
    authenticator: Box<dyn Authenticator>,
    allowed: Vec<AuthMethod>,
}

impl AuthGate {
    pub fn new(authenticator: Box<dyn Authenticator>, allowed: Vec<AuthMethod>) -> Self {
        Self {
            authenticator,
            allowed,
        }
    }

    /// A gate allowing weak biometrics with device-credential fallback.
    pub fn with_default_methods(authenticator: Box<dyn Authenticator>) -> Self {
        Self::new(authenticator, AuthMethod::DEFAULT.to_vec())
    }

    pub fn allowed_methods(&self) -> &[AuthMethod] {
        &self.allowed
    }

    /// Ask whether any allowed method is usable.  No side effects.
    pub fn check_available(&self) -> Availability {
        if self.allowed.is_empty() {
            return Availability::Unavailable("no authentication methods are allowed".into());
        }
        self.authenticator.availability(&self.allowed)
    }

    /// Run one authentication attempt labelled with `purpose`.
    pub fn authenticate(&self, purpose: &str) -> AuthResult {
        let mut state = AuthState::Idle;

        advance(&mut state, AuthState::Checking, purpose);
        if let Availability::Unavailable(reason) = self.check_available() {
            advance(&mut state, AuthState::Done(AuthResult::Error(reason.clone())), purpose);
            return AuthResult::Error(reason);
        }

        advance(&mut state, AuthState::Prompting, purpose);
        let result = self.authenticator.show(purpose, &self.allowed);
        advance(&mut state, AuthState::Done(result.clone()), purpose);

        result
    }
}

fn advance(state: &mut AuthState, next: AuthState, purpose: &str) {
    debug_assert!(!state.is_terminal(), "auth attempt already finished");
    tracing::debug!(purpose, from = ?state, to = ?next, "auth state");
    *state = next;
}
