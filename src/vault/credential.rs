//! The logical credential record.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// A named credential: title, username and password.
///
/// The title is the record's only identity.  Field memory is wiped on
/// drop, and `Debug` never prints the username or password.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    pub title: String,
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(
        title: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("title", &self.title)
            .field("username", &"<redacted>")
            .field("password", &"<redacted>")
            .finish()
    }
}
