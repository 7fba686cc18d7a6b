//! Mapping between a `Credential` and its two physical store entries.
//!
//! A credential titled `T` is stored as `T-user -> username` and
//! `T-pass -> password`.  The key namespace is the whole schema; there
//! are no other entries.  Everything here is pure.

use zeroize::Zeroizing;

use super::credential::Credential;
use crate::errors::{PassVaultError, Result};

pub const USER_SUFFIX: &str = "-user";
pub const PASS_SUFFIX: &str = "-pass";

/// One physical key-value entry.
pub struct Entry {
    pub key: String,
    pub value: Zeroizing<String>,
}

pub fn user_key(title: &str) -> String {
    format!("{title}{USER_SUFFIX}")
}

pub fn pass_key(title: &str) -> String {
    format!("{title}{PASS_SUFFIX}")
}

/// Split a credential into its username and password entries.
pub fn encode(credential: &Credential) -> [Entry; 2] {
    [
        Entry {
            key: user_key(&credential.title),
            value: Zeroizing::new(credential.username.clone()),
        },
        Entry {
            key: pass_key(&credential.title),
            value: Zeroizing::new(credential.password.clone()),
        },
    ]
}

pub fn is_username_key(key: &str) -> bool {
    key.ends_with(USER_SUFFIX)
}

pub fn is_password_key(key: &str) -> bool {
    key.ends_with(PASS_SUFFIX)
}

/// The title a physical key belongs to, or `None` for a foreign key.
pub fn title_of(key: &str) -> Option<&str> {
    key.strip_suffix(USER_SUFFIX)
        .or_else(|| key.strip_suffix(PASS_SUFFIX))
}

/// Rebuild a credential from its username key.
///
/// `lookup` resolves a physical key to its value.  Returns `Ok(None)` if
/// `user_key` is not a username key or its entry is absent.  A missing
/// password entry decodes as an empty password.
pub fn decode<F>(user_key: &str, mut lookup: F) -> Result<Option<Credential>>
where
    F: FnMut(&str) -> Result<Option<Zeroizing<String>>>,
{
    let Some(title) = user_key.strip_suffix(USER_SUFFIX) else {
        return Ok(None);
    };

    let Some(username) = lookup(user_key)? else {
        return Ok(None);
    };
    let password = lookup(&pass_key(title))?;

    Ok(Some(Credential::new(
        title,
        username.as_str(),
        password.as_ref().map_or("", |p| p.as_str()),
    )))
}

/// Reject titles that cannot round-trip through the key namespace.
pub fn validate_title(title: &str) -> Result<()> {
    if title.is_empty() {
        return Err(PassVaultError::Validation("title cannot be empty".into()));
    }
    if is_username_key(title) || is_password_key(title) {
        return Err(PassVaultError::Validation(format!(
            "title '{title}' cannot end with '{USER_SUFFIX}' or '{PASS_SUFFIX}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl FnMut(&str) -> Result<Option<Zeroizing<String>>> + 'a {
        move |k| Ok(map.get(k).map(|v| Zeroizing::new(v.to_string())))
    }

    #[test]
    fn encode_produces_user_and_pass_entries() {
        let [user, pass] = encode(&Credential::new("Email", "alice", "p@ss1"));
        assert_eq!(user.key, "Email-user");
        assert_eq!(user.value.as_str(), "alice");
        assert_eq!(pass.key, "Email-pass");
        assert_eq!(pass.value.as_str(), "p@ss1");
    }

    #[test]
    fn username_key_detection() {
        assert!(is_username_key("Email-user"));
        assert!(!is_username_key("Email-pass"));
        assert!(!is_username_key("Email-username"));
        assert!(!is_username_key("user"));
    }

    #[test]
    fn title_of_strips_either_suffix() {
        assert_eq!(title_of("Bank-user"), Some("Bank"));
        assert_eq!(title_of("Bank-pass"), Some("Bank"));
        assert_eq!(title_of("Bank"), None);
    }

    #[test]
    fn decode_resolves_both_entries() {
        let map = HashMap::from([("Email-user", "alice"), ("Email-pass", "p@ss1")]);
        let c = decode("Email-user", lookup_in(&map)).unwrap().unwrap();
        assert_eq!(c, Credential::new("Email", "alice", "p@ss1"));
    }

    #[test]
    fn decode_defaults_missing_password_to_empty() {
        let map = HashMap::from([("Email-user", "alice")]);
        let c = decode("Email-user", lookup_in(&map)).unwrap().unwrap();
        assert_eq!(c.username, "alice");
        assert_eq!(c.password, "");
    }

    #[test]
    fn decode_ignores_non_username_keys() {
        let map = HashMap::from([("Email-pass", "p@ss1")]);
        assert!(decode("Email-pass", lookup_in(&map)).unwrap().is_none());
    }

    #[test]
    fn decode_missing_username_entry_is_none() {
        let map = HashMap::new();
        assert!(decode("Email-user", lookup_in(&map)).unwrap().is_none());
    }

    #[test]
    fn decode_propagates_lookup_errors() {
        let result = decode("Email-user", |_| {
            Err(PassVaultError::StorageUnavailable("boom".into()))
        });
        assert!(matches!(result, Err(PassVaultError::StorageUnavailable(_))));
    }

    #[test]
    fn validate_title_rules() {
        assert!(validate_title("Email").is_ok());
        assert!(validate_title("my-username").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title("work-user").is_err());
        assert!(validate_title("work-pass").is_err());
    }
}
