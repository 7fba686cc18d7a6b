//! Authentication-gated CRUD over credential records.
//!
//! Every operation that touches the store first obtains an `Approved`
//! result from the `AuthGate`.  Anything else aborts the operation with
//! `NotAuthorized` before the store is read or written, so a cancelled
//! prompt leaves both the store and the working list as they were.

use std::collections::BTreeSet;

use crate::auth::{AuthGate, AuthResult};
use crate::errors::{PassVaultError, Result};

use super::codec;
use super::credential::Credential;
use super::store::{SecretStore, WriteBatch};

/// One session's view of the vault.
///
/// Owns the in-memory working list surfaced to the UI.  Construct one per
/// session and `close` it (or drop it) at teardown; the list is wiped.
pub struct VaultController {
    gate: AuthGate,
    store: SecretStore,
    credentials: Vec<Credential>,
    /// Set once `list_all` has filled `credentials` from the store.
    loaded: bool,
}

impl VaultController {
    pub fn new(store: SecretStore, gate: AuthGate) -> Self {
        Self {
            gate,
            store,
            credentials: Vec::new(),
            loaded: false,
        }
    }

    fn authorize(&self, purpose: &str) -> Result<()> {
        match self.gate.authenticate(purpose) {
            AuthResult::Approved => Ok(()),
            other => {
                tracing::debug!(purpose, result = %other, "operation not authorized");
                Err(PassVaultError::NotAuthorized(other))
            }
        }
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Load every credential, replacing the working list.
    pub fn list_all(&mut self) -> Result<&[Credential]> {
        self.authorize("Access your password vault")?;

        let keys = self.store.list_keys()?;
        let mut fresh = Vec::new();
        for key in keys.iter().filter(|k| codec::is_username_key(k)) {
            if let Some(credential) = codec::decode(key, |k| self.store.get(k))? {
                fresh.push(credential);
            }
        }
        fresh.sort_by(|a, b| a.title.cmp(&b.title));

        tracing::debug!(count = fresh.len(), "loaded credentials");
        self.credentials = fresh;
        self.loaded = true;
        Ok(&self.credentials)
    }

    /// Store a new credential.  Fails if any field is empty or the title
    /// is already taken.
    pub fn add(&mut self, title: &str, username: &str, password: &str) -> Result<()> {
        validate_fields(title, username, password)?;
        self.authorize(&format!("Save '{title}'"))?;

        if self.store.contains_key(&codec::user_key(title))? {
            return Err(PassVaultError::Validation(format!(
                "a credential titled '{title}' already exists"
            )));
        }

        let credential = Credential::new(title, username, password);
        self.write(&credential)?;

        tracing::debug!(title, "added credential");
        if self.loaded {
            self.credentials.push(credential);
            self.credentials.sort_by(|a, b| a.title.cmp(&b.title));
        }
        Ok(())
    }

    /// Overwrite an existing credential in full.
    pub fn replace(&mut self, title: &str, username: &str, password: &str) -> Result<()> {
        validate_fields(title, username, password)?;
        self.authorize(&format!("Edit '{title}'"))?;

        if !self.store.contains_key(&codec::user_key(title))? {
            return Err(PassVaultError::NotFound(title.to_string()));
        }

        let credential = Credential::new(title, username, password);
        self.write(&credential)?;

        tracing::debug!(title, "replaced credential");
        if !self.loaded {
            return Ok(());
        }
        if let Some(pos) = self.credentials.iter().position(|c| c.title == title) {
            self.credentials[pos] = credential;
        } else {
            self.credentials.push(credential);
            self.credentials.sort_by(|a, b| a.title.cmp(&b.title));
        }
        Ok(())
    }

    /// Read one credential with its secrets.
    pub fn reveal(&self, title: &str) -> Result<Credential> {
        self.authorize(&format!("View '{title}'"))?;

        codec::decode(&codec::user_key(title), |k| self.store.get(k))?
            .ok_or_else(|| PassVaultError::NotFound(title.to_string()))
    }

    /// Remove both entries for `title`.  Deleting a missing title is fine.
    pub fn delete(&mut self, title: &str) -> Result<()> {
        self.authorize(&format!("Delete '{title}'"))?;

        self.store.apply(
            WriteBatch::new()
                .remove(codec::user_key(title))
                .remove(codec::pass_key(title)),
        )?;

        tracing::debug!(title, "deleted credential");
        self.credentials.retain(|c| c.title != title);
        Ok(())
    }

    /// Remove half-written records (a username entry without a password
    /// entry, or the reverse).  Returns the affected titles, sorted.
    pub fn repair(&mut self) -> Result<Vec<String>> {
        self.authorize("Repair your password vault")?;

        let keys = self.store.list_keys()?;
        let orphans: BTreeSet<String> = keys
            .iter()
            .filter_map(|key| {
                let title = codec::title_of(key)?;
                let complete = keys.contains(&codec::user_key(title))
                    && keys.contains(&codec::pass_key(title));
                (!complete).then(|| title.to_string())
            })
            .collect();

        if orphans.is_empty() {
            return Ok(Vec::new());
        }

        let batch = orphans.iter().fold(WriteBatch::new(), |batch, title| {
            batch
                .remove(codec::user_key(title))
                .remove(codec::pass_key(title))
        });
        self.store.apply(batch)?;

        tracing::debug!(count = orphans.len(), "repaired orphaned entries");
        self.credentials.retain(|c| !orphans.contains(&c.title));
        Ok(orphans.into_iter().collect())
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// The credentials from the last `list_all`, kept in step with later
    /// adds and deletes.  Empty until `list_all` has run once this
    /// session.  Does not authenticate or touch the store.
    pub fn working_list(&self) -> &[Credential] {
        &self.credentials
    }

    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    pub fn store(&self) -> &SecretStore {
        &self.store
    }

    /// End the session, wiping the working list.
    pub fn close(mut self) {
        self.credentials.clear();
    }

    fn write(&self, credential: &Credential) -> Result<()> {
        let batch = codec::encode(credential)
            .into_iter()
            .fold(WriteBatch::new(), |batch, entry| batch.put(entry.key, entry.value));
        self.store.apply(batch)
    }
}

fn validate_fields(title: &str, username: &str, password: &str) -> Result<()> {
    codec::validate_title(title)?;
    if username.is_empty() {
        return Err(PassVaultError::Validation("username cannot be empty".into()));
    }
    if password.is_empty() {
        return Err(PassVaultError::Validation("password cannot be empty".into()));
    }
    Ok(())
}

