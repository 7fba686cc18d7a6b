//! CLI module: Clap argument parser, output helpers, and command implementations.
//!
//! The terminal is PassVault's UI collaborator: it renders titles,
//! masks secrets until `show` succeeds, and supplies the PIN prompt.

pub mod commands;
pub mod output;
pub mod prompt;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::auth::AuthGate;
use crate::config::{KeySource, Settings};
use crate::crypto::{KeyProvider, KeyfileProvider};
use crate::errors::{PassVaultError, Result};
use crate::vault::{SecretStore, VaultController};

use self::prompt::PinAuthenticator;

/// PassVault CLI: authentication-gated password vault.
#[derive(Parser)]
#[command(
    name = "passvault",
    about = "Authentication-gated encrypted password vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory holding the store, device key and PIN
    #[arg(long, env = "PASSVAULT_DIR", default_value = ".passvault", global = true)]
    pub data_dir: PathBuf,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create the vault and enroll a device PIN
    Init,

    /// Add a new credential
    Add {
        /// Credential title (e.g. Email)
        title: String,
        /// Username (omit for interactive prompt)
        #[arg(short, long)]
        username: Option<String>,
    },

    /// List credential titles (secrets stay masked)
    List,

    /// Reveal a credential's username and password
    Show {
        /// Credential title
        title: String,
        /// Copy the password to the clipboard instead of printing it
        #[arg(short, long)]
        copy: bool,
    },

    /// Replace an existing credential's username and password
    Edit {
        /// Credential title
        title: String,
        /// New username (omit for interactive prompt)
        #[arg(short, long)]
        username: Option<String>,
    },

    /// Delete a credential
    Delete {
        /// Credential title
        title: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Remove half-written credentials left by an interrupted write
    Repair,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Open the key provider selected in `settings`.
pub fn open_key_provider(cli: &Cli, settings: &Settings) -> Result<Box<dyn KeyProvider>> {
    match settings.key_source {
        KeySource::Keyfile => Ok(Box::new(KeyfileProvider::open(
            &settings.keyfile_path(&cli.data_dir),
            &settings.store_name,
        )?)),
        #[cfg(feature = "keyring-store")]
        KeySource::Keyring => Ok(Box::new(crate::crypto::KeyringProvider::open(
            &settings.store_name,
        )?)),
        #[cfg(not(feature = "keyring-store"))]
        KeySource::Keyring => Err(PassVaultError::Config(
            "key_source = \"keyring\" needs a build with the `keyring-store` feature".into(),
        )),
    }
}

/// Open the vault for one session: settings, store, and PIN-backed gate.
pub fn open_controller(cli: &Cli) -> Result<VaultController> {
    let settings = Settings::load(&cli.data_dir)?;
    let store_path = settings.store_path(&cli.data_dir);

    if !store_path.exists() {
        return Err(PassVaultError::CommandFailed(format!(
            "no vault at {} — run `passvault init` first",
            store_path.display()
        )));
    }

    let provider = open_key_provider(cli, &settings)?;
    let store = SecretStore::open_existing(&store_path, provider)?;

    let authenticator = PinAuthenticator::new(
        settings.pin_path(&cli.data_dir),
        settings.max_auth_attempts,
    );
    let gate = AuthGate::new(Box::new(authenticator), settings.allowed_methods.clone());

    Ok(VaultController::new(store, gate))
}

/// Read a username from the flag, or prompt for it.
pub fn read_username(title: &str, flag: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(u) = flag {
        return Ok(Zeroizing::new(u.to_string()));
    }
    let username: String = dialoguer::Input::new()
        .with_prompt(format!("Username for {title}"))
        .interact_text()
        .map_err(|e| PassVaultError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(username))
}

/// Read a password from piped stdin, or prompt for it with confirmation.
pub fn read_password(title: &str) -> Result<Zeroizing<String>> {
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = Zeroizing::new(buf.trim_end_matches(['\r', '\n']).to_string());
        return Ok(trimmed);
    }

    let password = dialoguer::Password::new()
        .with_prompt(format!("Password for {title}"))
        .with_confirmation("Confirm password", "Passwords do not match, try again")
        .interact()
        .map_err(|e| PassVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(password))
}
