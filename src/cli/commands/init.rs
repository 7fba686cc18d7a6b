//! `passvault init`: create the store and enroll a device PIN.

use std::fs;

use zeroize::Zeroizing;

use crate::auth::pin::{PinVerifier, MIN_PIN_LEN};
use crate::cli::prompt::pin_from_env;
use crate::cli::{open_key_provider, output, Cli};
use crate::config::Settings;
use crate::errors::{PassVaultError, Result};
use crate::vault::SecretStore;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let data_dir = &cli.data_dir;
    let settings = Settings::load(data_dir)?;
    let store_path = settings.store_path(data_dir);

    // 1. Refuse to clobber an existing vault.
    if store_path.exists() {
        output::tip("Use `passvault add` to add credentials to the existing vault.");
        return Err(PassVaultError::CommandFailed(format!(
            "a vault already exists at {}",
            store_path.display()
        )));
    }

    // 2. Ask for the PIN before anything is written, so an aborted
    //    prompt leaves no half-initialized directory behind.
    let pin = prompt_new_pin()?;
    let verifier = PinVerifier::from_pin(&pin)?;

    // 3. Create the data directory.
    if !data_dir.exists() {
        fs::create_dir_all(data_dir)?;
        output::info(&format!("Created data directory: {}", data_dir.display()));
    }

    // 4. Obtain the device key.
    let provider = open_key_provider(cli, &settings)?;
    let key_source = provider.name();
    let store = SecretStore::open(&store_path, provider)?;

    // 5. Enroll the PIN, then write the empty store.  The store file
    //    marks the vault as initialized and is written last.
    let pin_path = settings.pin_path(data_dir);
    verifier.save(&pin_path)?;
    if let Err(e) = store.flush() {
        let _ = fs::remove_file(&pin_path);
        return Err(e);
    }

    output::success(&format!(
        "Vault created at {} (device key: {key_source})",
        store_path.display()
    ));
    output::tip("Run `passvault add <TITLE>` to add a credential.");
    output::tip("Run `passvault list` to see your credentials.");

    Ok(())
}

/// Read a new PIN from `PASSVAULT_PIN` or an interactive prompt with
/// confirmation.
fn prompt_new_pin() -> Result<Zeroizing<String>> {
    if let Some(pin) = pin_from_env() {
        return Ok(pin);
    }

    loop {
        let pin = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Choose device PIN")
                .with_confirmation("Confirm device PIN", "PINs do not match, try again")
                .interact()
                .map_err(|e| PassVaultError::CommandFailed(format!("PIN prompt: {e}")))?,
        );

        if pin.chars().count() < MIN_PIN_LEN {
            output::warning(&format!(
                "PIN must be at least {MIN_PIN_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(pin);
    }
}
