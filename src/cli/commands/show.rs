//! `passvault show`: reveal one credential after authenticating.

use crate::cli::{open_controller, output, Cli};
use crate::errors::{PassVaultError, Result};

/// Execute the `show` command.
pub fn execute(cli: &Cli, title: &str, copy: bool) -> Result<()> {
    let vault = open_controller(cli)?;
    let credential = vault.reveal(title)?;

    println!("{}", credential.title);
    println!("Username: {}", credential.username);

    if copy {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| PassVaultError::CommandFailed(format!("clipboard unavailable: {e}")))?;
        clipboard
            .set_text(credential.password.as_str())
            .map_err(|e| PassVaultError::CommandFailed(format!("clipboard write failed: {e}")))?;
        output::success("Password copied to clipboard.");
    } else {
        println!("Password: {}", credential.password);
    }

    vault.close();
    Ok(())
}
