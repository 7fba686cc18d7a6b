//! `passvault add`: store a new credential.

use crate::cli::{open_controller, output, read_password, read_username, Cli};
use crate::errors::Result;

/// Execute the `add` command.
pub fn execute(cli: &Cli, title: &str, username: Option<&str>) -> Result<()> {
    let username = read_username(title, username)?;
    let password = read_password(title)?;

    let mut vault = open_controller(cli)?;
    vault.add(title, &username, &password)?;

    output::success(&format!("Saved '{title}'"));
    vault.close();

    Ok(())
}
