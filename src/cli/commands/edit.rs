//! `passvault edit`: replace a credential's username and password.

use crate::cli::{open_controller, output, read_password, read_username, Cli};
use crate::errors::Result;

/// Execute the `edit` command.
pub fn execute(cli: &Cli, title: &str, username: Option<&str>) -> Result<()> {
    let username = read_username(title, username)?;
    let password = read_password(title)?;

    let mut vault = open_controller(cli)?;
    vault.replace(title, &username, &password)?;

    output::success(&format!("Updated '{title}'"));
    vault.close();

    Ok(())
}
