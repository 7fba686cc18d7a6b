//! `passvault list`: display credential titles with secrets masked.

use crate::cli::{open_controller, output, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut vault = open_controller(cli)?;

    let credentials = vault.list_all()?;
    output::info(&format!("{} credential(s)", credentials.len()));
    output::print_credentials_table(credentials);

    vault.close();
    Ok(())
}
