//! `passvault repair`: drop half-written credentials.

use crate::cli::{open_controller, output, Cli};
use crate::errors::Result;

/// Execute the `repair` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut vault = open_controller(cli)?;
    let repaired = vault.repair()?;

    if repaired.is_empty() {
        output::info("No orphaned entries found.");
    } else {
        for title in &repaired {
            output::warning(&format!("Removed incomplete credential '{title}'"));
        }
        output::success(&format!("Repaired {} credential(s)", repaired.len()));
    }

    vault.close();
    Ok(())
}
