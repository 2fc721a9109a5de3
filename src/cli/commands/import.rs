//! Import command implementation.

use anyhow::{Context, Result};

use crate::cli::ImportArgs;
use crate::config::{self, CliOverrides};
use crate::sync::{self, SnapshotTarget};

/// Execute the import command.
///
/// # Errors
///
/// Returns an error if the snapshot is invalid or the store write fails;
/// in that case the store is unchanged.
pub fn execute(args: &ImportArgs, overrides: &CliOverrides) -> Result<()> {
    let store = config::load(overrides)?;
    let source = SnapshotTarget::parse(&args.input);

    sync::import(&source, &store).with_context(|| {
        format!(
            "Failed to import prompts from {source} into {}",
            store.path.display()
        )
    })?;
    Ok(())
}
