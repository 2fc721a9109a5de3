//! Export command implementation.

use anyhow::{Context, Result};

use crate::cli::ExportArgs;
use crate::config::{self, CliOverrides};
use crate::sync::{self, SnapshotTarget};

/// Execute the export command.
///
/// # Errors
///
/// Returns an error if the store cannot be read or the snapshot written.
pub fn execute(args: &ExportArgs, overrides: &CliOverrides) -> Result<()> {
    let store = config::load(overrides)?;
    let target = SnapshotTarget::parse(&args.output);

    sync::export(&store, &target).with_context(|| {
        format!(
            "Failed to export prompts from {} to {target}",
            store.path.display()
        )
    })?;
    Ok(())
}
