//! List command implementation.

use std::io::{self, Write};

use anyhow::{Context, Result};
use prompts_lib::{KvStore, PromptId, join, key};

use crate::config::{self, CliOverrides};
use crate::storage::{AccessMode, LmdbStore};

/// Execute the list command.
///
/// Prints every metadata key exactly as stored, one per line. With `json`,
/// prints the decoded identities instead.
///
/// # Errors
///
/// Returns an error if the store cannot be read, or (with `json`) a stored
/// key is malformed.
pub fn execute(overrides: &CliOverrides, json: bool) -> Result<()> {
    let config = config::load(overrides)?;
    let store = LmdbStore::open(&config, AccessMode::ReadOnly)?;
    let keys = store
        .view(|txn| join::metadata_keys(txn))
        .with_context(|| format!("Failed to list {}", store.path().display()));
    store.close();
    let keys = keys?;

    if json {
        let ids = keys
            .iter()
            .map(|stored| key::decode(stored))
            .collect::<prompts_lib::Result<Vec<PromptId>>>()?;
        println!("{}", serde_json::to_string_pretty(&ids)?);
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for stored in &keys {
        out.write_all(stored)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}
