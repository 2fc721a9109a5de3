//! Import pipeline: JSON snapshot -> prompt store.

use std::fs;
use std::io::{self, Read};

use prompts_lib::{KvStore, Prompt, PromptError, Result, Table, key, snapshot};

use super::SnapshotTarget;
use crate::storage::{AccessMode, LmdbStore, StoreConfig};

/// Read a whole snapshot from stdin or a file.
///
/// # Errors
///
/// Returns `FileNotFound` if the file does not exist, or `Io` if reading
/// fails.
pub fn read_snapshot(source: &SnapshotTarget) -> Result<Vec<u8>> {
    match source {
        SnapshotTarget::Stdio => {
            let mut bytes = Vec::new();
            io::stdin().lock().read_to_end(&mut bytes)?;
            Ok(bytes)
        }
        SnapshotTarget::File(path) => fs::read(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                PromptError::FileNotFound(path.clone())
            } else {
                PromptError::Io(e)
            }
        }),
    }
}

/// Write `prompts` into `store` in a single transaction.
///
/// Each prompt's identity is encoded once and used as the key in both
/// tables: the metadata record as JSON, the body as the raw content. A
/// prompt that already exists is overwritten. If any write fails, none of
/// them is kept.
///
/// # Errors
///
/// Returns `Write` or `Transaction` on store failure, or `Json` if a
/// metadata record cannot be serialized.
pub fn import_prompts<S: KvStore>(store: &S, prompts: &[Prompt]) -> Result<usize> {
    store.update(|txn| {
        for prompt in prompts {
            let stored_key = key::encode(prompt.id())?;
            let metadata = serde_json::to_vec(&prompt.metadata)?;
            txn.put(Table::Metadata, &stored_key, &metadata)?;
            txn.put(Table::Bodies, &stored_key, prompt.content.as_bytes())?;
            tracing::trace!(id = %prompt.id(), "Staged prompt");
        }
        Ok(prompts.len())
    })
}

/// Import the snapshot at `source` into the store at `config`.
///
/// The snapshot is read and decoded in full before the store is touched;
/// a snapshot that does not parse never opens a transaction. The store
/// directory is created if missing.
///
/// # Errors
///
/// Returns `FileNotFound`/`Io` for unreadable input, `SnapshotParse` for
/// invalid JSON, `StoreUnavailable` if the store cannot be opened, or the
/// write error that aborted the transaction.
pub fn import(source: &SnapshotTarget, config: &StoreConfig) -> Result<usize> {
    let bytes = read_snapshot(source)?;
    let prompts = snapshot::decode(&bytes)?;
    tracing::debug!(count = prompts.len(), source = %source, "Decoded snapshot");

    let store = LmdbStore::open(config, AccessMode::ReadWrite)?;
    let written = import_prompts(&store, &prompts);
    store.close();
    let count = written?;

    tracing::info!(
        count,
        store = %config.path.display(),
        source = %source,
        "Imported prompts"
    );
    Ok(count)
}
