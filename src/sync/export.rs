//! Export pipeline: prompt store -> JSON snapshot.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use prompts_lib::{KvStore, Prompt, Result, join, snapshot};

use super::SnapshotTarget;
use crate::storage::{AccessMode, LmdbStore, StoreConfig};

/// Permission bits of exported snapshot files.
#[cfg(unix)]
const SNAPSHOT_FILE_MODE: u32 = 0o644;

/// Join every prompt in one read transaction.
///
/// # Errors
///
/// Returns the join error (`MetadataDecode`, `OrphanedMetadata`, `Read`) or
/// `Transaction` if the view cannot begin.
pub fn collect_prompts<S: KvStore>(store: &S) -> Result<Vec<Prompt>> {
    store.view(|txn| join::join_prompts(txn))
}

/// Export the store at `config` to `target`.
///
/// The store is opened read-only and every prompt is read under a single
/// transaction. Nothing is written to `target` unless the whole snapshot
/// was built.
///
/// # Errors
///
/// Returns `StoreUnavailable` if the store cannot be opened, any join
/// error, or `Io` if the snapshot cannot be written.
pub fn export(config: &StoreConfig, target: &SnapshotTarget) -> Result<usize> {
    let store = LmdbStore::open(config, AccessMode::ReadOnly)?;
    let joined = collect_prompts(&store);
    store.close();
    let prompts = joined?;

    let bytes = snapshot::encode(&prompts)?;
    write_snapshot(&bytes, target)?;

    tracing::info!(
        count = prompts.len(),
        store = %config.path.display(),
        target = %target,
        "Exported prompts"
    );
    Ok(prompts.len())
}

/// Write an encoded snapshot to stdout or to a file.
///
/// Stdout gets a trailing newline. Files are written to a temporary sibling
/// and renamed into place; a symlink is followed and an existing file keeps
/// its permissions.
///
/// # Errors
///
/// Returns `Io` if writing fails.
pub fn write_snapshot(bytes: &[u8], target: &SnapshotTarget) -> Result<()> {
    match target {
        SnapshotTarget::Stdio => {
            let stdout = io::stdout();
            write_to(&mut stdout.lock(), bytes)
        }
        SnapshotTarget::File(path) => write_file_atomic(path, bytes),
    }
}

fn write_to<W: Write>(out: &mut W, bytes: &[u8]) -> Result<()> {
    out.write_all(bytes)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Path the snapshot really lands at: a symlink is followed so the rename
/// replaces its target rather than the link itself.
fn resolve_destination(path: &Path) -> Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(real) => Ok(real),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(e) => Err(e.into()),
    }
}

fn write_file_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dest = resolve_destination(path)?;
    let tmp_path = temp_path(&dest);
    let existing = match fs::metadata(&dest) {
        Ok(meta) => Some(meta.permissions()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(SNAPSHOT_FILE_MODE);
    }

    let mut file = options.open(&tmp_path)?;
    file.write_all(bytes)?;
    file.flush()?;
    drop(file);

    // An overwritten snapshot keeps its permissions.
    if let Some(permissions) = existing {
        fs::set_permissions(&tmp_path, permissions)?;
    }

    // Atomic rename
    if let Err(e) = fs::rename(&tmp_path, &dest) {
        if let Err(cleanup) = fs::remove_file(&tmp_path) {
            tracing::warn!("Failed to remove {}: {}", tmp_path.display(), cleanup);
        }
        return Err(e.into());
    }

    Ok(())
}
