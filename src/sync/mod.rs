//! Snapshot export/import for `zed_prompts`.
//!
//! This module handles:
//! - Export: LMDB -> JSON snapshot (file or stdout)
//! - Import: JSON snapshot (file or stdin) -> LMDB, in one transaction
//!
//! Both pipelines open the store, run exactly one transaction and close it
//! again before returning.

pub mod export;
pub mod import;

use std::fmt;
use std::path::PathBuf;

pub use export::{collect_prompts, export, write_snapshot};
pub use import::{import, import_prompts, read_snapshot};

/// Path argument that selects stdin or stdout instead of a file.
pub const STDIO_SENTINEL: &str = "-";

/// Where a snapshot is read from or written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotTarget {
    /// Standard input for import, standard output for export.
    Stdio,
    File(PathBuf),
}

impl SnapshotTarget {
    /// Interpret a command-line path, honouring the `-` sentinel.
    #[must_use]
    pub fn parse(arg: &str) -> Self {
        if arg == STDIO_SENTINEL {
            Self::Stdio
        } else {
            Self::File(PathBuf::from(arg))
        }
    }
}

impl fmt::Display for SnapshotTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio => f.write_str("<stdio>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}
