//! `zed_prompts` - Zed prompt library import/export
//!
//! This crate provides the `zed-prompts` CLI: it snapshots the Zed editor's
//! LMDB prompt library to JSON and restores such snapshots.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Store location and tuning resolution
//! - [`logging`] - `tracing` subscriber setup
//! - [`storage`] - LMDB store gateway
//! - [`sync`] - Export and import pipelines
//!
//! Keys, the table join and the snapshot format live in `prompts-lib`,
//! which knows nothing about LMDB.

#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod logging;
pub mod storage;
pub mod sync;

pub use prompts_lib::{PromptError, Result};

/// Run the CLI application.
///
/// This is the main entry point called from `main()`.
///
/// # Errors
///
/// Returns an error if command execution fails.
pub fn run() -> anyhow::Result<()> {
    cli::run()
}
