//! LMDB storage layer for `zed_prompts`.
//!
//! This module provides the store gateway over the Zed prompt library:
//! - One LMDB environment holding the `metadata.v2` and `bodies.v2` tables
//! - Read-only views for export, a single atomic write for import
//! - The `prompts_lib::KvStore` capability, so the join never sees LMDB
//!
//! # Submodules
//!
//! - [`lmdb`] - Environment lifecycle and transactions

pub mod lmdb;

pub use lmdb::{AccessMode, DEFAULT_MAP_SIZE, LmdbStore, StoreConfig};
