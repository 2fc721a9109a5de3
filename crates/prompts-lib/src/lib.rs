//! `prompts-lib` - storage-engine independent core of `zed-prompts`.
//!
//! The Zed prompt library keeps two LMDB tables: `metadata.v2` holds one JSON
//! metadata record per prompt and `bodies.v2` holds the raw prompt text. Both
//! are keyed by the canonical JSON encoding of the prompt's [`PromptId`].
//! This crate knows how to derive those keys, how to join the two tables
//! back into whole [`Prompt`]s and how to (de)serialize a snapshot, without
//! depending on LMDB itself. Any ordered key-value engine can plug in through
//! the [`KvStore`] trait.
//!
//! # Quick Start
//!
//! ```
//! use prompts_lib::{join, snapshot, KvStore, MemoryStore, Table, key};
//! use prompts_lib::model::{Metadata, PromptId};
//!
//! let store = MemoryStore::new();
//! let id = PromptId::user("abc");
//! let metadata = Metadata { id: id.clone(), title: "Greeting".into(), ..Default::default() };
//!
//! store.update(|txn| {
//!     let key = key::encode(&id)?;
//!     txn.put(Table::Metadata, &key, &serde_json::to_vec(&metadata)?)?;
//!     txn.put(Table::Bodies, &key, b"Hello")
//! }).unwrap();
//!
//! let prompts = store.view(|txn| join::join_prompts(txn)).unwrap();
//! assert_eq!(prompts[0].content, "Hello");
//! let json = snapshot::encode(&prompts).unwrap();
//! assert!(json.starts_with(b"["));
//! ```

pub mod error;
pub mod join;
pub mod key;
pub mod kv;
pub mod model;
pub mod snapshot;

pub use error::{PromptError, Result};
pub use kv::{Entries, Entry, KvStore, MemoryStore, ReadTxn, Table, WriteTxn};
pub use model::{Kind, Metadata, Prompt, PromptId};
