//! Key-value capability used by the conversion engine.
//!
//! The join and the pipelines only ever talk to these traits, so the LMDB
//! gateway can be swapped for any ordered key-value engine. [`MemoryStore`]
//! is the in-process implementation, with the same transactional guarantees
//! the prompt library relies on from LMDB:
//! - Ordered iteration by key bytes
//! - Snapshot isolation for readers
//! - A single writer whose changes land all at once or not at all

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::error::{PromptError, Result};

/// Largest key LMDB accepts with its default build settings.
pub const LMDB_MAX_KEY_SIZE: usize = 511;

/// The two tables of a prompt library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Metadata,
    Bodies,
}

impl Table {
    pub const ALL: [Self; 2] = [Self::Metadata, Self::Bodies];

    /// Name of the table inside the store.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Metadata => "metadata.v2",
            Self::Bodies => "bodies.v2",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A borrowed `(key, value)` pair, valid for the life of its transaction.
pub type Entry<'t> = (&'t [u8], &'t [u8]);

/// Lazy forward cursor over one table. Open a new one to iterate again.
pub type Entries<'t> = Box<dyn Iterator<Item = Result<Entry<'t>>> + 't>;

/// Operations available inside any transaction.
pub trait ReadTxn {
    /// Iterate a table in key order. A table that does not exist yet is empty.
    ///
    /// # Errors
    ///
    /// Returns `Read` if the cursor cannot be opened or advanced.
    fn iter(&self, table: Table) -> Result<Entries<'_>>;

    /// Look up a single key.
    ///
    /// # Errors
    ///
    /// Returns `Read` if the lookup fails for a reason other than absence.
    fn get(&self, table: Table, key: &[u8]) -> Result<Option<&[u8]>>;
}

/// Operations available inside a read-write transaction.
pub trait WriteTxn: ReadTxn {
    /// Insert or overwrite a key, creating the table on first write.
    ///
    /// # Errors
    ///
    /// Returns `Write` if the table cannot be created or the value stored.
    fn put(&mut self, table: Table, key: &[u8], value: &[u8]) -> Result<()>;
}

/// An ordered, transactional key-value store.
pub trait KvStore {
    /// Run `f` inside a read-only transaction. The transaction is released
    /// on every exit path, including early returns and panics in `f`.
    ///
    /// # Errors
    ///
    /// Returns `Transaction` if the transaction cannot begin, or whatever
    /// `f` returns.
    fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn ReadTxn) -> Result<T>;

    /// Run `f` inside a read-write transaction that is committed only if `f`
    /// returns `Ok`. On error nothing `f` wrote becomes visible.
    ///
    /// # Errors
    ///
    /// Returns `Transaction` if the transaction cannot begin or commit, or
    /// whatever `f` returns.
    fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn WriteTxn) -> Result<T>;
}

type Rows = BTreeMap<Vec<u8>, Vec<u8>>;
type Tables = BTreeMap<Table, Rows>;

/// In-memory [`KvStore`].
///
/// Readers work on an `Arc` of the last committed state, so a view that
/// started before a write commits keeps seeing the old data. Writers are
/// serialized and work on a private copy that replaces the committed state
/// only on success.
#[derive(Debug, Default)]
pub struct MemoryStore {
    committed: RwLock<Arc<Tables>>,
    writer: Mutex<()>,
    max_key_size: Option<usize>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject keys longer than `limit` bytes on `put`, like LMDB does.
    #[must_use]
    pub fn with_max_key_size(mut self, limit: usize) -> Self {
        self.max_key_size = Some(limit);
        self
    }

    /// Number of rows currently committed in `table`.
    #[must_use]
    pub fn len(&self, table: Table) -> usize {
        self.snapshot().get(&table).map_or(0, BTreeMap::len)
    }

    /// Whether both tables are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Table::ALL.iter().all(|table| self.len(*table) == 0)
    }

    fn snapshot(&self) -> Arc<Tables> {
        // Writers never leave the committed state half-updated, so a
        // poisoned lock still guards consistent data.
        let committed = self.committed.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&committed)
    }
}

impl KvStore for MemoryStore {
    fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn ReadTxn) -> Result<T>,
    {
        let txn = MemoryRead {
            tables: self.snapshot(),
        };
        f(&txn)
    }

    fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn WriteTxn) -> Result<T>,
    {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut txn = MemoryWrite {
            tables: Tables::clone(&self.snapshot()),
            max_key_size: self.max_key_size,
        };
        let out = f(&mut txn)?;

        let mut committed = self.committed.write().unwrap_or_else(PoisonError::into_inner);
        *committed = Arc::new(txn.tables);
        Ok(out)
    }
}

struct MemoryRead {
    tables: Arc<Tables>,
}

struct MemoryWrite {
    tables: Tables,
    max_key_size: Option<usize>,
}

fn iter_rows(tables: &Tables, table: Table) -> Entries<'_> {
    match tables.get(&table) {
        Some(rows) => Box::new(
            rows.iter()
                .map(|(key, value)| Ok::<_, PromptError>((key.as_slice(), value.as_slice()))),
        ),
        None => Box::new(std::iter::empty()),
    }
}

fn get_row<'t>(tables: &'t Tables, table: Table, key: &[u8]) -> Option<&'t [u8]> {
    tables.get(&table)?.get(key).map(Vec::as_slice)
}

impl ReadTxn for MemoryRead {
    fn iter(&self, table: Table) -> Result<Entries<'_>> {
        Ok(iter_rows(&self.tables, table))
    }

    fn get(&self, table: Table, key: &[u8]) -> Result<Option<&[u8]>> {
        Ok(get_row(&self.tables, table, key))
    }
}

impl ReadTxn for MemoryWrite {
    fn iter(&self, table: Table) -> Result<Entries<'_>> {
        Ok(iter_rows(&self.tables, table))
    }

    fn get(&self, table: Table, key: &[u8]) -> Result<Option<&[u8]>> {
        Ok(get_row(&self.tables, table, key))
    }
}

impl WriteTxn for MemoryWrite {
    fn put(&mut self, table: Table, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(PromptError::write(table.name(), "empty key"));
        }
        if let Some(limit) = self.max_key_size {
            if key.len() > limit {
                return Err(PromptError::write(
                    table.name(),
                    format!("key of {} bytes exceeds limit of {limit}", key.len()),
                ));
            }
        }

        self.tables
            .entry(table)
            .or_default()
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    fn collect(txn: &dyn ReadTxn, table: Table) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        txn.iter(table)?
            .map(|entry| entry.map(|(k, v)| (k.to_vec(), v.to_vec())))
            .collect()
    }

    #[test]
    fn test_iterates_in_key_order() {
        let store = MemoryStore::new();
        store
            .update(|txn| {
                txn.put(Table::Metadata, b"b", b"2")?;
                txn.put(Table::Metadata, b"a", b"1")?;
                txn.put(Table::Metadata, b"c", b"3")
            })
            .unwrap();

        let rows = store.view(|txn| collect(txn, Table::Metadata)).unwrap();
        let keys: Vec<Vec<u8>> = rows.into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn test_missing_table_is_empty() {
        let store = MemoryStore::new();
        let rows = store.view(|txn| collect(txn, Table::Bodies)).unwrap();
        assert!(rows.is_empty());
        let found = store
            .view(|txn| Ok(txn.get(Table::Bodies, b"k")?.is_some()))
            .unwrap();
        assert!(!found);
        assert!(store.is_empty());
    }

    #[test]
    fn test_put_overwrites() {
        let store = MemoryStore::new();
        store.update(|txn| txn.put(Table::Bodies, b"k", b"old")).unwrap();
        store.update(|txn| txn.put(Table::Bodies, b"k", b"new")).unwrap();

        let value = store
            .view(|txn| Ok(txn.get(Table::Bodies, b"k")?.map(<[u8]>::to_vec)))
            .unwrap();
        assert_eq!(value.as_deref(), Some(&b"new"[..]));
        assert_eq!(store.len(Table::Bodies), 1);
    }

    #[test]
    fn test_failed_update_rolls_back() {
        let store = MemoryStore::new();
        store.update(|txn| txn.put(Table::Metadata, b"keep", b"1")).unwrap();

        let result: Result<()> = store.update(|txn| {
            txn.put(Table::Metadata, b"discard", b"2")?;
            txn.put(Table::Bodies, b"discard", b"2")?;
            Err(PromptError::write("bodies.v2", "boom"))
        });
        assert!(result.is_err());

        assert_eq!(store.len(Table::Metadata), 1);
        assert_eq!(store.len(Table::Bodies), 0);
    }

    #[test]
    fn test_writes_visible_inside_update() {
        let store = MemoryStore::new();
        let seen = store
            .update(|txn| {
                txn.put(Table::Metadata, b"k", b"v")?;
                Ok(txn.get(Table::Metadata, b"k")?.map(<[u8]>::to_vec))
            })
            .unwrap();
        assert_eq!(seen.as_deref(), Some(&b"v"[..]));
    }

    #[test]
    fn test_view_sees_snapshot_from_its_start() {
        let store = MemoryStore::new();
        store.update(|txn| txn.put(Table::Metadata, b"a", b"1")).unwrap();

        let rows = store
            .view(|txn| {
                store.update(|w| w.put(Table::Metadata, b"b", b"2"))?;
                collect(txn, Table::Metadata)
            })
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(store.len(Table::Metadata), 2);
    }

    #[test]
    fn test_key_size_limit() {
        let store = MemoryStore::new().with_max_key_size(4);
        let err = store
            .update(|txn| txn.put(Table::Metadata, b"12345", b"v"))
            .unwrap_err();
        assert!(matches!(err, PromptError::Write { table: "metadata.v2", .. }));

        let err = store.update(|txn| txn.put(Table::Bodies, b"", b"v")).unwrap_err();
        assert!(matches!(err, PromptError::Write { table: "bodies.v2", .. }));
    }

    #[test]
    fn test_panicking_update_leaves_store_usable() {
        let store = MemoryStore::new();
        let result = catch_unwind(AssertUnwindSafe(|| {
            let _ = store.update(|txn| -> Result<()> {
                txn.put(Table::Metadata, b"k", b"v")?;
                panic!("writer crashed");
            });
        }));
        assert!(result.is_err());
        assert!(store.is_empty());

        store.update(|txn| txn.put(Table::Metadata, b"k", b"v")).unwrap();
        assert_eq!(store.len(Table::Metadata), 1);
    }
}
