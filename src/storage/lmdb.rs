//! LMDB environment lifecycle and transactions.

use std::fs;
use std::path::{Path, PathBuf};

use heed::types::Bytes;
use heed::{Database, Env, EnvFlags, EnvOpenOptions, RoTxn, RwTxn};
use prompts_lib::kv::{Entries, KvStore, ReadTxn, Table, WriteTxn};
use prompts_lib::{PromptError, Result};

/// Map size ceiling used unless configured otherwise (1 GiB).
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

/// The environment holds exactly the metadata and body tables.
const MAX_TABLES: u32 = 2;

type RawTable = Database<Bytes, Bytes>;

/// How a store is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// The path must already hold a store; writes are refused.
    ReadOnly,
    /// The directory is created if missing.
    ReadWrite,
}

/// Where the store lives and how large it may grow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub map_size: usize,
}

impl StoreConfig {
    /// Config for the store at `path` with the default map size.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            map_size: DEFAULT_MAP_SIZE,
        }
    }

    #[must_use]
    pub const fn with_map_size(mut self, map_size: usize) -> Self {
        self.map_size = map_size;
        self
    }
}

/// An open prompt library.
///
/// Owns the LMDB environment exclusively; transactions borrow it only for
/// the duration of [`KvStore::view`] or [`KvStore::update`].
pub struct LmdbStore {
    env: Env,
    path: PathBuf,
}

impl LmdbStore {
    /// Open the store described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the path is missing (read-only), cannot
    /// be created (read-write), or LMDB rejects the environment settings.
    pub fn open(config: &StoreConfig, mode: AccessMode) -> Result<Self> {
        let path = config.path.as_path();
        match mode {
            AccessMode::ReadOnly => {
                if !path.is_dir() {
                    return Err(PromptError::store_unavailable(
                        path,
                        "prompt database does not exist",
                    ));
                }
            }
            AccessMode::ReadWrite => {
                fs::create_dir_all(path).map_err(|e| PromptError::store_unavailable(path, e))?;
            }
        }

        let env = open_env(path, mode, config.map_size)
            .map_err(|e| PromptError::store_unavailable(path, e))?;
        tracing::debug!(
            path = %path.display(),
            ?mode,
            map_size = config.map_size,
            "Opened prompt store"
        );

        Ok(Self {
            env,
            path: path.to_path_buf(),
        })
    }

    /// Directory of the environment.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the environment and wait until LMDB has fully closed it, so
    /// the same path can be reopened right away.
    pub fn close(self) {
        let Self { env, path } = self;
        env.prepare_for_closing().wait();
        tracing::debug!(path = %path.display(), "Closed prompt store");
    }
}

#[allow(unsafe_code)]
fn open_env(path: &Path, mode: AccessMode, map_size: usize) -> heed::Result<Env> {
    let mut options = EnvOpenOptions::new();
    options.map_size(map_size).max_dbs(MAX_TABLES);

    // SAFETY: LMDB requires that the memory map is not modified behind its
    // back. This program only touches the store files through this
    // environment and opens each path at most once at a time.
    unsafe {
        if mode == AccessMode::ReadOnly {
            options.flags(EnvFlags::READ_ONLY);
        }
        options.open(path)
    }
}

impl KvStore for LmdbStore {
    fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn ReadTxn) -> Result<T>,
    {
        let txn = self
            .env
            .read_txn()
            .map_err(|e| PromptError::transaction("begin read", e))?;
        // Dropping the view aborts the read transaction on every path.
        let view = LmdbRead {
            env: &self.env,
            txn,
        };
        f(&view)
    }

    fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn WriteTxn) -> Result<T>,
    {
        let txn = self
            .env
            .write_txn()
            .map_err(|e| PromptError::transaction("begin write", e))?;
        let mut write = LmdbWrite {
            env: &self.env,
            txn,
            tables: [None; 2],
        };

        // On error `write` is dropped here, which aborts the transaction.
        let out = f(&mut write)?;
        write
            .txn
            .commit()
            .map_err(|e| PromptError::transaction("commit", e))?;
        Ok(out)
    }
}

struct LmdbRead<'e> {
    env: &'e Env,
    txn: RoTxn<'e>,
}

struct LmdbWrite<'e> {
    env: &'e Env,
    txn: RwTxn<'e>,
    tables: [Option<RawTable>; 2],
}

const fn slot(table: Table) -> usize {
    match table {
        Table::Metadata => 0,
        Table::Bodies => 1,
    }
}

fn open_table(env: &Env, txn: &RoTxn<'_>, table: Table) -> Result<Option<RawTable>> {
    env.open_database(txn, Some(table.name()))
        .map_err(|e| PromptError::read(table.name(), e))
}

fn iter_table<'t>(env: &Env, txn: &'t RoTxn<'_>, table: Table) -> Result<Entries<'t>> {
    let Some(db) = open_table(env, txn, table)? else {
        return Ok(Box::new(std::iter::empty()));
    };
    let rows = db
        .iter(txn)
        .map_err(|e| PromptError::read(table.name(), e))?;
    Ok(Box::new(
        rows.map(move |row| row.map_err(|e| PromptError::read(table.name(), e))),
    ))
}

fn get_row<'t>(
    env: &Env,
    txn: &'t RoTxn<'_>,
    table: Table,
    key: &[u8],
) -> Result<Option<&'t [u8]>> {
    let Some(db) = open_table(env, txn, table)? else {
        return Ok(None);
    };
    db.get(txn, key)
        .map_err(|e| PromptError::read(table.name(), e))
}

impl ReadTxn for LmdbRead<'_> {
    fn iter(&self, table: Table) -> Result<Entries<'_>> {
        iter_table(self.env, &self.txn, table)
    }

    fn get(&self, table: Table, key: &[u8]) -> Result<Option<&[u8]>> {
        get_row(self.env, &self.txn, table, key)
    }
}

impl ReadTxn for LmdbWrite<'_> {
    fn iter(&self, table: Table) -> Result<Entries<'_>> {
        iter_table(self.env, &self.txn, table)
    }

    fn get(&self, table: Table, key: &[u8]) -> Result<Option<&[u8]>> {
        get_row(self.env, &self.txn, table, key)
    }
}

impl LmdbWrite<'_> {
    fn writable(&mut self, table: Table) -> Result<RawTable> {
        if let Some(db) = self.tables[slot(table)] {
            return Ok(db);
        }
        let db: RawTable = self
            .env
            .create_database(&mut self.txn, Some(table.name()))
            .map_err(|e| PromptError::write(table.name(), e))?;
        self.tables[slot(table)] = Some(db);
        Ok(db)
    }
}

impl WriteTxn for LmdbWrite<'_> {
    fn put(&mut self, table: Table, key: &[u8], value: &[u8]) -> Result<()> {
        let db = self.writable(table)?;
        db.put(&mut self.txn, key, value)
            .map_err(|e| PromptError::write(table.name(), e))
    }
}
