//! Purpose: Orchestrate every externally requested operation as a load-mutate-save cycle.
//! Exports: `Service`, `DatabaseInfo`, `TableInfo`, `default_store_dir`.
//! Role: The only caller of `Store::save`; request layers and the CLI go through here.
//! Invariants: Writers hold the database's exclusive lock for the whole cycle.
//! Invariants: Empty delete/update filters are rejected before storage is touched.
//! Invariants: Reads and row/table writes on a missing database never create its lock file.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::database::Database;
use crate::core::error::{Error, ErrorKind};
use crate::core::row::{Filter, Row, RowValues};
use crate::core::store::{LockMode, Store};
use crate::core::table::{ColumnDefinition, Page, TableData};
use crate::store_paths;

pub type ApiResult<T> = Result<T, Error>;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseInfo {
    pub name: String,
    pub size_bytes: u64,
    pub table_count: usize,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    pub name: String,
    pub size_bytes: u64,
}

/// Storage root used when none is configured: `./databases`.
pub fn default_store_dir() -> PathBuf {
    store_paths::default_store_dir()
}

#[derive(Clone, Debug, Default)]
pub struct Service {
    store: Store,
}

impl Service {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.store = Store::new(root);
        self
    }

    pub fn root(&self) -> &Path {
        self.store.root()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Creates the database directory; an existing database with tables is a conflict.
    pub fn create_database(&self, name: &str) -> ApiResult<()> {
        self.mutate(name, |db| {
            if !db.is_empty() {
                return Err(Error::new(ErrorKind::AlreadyExists)
                    .with_message(format!("database \"{name}\" already exists and is not empty")));
            }
            tracing::info!(database = %name, "created database");
            Ok(())
        })
    }

    pub fn drop_database(&self, name: &str) -> ApiResult<()> {
        if !self.database_exists(name)? {
            return Ok(());
        }
        let _lock = self.store.lock(name, LockMode::Exclusive)?;
        self.store.drop_database(name)
    }

    pub fn list_databases(&self) -> ApiResult<Vec<DatabaseInfo>> {
        self.store
            .list_database_names()?
            .iter()
            .map(|name| self.database_stats(name))
            .collect()
    }

    pub fn database_stats(&self, name: &str) -> ApiResult<DatabaseInfo> {
        let usage = self.store.database_usage(name)?;
        Ok(DatabaseInfo {
            name: name.to_string(),
            size_bytes: usage.size_bytes,
            table_count: usage.table_count,
        })
    }

    pub fn list_tables(&self, database: &str) -> ApiResult<Vec<TableInfo>> {
        self.read(database, |db| {
            db.table_names()
                .map(|table| self.table_info(database, table))
                .collect()
        })
    }

    pub fn table_stats(&self, database: &str, table: &str) -> ApiResult<TableInfo> {
        self.table_info(database, table)
    }

    pub fn create_table(
        &self,
        database: &str,
        table: &str,
        columns: Vec<ColumnDefinition>,
    ) -> ApiResult<()> {
        self.mutate(database, |db| {
            db.create_table(table, columns)?;
            tracing::info!(database = %database, table = %table, "created table");
            Ok(())
        })
    }

    pub fn drop_table(&self, database: &str, table: &str) -> ApiResult<()> {
        self.require_database(database, table)?;
        self.mutate(database, |db| {
            db.drop_table(table)?;
            tracing::info!(database = %database, table = %table, "dropped table");
            Ok(())
        })
    }

    /// Inserts one row and returns it as stored, auto-increment value included.
    pub fn insert_row(&self, database: &str, table: &str, values: RowValues) -> ApiResult<Row> {
        self.require_database(database, table)?;
        self.mutate(database, |db| {
            let row = db.require_table_mut(table)?.insert_row(values)?.clone();
            tracing::debug!(database = %database, table = %table, "inserted row");
            Ok(row)
        })
    }

    /// Deletes the first row matching `filter`; no match is `NotFound`.
    pub fn delete_rows(&self, database: &str, table: &str, filter: &Filter) -> ApiResult<usize> {
        ensure_filter(filter, "delete")?;
        self.require_database(database, table)?;
        self.mutate(database, |db| {
            if !db.require_table_mut(table)?.delete_row(filter) {
                return Err(Error::new(ErrorKind::NotFound)
                    .with_message("no row matches the given criteria"));
            }
            tracing::debug!(database = %database, table = %table, "deleted row");
            Ok(1)
        })
    }

    /// Updates every row matching `filter`; storage is rewritten only when rows changed.
    pub fn update_rows(
        &self,
        database: &str,
        table: &str,
        filter: &Filter,
        values: &RowValues,
    ) -> ApiResult<usize> {
        ensure_filter(filter, "update")?;
        self.require_database(database, table)?;
        let _lock = self.store.lock(database, LockMode::Exclusive)?;
        let mut db = self.store.load(database)?;
        let updated = db.require_table_mut(table)?.update_rows(filter, values)?;
        if updated > 0 {
            self.store.save(&db)?;
        }
        tracing::debug!(database = %database, table = %table, updated, "updated rows");
        Ok(updated)
    }

    /// Projects a table onto `columns` without persisting the result.
    pub fn project_table<S: AsRef<str>>(
        &self,
        database: &str,
        table: &str,
        columns: &[S],
    ) -> ApiResult<TableData> {
        self.read(database, |db| {
            let projected = db.require_table(table)?.projection(columns)?;
            Ok(projected.to_data())
        })
    }

    pub fn rows_page(
        &self,
        database: &str,
        table: &str,
        page: usize,
        page_size: usize,
    ) -> ApiResult<Page> {
        self.read(database, |db| db.require_table(table)?.page(page, page_size))
    }

    fn table_info(&self, database: &str, table: &str) -> ApiResult<TableInfo> {
        Ok(TableInfo {
            name: table.to_string(),
            size_bytes: self.store.table_size(database, table)?,
        })
    }

    fn database_exists(&self, database: &str) -> ApiResult<bool> {
        Ok(self.store.database_dir(database)?.is_dir())
    }

    // Lock files are only created for databases that exist or are being created.
    fn require_database(&self, database: &str, table: &str) -> ApiResult<()> {
        if self.database_exists(database)? {
            return Ok(());
        }
        Database::new(database)?.require_table(table).map(|_| ())
    }

    fn mutate<T>(
        &self,
        database: &str,
        op: impl FnOnce(&mut Database) -> ApiResult<T>,
    ) -> ApiResult<T> {
        let _lock = self.store.lock(database, LockMode::Exclusive)?;
        let mut db = self.store.load(database)?;
        let value = op(&mut db)?;
        self.store.save(&db)?;
        Ok(value)
    }

    fn read<T>(&self, database: &str, op: impl FnOnce(&Database) -> ApiResult<T>) -> ApiResult<T> {
        if !self.database_exists(database)? {
            return op(&Database::new(database)?);
        }
        let _lock = self.store.lock(database, LockMode::Shared)?;
        let db = self.store.load(database)?;
        op(&db)
    }
}

fn ensure_filter(filter: &Filter, action: &str) -> ApiResult<()> {
    if !filter.is_empty() {
        return Ok(());
    }
    Err(Error::new(ErrorKind::EmptyFilter)
        .with_message(format!("no row criteria given; refusing to {action} every row"))
        .with_hint("Pass at least one COLUMN=VALUE filter."))
}
