// Database persistence: one directory per database, one `<table>.json` per table.
// Saves reconcile the whole directory; loads rebuild a fresh in-memory database.
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use libc::{EACCES, EPERM};

use crate::core::database::{Database, is_identifier};
use crate::core::error::{Error, ErrorKind, io_error_kind};
use crate::core::table::{Table, TableData};
use crate::store_paths::{
    database_dir, default_store_dir, lock_file_path, table_file_path, table_name_from_path,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LockMode {
    Shared,
    Exclusive,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StorageUsage {
    pub size_bytes: u64,
    pub table_count: usize,
}

#[derive(Clone, Debug)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn database_dir(&self, name: &str) -> Result<PathBuf, Error> {
        database_dir(&self.root, name)
    }

    pub fn table_path(&self, database: &str, table: &str) -> Result<PathBuf, Error> {
        table_file_path(&self.database_dir(database)?, table)
    }

    /// Writes every in-memory table and deletes table files with no in-memory table.
    pub fn save(&self, database: &Database) -> Result<(), Error> {
        let dir = self.database_dir(database.name())?;
        fs::create_dir_all(&dir).map_err(|err| {
            Error::new(io_error_kind(&err))
                .with_message("failed to create database directory")
                .with_path(&dir)
                .with_source(err)
        })?;

        for path in table_files(&dir)? {
            let live = table_name_from_path(&path).is_some_and(|name| database.table(name).is_some());
            if live {
                continue;
            }
            fs::remove_file(&path).map_err(|err| {
                Error::new(io_error_kind(&err))
                    .with_message("failed to remove dropped table file")
                    .with_path(&path)
                    .with_source(err)
            })?;
            tracing::debug!(path = %path.display(), "removed dropped table file");
        }

        let mut written = 0usize;
        for table in database.tables() {
            let path = table_file_path(&dir, table.name())?;
            write_table(&path, table)?;
            written += 1;
        }
        tracing::debug!(database = %database.name(), tables = written, "saved database");
        Ok(())
    }

    /// A missing database directory loads as an empty database.
    pub fn load(&self, name: &str) -> Result<Database, Error> {
        let mut database = Database::new(name)?;
        let dir = self.database_dir(name)?;
        let paths = match table_files(&dir) {
            Ok(paths) => paths,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(database = %name, "database directory not found; starting empty");
                return Ok(database);
            }
            Err(err) => return Err(err),
        };
        for path in paths {
            database.attach_table(read_table(&path)?);
        }
        tracing::debug!(
            database = %name,
            tables = database.tables().count(),
            "loaded database"
        );
        Ok(database)
    }

    pub fn drop_database(&self, name: &str) -> Result<(), Error> {
        let dir = self.database_dir(name)?;
        match fs::remove_dir_all(&dir) {
            Ok(()) => {
                tracing::info!(database = %name, "dropped database");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::new(ErrorKind::Storage)
                .with_message(format!("failed to delete database \"{name}\""))
                .with_path(dir)
                .with_source(err)),
        }
    }

    /// Sorted names of the database directories under the root.
    pub fn list_database_names(&self) -> Result<Vec<String>, Error> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(Error::new(io_error_kind(&err))
                    .with_message("failed to read storage root")
                    .with_path(&self.root)
                    .with_source(err));
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| {
                Error::new(ErrorKind::Storage)
                    .with_message("failed to read storage root entry")
                    .with_path(&self.root)
                    .with_source(err)
            })?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_identifier(name) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn table_size(&self, database: &str, table: &str) -> Result<u64, Error> {
        let path = self.table_path(database, table)?;
        fs::metadata(&path).map(|meta| meta.len()).map_err(|err| {
            Error::new(io_error_kind(&err))
                .with_message(format!(
                    "table \"{table}\" or database \"{database}\" not found"
                ))
                .with_path(&path)
                .with_source(err)
        })
    }

    pub fn database_usage(&self, name: &str) -> Result<StorageUsage, Error> {
        let dir = self.database_dir(name)?;
        let paths = table_files(&dir).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                err.with_message(format!("database \"{name}\" not found"))
            } else {
                err
            }
        })?;
        let mut usage = StorageUsage::default();
        for path in paths {
            let meta = fs::metadata(&path).map_err(|err| {
                Error::new(io_error_kind(&err))
                    .with_message("failed to stat table file")
                    .with_path(&path)
                    .with_source(err)
            })?;
            usage.size_bytes += meta.len();
            usage.table_count += 1;
        }
        Ok(usage)
    }

    /// Takes the database's advisory lock; the returned guard releases it on drop.
    pub fn lock(&self, name: &str, mode: LockMode) -> Result<StoreLock, Error> {
        let path = lock_file_path(&self.root, name)?;
        fs::create_dir_all(&self.root).map_err(|err| {
            Error::new(io_error_kind(&err))
                .with_message("failed to create storage root")
                .with_path(&self.root)
                .with_source(err)
        })?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|err| {
                Error::new(io_error_kind(&err))
                    .with_message("failed to open lock file")
                    .with_path(&path)
                    .with_source(err)
            })?;

        let locked = match mode {
            LockMode::Shared => FileExt::lock_shared(&file),
            LockMode::Exclusive => FileExt::lock_exclusive(&file),
        };
        locked.map_err(|err| {
            Error::new(lock_error_kind(&err))
                .with_path(&path)
                .with_source(err)
        })?;
        Ok(StoreLock { file })
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(default_store_dir())
    }
}

pub struct StoreLock {
    file: File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn lock_error_kind(err: &io::Error) -> ErrorKind {
    let errno = err.raw_os_error().unwrap_or_default();
    if errno == EACCES || errno == EPERM {
        return ErrorKind::Permission;
    }
    match err.kind() {
        io::ErrorKind::WouldBlock => ErrorKind::Busy,
        io::ErrorKind::PermissionDenied => ErrorKind::Permission,
        _ => ErrorKind::Storage,
    }
}

// Table files in a database directory, sorted by file name.
fn table_files(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let entries = fs::read_dir(dir).map_err(|err| {
        Error::new(io_error_kind(&err))
            .with_message("failed to read database directory")
            .with_path(dir)
            .with_source(err)
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            Error::new(ErrorKind::Storage)
                .with_message("failed to read database directory entry")
                .with_path(dir)
                .with_source(err)
        })?;
        let path = entry.path();
        if path.is_file() && table_name_from_path(&path).is_some() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn read_table(path: &Path) -> Result<Table, Error> {
    let bytes = fs::read(path).map_err(|err| {
        Error::new(io_error_kind(&err))
            .with_message("failed to read table file")
            .with_path(path)
            .with_source(err)
    })?;
    let data: TableData = serde_json::from_slice(&bytes).map_err(|err| {
        Error::new(ErrorKind::Corrupt)
            .with_message("table file is not a valid table record")
            .with_path(path)
            .with_source(err)
    })?;
    Table::from_data(data).map_err(|err| {
        Error::new(ErrorKind::Corrupt)
            .with_message("table file carries an invalid schema")
            .with_path(path)
            .with_source(err)
    })
}

// Write-then-rename so a crash never leaves a truncated table file behind.
fn write_table(path: &Path, table: &Table) -> Result<(), Error> {
    let encoded = serde_json::to_vec_pretty(&table.to_data()).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode table")
            .with_path(path)
            .with_source(err)
    })?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, encoded).map_err(|err| {
        Error::new(io_error_kind(&err))
            .with_message("failed to write table file")
            .with_path(&staging)
            .with_source(err)
    })?;
    fs::rename(&staging, path).map_err(|err| {
        Error::new(io_error_kind(&err))
            .with_message("failed to replace table file")
            .with_path(path)
            .with_source(err)
    })
}
