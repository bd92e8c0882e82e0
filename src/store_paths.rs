//! Purpose: Shared storage-root, database-directory and table-file path helpers.
//! Exports: `default_store_dir`, `database_dir`, `table_file_path`, `lock_file_path`.
//! Role: Keep the store and the CLI agreeing on one on-disk layout.
//! Invariants: Default storage root is `./databases` relative to the working directory.
//! Invariants: Every name joined into a path has passed the identifier check.

use std::path::{Path, PathBuf};

use crate::core::database::check_identifier;
use crate::core::error::Error;

pub(crate) const TABLE_EXTENSION: &str = "json";

pub(crate) fn default_store_dir() -> PathBuf {
    PathBuf::from("databases")
}

pub(crate) fn database_dir(root: &Path, name: &str) -> Result<PathBuf, Error> {
    check_identifier("database", name)?;
    Ok(root.join(name))
}

pub(crate) fn table_file_path(database_dir: &Path, table: &str) -> Result<PathBuf, Error> {
    check_identifier("table", table)?;
    Ok(database_dir.join(format!("{table}.{TABLE_EXTENSION}")))
}

/// Lock files sit beside, not inside, database directories so they outlive drops.
pub(crate) fn lock_file_path(root: &Path, name: &str) -> Result<PathBuf, Error> {
    check_identifier("database", name)?;
    Ok(root.join(format!(".{name}.lock")))
}

/// Table name for a `<table>.json` path; anything else is not a table file.
pub(crate) fn table_name_from_path(path: &Path) -> Option<&str> {
    if path.extension().and_then(|ext| ext.to_str()) != Some(TABLE_EXTENSION) {
        return None;
    }
    path.file_stem().and_then(|stem| stem.to_str())
}
