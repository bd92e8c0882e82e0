//! Purpose: Define the public Rust API boundary for rowstore.
//! Exports: Data-model types, errors, and the `Service` operation surface.
//! Role: Stable surface for request layers and the CLI; storage details stay in `core`.
//! Invariants: Every mutation runs as load -> mutate -> save under the database's lock.
//! Invariants: Pure reads load under a shared lock and never write.

mod service;

pub use crate::core::database::Database;
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::row::{Filter, Row, RowValues, loosely_equal};
pub use crate::core::store::{LockMode, StorageUsage, Store};
pub use crate::core::table::{ColumnDefinition, Page, PageMeta, Table, TableData};
pub use crate::core::types::ColumnType;
pub use service::{ApiResult, DatabaseInfo, Service, TableInfo, default_store_dir};
