// Named databases own an insertion-ordered set of tables.
// Names double as directory and file names, so both are restricted to [A-Za-z0-9_-].
use indexmap::IndexMap;

use crate::core::error::{Error, ErrorKind};
use crate::core::table::{ColumnDefinition, Table};

#[derive(Clone, Debug, PartialEq)]
pub struct Database {
    name: String,
    tables: IndexMap<String, Table>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        check_identifier("database", &name)?;
        Ok(Self {
            name,
            tables: IndexMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn create_table(
        &mut self,
        name: impl Into<String>,
        columns: Vec<ColumnDefinition>,
    ) -> Result<&mut Table, Error> {
        let name = name.into();
        check_identifier("table", &name)?;
        if self.tables.contains_key(&name) {
            return Err(Error::new(ErrorKind::AlreadyExists).with_message(format!(
                "table \"{name}\" already exists in database \"{}\"",
                self.name
            )));
        }
        let table = Table::new(name.clone(), columns)?;
        Ok(self.tables.entry(name).or_insert(table))
    }

    pub fn drop_table(&mut self, name: &str) -> Result<Table, Error> {
        self.tables
            .shift_remove(name)
            .ok_or_else(|| self.missing_table(name))
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    /// Like `table`, but a missing table is a `NotFound` error.
    pub fn require_table(&self, name: &str) -> Result<&Table, Error> {
        self.tables.get(name).ok_or_else(|| self.missing_table(name))
    }

    pub fn require_table_mut(&mut self, name: &str) -> Result<&mut Table, Error> {
        if !self.tables.contains_key(name) {
            return Err(self.missing_table(name));
        }
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::new(ErrorKind::Internal).with_message("table vanished"))
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Adds a reconstructed table; a name already present keeps the first instance.
    pub(crate) fn attach_table(&mut self, table: Table) {
        if self.tables.contains_key(table.name()) {
            tracing::warn!(
                database = %self.name,
                table = %table.name(),
                "skipping duplicate table during load"
            );
            return;
        }
        self.tables.insert(table.name().to_string(), table);
    }

    fn missing_table(&self, name: &str) -> Error {
        Error::new(ErrorKind::NotFound).with_message(format!(
            "table \"{name}\" not found in database \"{}\"",
            self.name
        ))
    }
}

pub fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-')
}

pub(crate) fn check_identifier(what: &str, name: &str) -> Result<(), Error> {
    if is_identifier(name) {
        return Ok(());
    }
    Err(Error::new(ErrorKind::InvalidIdentifier)
        .with_message(format!("invalid {what} name \"{name}\""))
        .with_hint("Names may contain only letters, digits, '_' and '-'."))
}
