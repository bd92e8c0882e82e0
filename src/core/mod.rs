// Core modules implementing the data model, value validation, persistence and errors.
pub mod database;
pub mod error;
pub mod row;
pub mod store;
pub mod table;
pub mod types;
