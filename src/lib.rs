//! Purpose: Shared core library crate used by the `rowstore` CLI and tests.
//! Exports: `core` (data model, validation, storage, errors) and `api` (operation surface).
//! Role: Library backing the binary; `api` is the boundary external adapters call into.
//! Invariants: Every externally requested operation is one load-mutate-save cycle.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
mod store_paths;
