//! tks-sync library interface
//!
//! Reconciles the local troubleshooting article corpus with the entry
//! database and the GitHub Discussions mirror. Exposed as a library for
//! integration testing; the binary in `main.rs` is a thin wiring layer.

pub mod config;
pub mod content;
pub mod entry;
pub mod error;
pub mod loader;
pub mod store;
pub mod sync;

pub use crate::error::{SyncError, SyncResult};
