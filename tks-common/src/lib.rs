//! # TKS Common Library
//!
//! Shared code for the TKS sync tooling:
//! - Error types
//! - Configuration file loading
//! - Database bootstrap

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
