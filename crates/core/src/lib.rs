//! Core types and utilities for hookgate
//!
//! This is the foundation crate (Layer 0) that all other hookgate crates depend on.
//! It provides:
//! - Path types (AbsPath, RelPath)
//! - Base error types
//!
//! This crate has no dependencies on other hookgate crates.

pub mod error;
pub mod path;

pub use error::{Error, Result};
pub use path::{AbsPath, RelPath};
