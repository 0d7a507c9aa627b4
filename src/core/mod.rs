//! Core functionality module
//!
//! Configuration management and the error types shared by every other module.
//!
//! # Submodules
//!
//! - `config` - Configuration loading, saving, and management
//! - `error` - Error types and result aliases

pub mod config;
pub mod error;
