//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the TOML configuration file from the
//! platform-appropriate directory, falls back to defaults when the file does
//! not exist yet, and can write a config back to disk.

pub mod config;
