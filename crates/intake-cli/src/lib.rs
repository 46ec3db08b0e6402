//! intake-cli library root.
//!
//! Re-exports the config and command modules so integration tests can drive
//! a whole assessment without going through argument parsing.

pub mod commands;
pub mod config;
pub mod render;
