//! Shared types for the session debug panel crates: error type, structured
//! trace events and the TOML configuration model.

pub mod config;
pub mod error;
pub mod trace;
