//! Demo web application hosting the session debug panel.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod layers;
pub mod state;
