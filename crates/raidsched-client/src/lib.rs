//! CLI: configuration, collaborator wiring, run/plan/export commands
//!
//! This crate provides the `raidsched` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
