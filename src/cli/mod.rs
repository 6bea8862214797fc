//! CLI module
//!
//! Command-line interface for the Usergrid client.
//!
//! # Commands
//!
//! - `token app` - Authenticate the configured application credentials
//! - `token user` - Authenticate a user (or admin) by username and password
//! - `request` - Send a request below the application URL

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, TokenTarget};
pub use runner::{parse_key_value, Runner};
