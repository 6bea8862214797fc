//! CLI commands and argument parsing

use crate::types::Method;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Usergrid command-line client
#[derive(Parser, Debug)]
#[command(name = "usergrid")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Exchange credentials for an access token
    Token {
        #[command(subcommand)]
        target: TokenTarget,
    },

    /// Send a request to the application
    Request {
        /// HTTP method (GET, POST, PUT, DELETE)
        method: Method,

        /// Path segments below the application URL
        #[arg(required = true)]
        path: Vec<String>,

        /// Query parameter (key=value, repeatable)
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// Extra header (key=value, repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Inline JSON body
        #[arg(short, long)]
        data: Option<String>,

        /// Query language filter, e.g. "name = 'fido'"
        #[arg(long)]
        ql: Option<String>,

        /// Maximum entities to return
        #[arg(long)]
        limit: Option<u32>,

        /// Authenticate the application first and send with its token
        #[arg(long)]
        app_auth: bool,
    },
}

/// Credential kind to authenticate
#[derive(Subcommand, Debug)]
pub enum TokenTarget {
    /// Application client credentials from the config
    App,

    /// Username and password
    User {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,

        /// Authenticate against the management endpoint
        #[arg(long)]
        admin: bool,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Indented JSON
    Pretty,
}
