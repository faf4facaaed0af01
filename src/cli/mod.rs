//! Command-line interface for operating the closet without HTTP handlers.

mod commands;

use clap::{Parser, Subcommand};

use crate::entities::users::Role;

/// Eva's Closet - wardrobe catalog and audit log
#[derive(Parser)]
#[command(name = "closet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    #[command(alias = "web")]
    Serve {
        /// Override `server.host`
        #[arg(long)]
        host: Option<String>,
        /// Override `server.port`
        #[arg(long)]
        port: Option<u16>,
    },

    /// Create a default config file and apply migrations
    #[command(alias = "--init")]
    Init,

    /// Manage the database schema
    Migrate {
        #[command(subcommand)]
        command: MigrateCommands,
    },

    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// List the items in a user's closet
    Closet {
        /// Owner's username
        username: String,
    },

    /// Inspect and maintain the audit log
    Logs {
        #[command(subcommand)]
        command: LogsCommands,
    },
}

#[derive(Subcommand)]
pub enum MigrateCommands {
    /// Apply all pending migrations
    Up,
    /// Roll back applied migrations
    Down {
        /// Number of migrations to roll back (all when omitted)
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Show which migrations are applied
    Status,
    /// Drop every table and re-apply all migrations
    Fresh,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create an account
    Add {
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: Option<String>,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
        #[arg(long, default_value_t = Role::Basic)]
        role: Role,
    },
    /// List all accounts
    #[command(alias = "ls")]
    List,
    /// Replace a user's password
    Passwd {
        username: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Change a user's role
    Role { username: String, role: Role },
}

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show one page of the audit log, newest first
    #[command(alias = "ls")]
    List {
        /// Admin account the request is made as
        #[arg(long = "as")]
        admin: String,
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long, default_value_t = 20)]
        page_size: u64,
        /// Only this action type, e.g. "Add Item"
        #[arg(long)]
        action_type: Option<String>,
        /// Only actions by this username
        #[arg(long)]
        user: Option<String>,
    },
    /// Write the audit log as CSV
    Export {
        #[arg(long = "as")]
        admin: String,
        /// Output file (stdout when omitted)
        #[arg(long, short)]
        output: Option<std::path::PathBuf>,
    },
    /// Delete audit rows older than the given age
    Prune {
        #[arg(long = "as")]
        admin: String,
        #[arg(long)]
        older_than_days: i64,
    },
}

pub use commands::*;
