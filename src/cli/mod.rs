//! CLI module for the credential gateway
//!
//! Provides subcommands:
//! - `serve`: HTTP API server (default)
//! - `migrate`: apply or revert the PostgreSQL schema and exit

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Credential Gateway - account credentials and access/refresh tokens
#[derive(Parser)]
#[command(name = "credential-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Apply pending schema migrations
    Migrate(migrate::MigrateArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["credential-gateway"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_migrate_revert() {
        let cli = Cli::try_parse_from(["credential-gateway", "migrate", "--revert-last"]).unwrap();

        match cli.command {
            Some(Command::Migrate(args)) => assert!(args.revert_last),
            _ => panic!("expected migrate command"),
        }
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["credential-gateway", "ui"]).is_err());
    }
}
