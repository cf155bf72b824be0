//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{RunCommand, StepsCommand, ValidateCommand};
use std::ffi::OsString;

/// Inspect and exercise invocation pipeline configurations
#[derive(Debug, Parser, Clone)]
#[command(name = "invoke-chain")]
#[command(version)]
#[command(about = "Build and exercise invocation pipelines from configuration", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Build every configured pipeline and report the result
    Validate(ValidateCommand),

    /// Send one call through a configured pipeline
    Run(RunCommand),

    /// List the built-in steps
    Steps(StepsCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from([
            "invoke-chain",
            "run",
            "-f",
            "chains.yaml",
            "-t",
            "Consumer",
            "--meta",
            "x-user=alice",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Command::Run(cmd) => {
                assert_eq!(cmd.file, "chains.yaml");
                assert_eq!(cmd.service_type, "Consumer");
                assert_eq!(cmd.pipeline, "");
                assert_eq!(cmd.meta, vec![("x-user".to_string(), "alice".to_string())]);
                assert!(cmd.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_validate_command() {
        let cli = Cli::try_parse_from(["invoke-chain", "-v", "validate", "-f", "chains.yaml", "--json"])
            .unwrap();

        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Validate(ref cmd) if cmd.json));
    }
}
