//! Command-line interface for fleetdash.
//!
//! This module provides the CLI structure for the `fleetdash` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, DashboardCommand, EntityArg, ListCommand, ServeCommand};

/// fleetdash - Device and SIM fleet administration
///
/// Serves the fleet REST API and inspects the fleet database from the
/// command line.
#[derive(Debug, Parser)]
#[command(name = "fleetdash")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve(ServeCommand),

    /// Print the dashboard summary
    Dashboard(DashboardCommand),

    /// List the records of one collection
    List(ListCommand),

    /// Load the demo data into an empty database
    Seed,

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Seed,
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "fleetdash");
    }

    #[test]
    fn test_verbosity_levels() {
        use crate::logging::Verbosity;

        assert_eq!(cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        // Verify the CLI structure is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["fleetdash", "serve", "--port", "8080"]).unwrap();
        let Command::Serve(serve) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(serve.port, Some(8080));
        assert!(serve.bind.is_none());
    }

    #[test]
    fn test_parse_serve_bad_bind() {
        assert!(Cli::try_parse_from(["fleetdash", "serve", "--bind", "not-an-ip"]).is_err());
    }

    #[test]
    fn test_parse_dashboard_json() {
        let cli = Cli::try_parse_from(["fleetdash", "dashboard", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::Dashboard(DashboardCommand { json: true })));
    }

    #[test]
    fn test_parse_list() {
        let args = [
            "fleetdash", "list", "devices", "--search", "dev", "--page", "2", "--per-page", "5",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::List(list) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(list.entity, EntityArg::Devices);
        assert_eq!(list.search.as_deref(), Some("dev"));
        assert_eq!(list.page, Some(2));
        assert_eq!(list.per_page, Some(5));
        assert!(!list.json);
    }

    #[test]
    fn test_parse_list_unknown_entity() {
        assert!(Cli::try_parse_from(["fleetdash", "list", "gadgets"]).is_err());
    }

    #[test]
    fn test_parse_seed() {
        let cli = Cli::try_parse_from(["fleetdash", "seed"]).unwrap();
        assert!(matches!(cli.command, Command::Seed));
    }

    #[test]
    fn test_parse_config_validate_file() {
        let cli = Cli::try_parse_from(["fleetdash", "config", "validate", "/tmp/fd.toml"]).unwrap();
        let Command::Config(ConfigCommand::Validate { file }) = cli.command else {
            panic!("expected config validate");
        };
        assert_eq!(file, Some(PathBuf::from("/tmp/fd.toml")));
    }

    #[test]
    fn test_parse_with_config() {
        let args = ["fleetdash", "-c", "/custom/config.toml", "dashboard"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["fleetdash", "seed", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(["fleetdash", "config", "path", "-q"]).unwrap();
        assert!(cli.quiet);
    }
}
