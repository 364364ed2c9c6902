//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::model::EntityKind;

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to bind (overrides `server.bind`)
    #[arg(short, long)]
    pub bind: Option<IpAddr>,

    /// Port to listen on (overrides `server.port`)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Dashboard command arguments.
#[derive(Debug, Args)]
pub struct DashboardCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Collection to list
    #[arg(value_enum)]
    pub entity: EntityArg,

    /// Case-insensitive text search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only records with this status
    #[arg(long)]
    pub status: Option<String>,

    /// Page number (1-based); lists everything when absent
    #[arg(long)]
    pub page: Option<usize>,

    /// Records per page
    #[arg(long)]
    pub per_page: Option<usize>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Configuration file to check instead of the active configuration
        file: Option<PathBuf>,
    },
}

/// Collection argument for `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityArg {
    /// Customer organizations
    Organizations,
    /// Tracked devices
    Devices,
    /// SIM cards
    Sims,
    /// Dashboard users
    Users,
    /// Generated reports
    Reports,
}

impl From<EntityArg> for EntityKind {
    fn from(arg: EntityArg) -> Self {
        match arg {
            EntityArg::Organizations => Self::Organization,
            EntityArg::Devices => Self::Device,
            EntityArg::Sims => Self::Sim,
            EntityArg::Users => Self::User,
            EntityArg::Reports => Self::Report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_arg_conversion() {
        assert_eq!(EntityKind::from(EntityArg::Organizations), EntityKind::Organization);
        assert_eq!(EntityKind::from(EntityArg::Devices), EntityKind::Device);
        assert_eq!(EntityKind::from(EntityArg::Sims), EntityKind::Sim);
        assert_eq!(EntityKind::from(EntityArg::Users), EntityKind::User);
        assert_eq!(EntityKind::from(EntityArg::Reports), EntityKind::Report);
    }

    #[test]
    fn test_entity_arg_names_match_collections() {
        for arg in EntityArg::value_variants() {
            let name = arg.to_possible_value().unwrap();
            assert_eq!(name.get_name(), EntityKind::from(*arg).collection());
        }
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
