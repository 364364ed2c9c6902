//! `fleetdash` - CLI for the fleet administration service
//!
//! This binary runs the REST API server and offers read-only views of the
//! fleet database from the terminal.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use fleetdash::analytics::dashboard;
use fleetdash::api::{self, AppState};
use fleetdash::cli::{Cli, Command, ConfigCommand, DashboardCommand, ListCommand, ServeCommand};
use fleetdash::listing::{ListQuery, Listing};
use fleetdash::model::{Device, EntityKind, Organization, Report, Sim, User};
use fleetdash::{init_logging, Config, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Configuration commands report on broken files instead of failing on them
    if let Command::Config(config_cmd) = cli.command {
        return handle_config(cli.config, config_cmd);
    }

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(config, &serve_cmd).await,
        Command::Dashboard(dashboard_cmd) => handle_dashboard(&config, &dashboard_cmd),
        Command::List(list_cmd) => handle_list(&config, list_cmd),
        Command::Seed => handle_seed(&config),
        Command::Config(_) => Ok(()),
    }
}

fn open_storage(config: &Config) -> anyhow::Result<Storage> {
    Storage::from_config(&config.storage).context("failed to open fleet database")
}

async fn handle_serve(mut config: Config, cmd: &ServeCommand) -> anyhow::Result<()> {
    if let Some(bind) = cmd.bind {
        config.server.bind = bind;
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    config.validate()?;

    let storage = open_storage(&config)?;
    let addr = config.server.socket_addr();
    api::serve(AppState::new(storage, config), addr).await?;
    Ok(())
}

fn handle_dashboard(config: &Config, cmd: &DashboardCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let summary = dashboard(&storage, config.analytics.recent_activity_limit)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Fleet Dashboard");
    println!("===============");
    println!();
    println!("  Organizations:  {}", summary.total_organizations);
    println!("  Devices:        {}", summary.total_devices);
    println!("  SIMs:           {}", summary.total_sims);
    println!("  Users:          {}", summary.total_users);
    println!("  Data usage:     {} MB", summary.total_data_usage);
    println!();
    println!("[Devices by status]");
    if summary.device_stats.is_empty() {
        println!("  (no devices)");
    }
    for (status, count) in &summary.device_stats {
        println!("  {status:<10} {count}");
    }
    println!();
    println!("[Recent activity]");
    if summary.recent_activity.is_empty() {
        println!("  (none)");
    }
    for entry in &summary.recent_activity {
        println!(
            "  {}  {:<12} {}",
            entry.time.format("%Y-%m-%d %H:%M"),
            entry.kind.as_str(),
            entry.message
        );
    }
    Ok(())
}

fn handle_list(config: &Config, cmd: ListCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let json = cmd.json;
    let query = ListQuery {
        search: cmd.search,
        status: cmd.status,
        organization_id: None,
        page: cmd.page,
        per_page: cmd.per_page,
    };
    let pagination = &config.pagination;

    match EntityKind::from(cmd.entity) {
        EntityKind::Organization => print_listing(
            &query.apply(storage.list_organizations()?, pagination),
            json,
            |org: &Organization| {
                format!(
                    "{:>4}  {:<24} {:<10} {}",
                    org.id,
                    org.name,
                    org.status.label(),
                    org.email
                )
            },
        ),
        EntityKind::Device => print_listing(
            &query.apply(storage.list_devices()?, pagination),
            json,
            |device: &Device| {
                format!(
                    "{:>4}  {:<10} {:<8} {:<16} {}",
                    device.id,
                    device.label,
                    device.status.label(),
                    device.imei,
                    device.model.as_deref().unwrap_or("-")
                )
            },
        ),
        EntityKind::Sim => print_listing(
            &query.apply(storage.list_sims()?, pagination),
            json,
            |sim: &Sim| {
                format!(
                    "{:>4}  {:<10} {:<10} {:<10} {}/{} MB",
                    sim.id,
                    sim.sim_id,
                    sim.status.label(),
                    sim.network_provider,
                    sim.current_usage.unwrap_or(0),
                    sim.data_limit.unwrap_or(0)
                )
            },
        ),
        EntityKind::User => print_listing(
            &query.apply(storage.list_users()?, pagination),
            json,
            |user: &User| {
                format!(
                    "{:>4}  {:<16} {:<12} {:<10} {}",
                    user.id,
                    user.username,
                    user.role.label(),
                    user.status.label(),
                    user.email
                )
            },
        ),
        EntityKind::Report => print_listing(
            &query.apply(storage.list_reports()?, pagination),
            json,
            |report: &Report| {
                format!(
                    "{:>4}  {:<40} {:<14} {:<9} {}",
                    report.id,
                    report.name,
                    report.report_type.label(),
                    report.status.label(),
                    report.format.label()
                )
            },
        ),
    }
}

fn print_listing<T: Serialize>(
    listing: &Listing<T>,
    json: bool,
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(listing)?);
        return Ok(());
    }

    if listing.items().is_empty() {
        println!("No matching records.");
    }
    for item in listing.items() {
        println!("{}", row(item));
    }
    if let Listing::Page(page) = listing {
        println!();
        println!(
            "Page {} of {} ({} records)",
            page.current_page, page.total_pages, page.total_items
        );
    }
    Ok(())
}

fn handle_seed(config: &Config) -> anyhow::Result<()> {
    let mut storage_config = config.storage.clone();
    storage_config.seed_demo_data = false;
    let storage = Storage::from_config(&storage_config).context("failed to open fleet database")?;

    if storage.seed_demo_data()? {
        println!("Loaded demo data into {}", storage.path().display());
    } else {
        println!("Database already has records; nothing seeded.");
    }
    Ok(())
}

fn handle_config(
    config_path: Option<std::path::PathBuf>,
    cmd: ConfigCommand,
) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Listen address:     {}", config.server.socket_addr());
                println!("  CORS origins:       {}", config.server.cors_origins.join(", "));
                println!();
                println!("[Storage]");
                if config.storage.in_memory {
                    println!("  Database:           in memory");
                } else {
                    println!(
                        "  Database path:      {}",
                        config.storage.database_path.display()
                    );
                }
                println!("  Seed demo data:     {}", config.storage.seed_demo_data);
                println!();
                println!("[Analytics]");
                println!(
                    "  Recent activity:    {}",
                    config.analytics.recent_activity_limit
                );
                println!();
                println!("[Pagination]");
                println!("  Default per page:   {}", config.pagination.default_per_page);
                println!("  Max per page:       {}", config.pagination.max_per_page);
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let result = match &file {
                Some(path) => {
                    println!("Validating configuration: {}", path.display());
                    Config::load_file(path)
                }
                None => {
                    let path = config_path.clone().unwrap_or_else(Config::default_config_path);
                    println!("Validating configuration: {}", path.display());
                    Config::load_from(config_path)
                }
            };
            match result {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
