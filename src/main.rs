//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `geoip_service` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::process;
use tokio_util::sync::CancellationToken;

use geoip_service::app::shutdown_gracefully;
use geoip_service::initialization::{init_client, init_logger_with};
use geoip_service::{Config, DatabaseKind, GeoIpManager};

/// Downloads MaxMind GeoLite2 databases and answers IP lookups.
#[derive(Parser, Debug)]
#[command(name = "geoip_service", version, about)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download every database once and verify it loads
    Download,
    /// Look up an IP address in the installed databases
    Lookup {
        /// IPv4 or IPv6 address
        ip: String,
        /// Which record to return
        #[arg(long, value_enum, default_value_t = LookupKind::Geo)]
        kind: LookupKind,
    },
    /// Show installed databases and their metadata
    Status,
    /// Sync once, then keep refreshing in the background until Ctrl-C
    Run,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LookupKind {
    Country,
    City,
    Asn,
    Geo,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // This allows setting MAXMIND_LICENSE_KEY in .env without exporting it manually
    // Try loading from current directory first, then from the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();

    let log_level = cli.config.log_level.clone();
    let log_format = cli.config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    if let Err(e) = execute(cli).await {
        eprintln!("geoip_service error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn execute(cli: Cli) -> Result<()> {
    cli.config.validate().context("Invalid configuration")?;
    let client = init_client(&cli.config).context("Failed to initialize HTTP client")?;
    let manager = GeoIpManager::new(client, cli.config);

    match cli.command {
        Command::Download => download(&manager).await,
        Command::Lookup { ip, kind } => lookup(&manager, &ip, kind).await,
        Command::Status => status(&manager).await,
        Command::Run => run(&manager).await,
    }
}

async fn download(manager: &GeoIpManager) -> Result<()> {
    let report = manager.sync().await.context("Database download failed")?;
    for kind in &report.installed {
        println!("✅ {} installed", kind);
    }
    for (kind, reason) in &report.stale {
        println!("⚠️  {} kept previous copy: {}", kind, reason);
    }
    manager.close().await;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize record")?
    );
    Ok(())
}

async fn lookup(manager: &GeoIpManager, ip: &str, kind: LookupKind) -> Result<()> {
    manager
        .load()
        .await
        .context("Failed to open installed databases")?;
    let service = manager.service();

    match kind {
        LookupKind::Country => print_json(&service.ip2_country(ip).await?)?,
        LookupKind::City => print_json(&service.ip2_city(ip).await?)?,
        LookupKind::Asn => print_json(&service.ip2_asn(ip).await?)?,
        LookupKind::Geo => match service.ip2_geo(ip).await {
            Ok(record) => print_json(&record)?,
            Err(e) => {
                print_json(&e.record)?;
                return Err(e.into());
            }
        },
    }
    manager.close().await;
    Ok(())
}

async fn status(manager: &GeoIpManager) -> Result<()> {
    let data_dir = manager.downloader().data_dir();
    println!("Data directory: {}", data_dir.display());

    if let Err(e) = manager.load().await {
        log::warn!("Some databases failed to open: {}", e);
    }
    for kind in DatabaseKind::ALL {
        let path = kind.installed_path(data_dir);
        match manager.registry().metadata(kind).await {
            Ok(meta) => println!(
                "{:<18} {} (type {}, IPv{}, built {})",
                kind.edition_id(),
                path.display(),
                meta.database_type,
                meta.ip_version,
                meta.build_date()
            ),
            Err(_) if path.is_file() => {
                println!("{:<18} {} (not loadable)", kind.edition_id(), path.display())
            }
            Err(_) => println!("{:<18} not installed", kind.edition_id()),
        }
    }
    manager.close().await;
    Ok(())
}

async fn run(manager: &GeoIpManager) -> Result<()> {
    // A failed first sync is not fatal while older files can still be served.
    match manager.sync().await {
        Ok(report) if report.is_partial() => {
            log::warn!("Started with {} stale database(s)", report.stale.len())
        }
        Ok(_) => log::info!("Databases up to date"),
        Err(e) => {
            log::error!("Initial sync failed: {}", e);
            manager
                .load()
                .await
                .context("Failed to open installed databases")?;
        }
    }

    let cancel = CancellationToken::new();
    let refresh_task = manager.start_auto_update(cancel.clone());

    log::info!(
        "Serving {} database(s); press Ctrl-C to stop",
        manager.registry().loaded_kinds().await.len()
    );
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    log::info!("Shutting down");
    shutdown_gracefully(cancel, refresh_task, manager.registry()).await;
    Ok(())
}
