//! Waypoint Graph Server
//!
//! Serves the shared waypoint graph over HTTP.

use anyhow::Context;
use clap::{Arg, Command};
use tracing::info;
use waypoint_graph::core::{config::Config, create_app_state};

#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let matches = Command::new("waypoint-graph")
        .version(waypoint_graph::VERSION)
        .about("Weighted waypoint graph with shortest-path routing.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
        )
        .arg(
            Arg::new("http-addr")
                .long("http-addr")
                .value_name("ADDR")
                .help("HTTP server bind address")
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Directory for exported graph files")
        )
        .arg(
            Arg::new("tolerance")
                .long("tolerance")
                .value_name("DEGREES")
                .help("Coordinate tolerance for matching nodes on import")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
        )
        .get_matches();

    // Load configuration
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading configuration from {}", path))?,
        None => Config::load().context("loading configuration")?,
    };

    // Apply CLI overrides
    apply_cli_overrides(&mut config, &matches)?;
    config.validate()?;

    waypoint_graph::init_logging(&config.logging)?;
    info!("Starting Waypoint Graph v{}", waypoint_graph::VERSION);

    let state = create_app_state(config)?;
    waypoint_graph::api::start_server(state)
        .await
        .context("HTTP server failed")?;

    Ok(())
}

/// Apply command line argument overrides to configuration
fn apply_cli_overrides(config: &mut Config, matches: &clap::ArgMatches) -> waypoint_graph::Result<()> {
    if let Some(addr) = matches.get_one::<String>("http-addr") {
        config.server.http_addr = addr.parse()
            .map_err(|e| waypoint_graph::Error::config(format!("Invalid HTTP address: {}", e)))?;
    }

    if let Some(data_dir) = matches.get_one::<String>("data-dir") {
        config.storage.data_dir = data_dir.into();
    }

    if let Some(tolerance) = matches.get_one::<String>("tolerance") {
        config.graph.match_tolerance = tolerance.parse()
            .map_err(|e| waypoint_graph::Error::config(format!("Invalid tolerance: {}", e)))?;
    }

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.clone();
    }

    Ok(())
}
