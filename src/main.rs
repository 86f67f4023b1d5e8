use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scrim_insights::api::state::AppState;
use scrim_insights::calculate::mvp::{calculate_mvp_score, get_mvp_for_map, MvpQuery};
use scrim_insights::calculate::report::team_report;
use scrim_insights::calculate::roster::resolve_roster;
use scrim_insights::calculate::trends::TrendPeriod;
use scrim_insights::calculate::{with_deadline, RequestContext, TeamDataset};
use scrim_insights::config::AppConfig;
use scrim_insights::models::{MapId, TeamId};
use scrim_insights::parse_duration;
use scrim_insights::storage::{JsonlStore, StatsStore, StorageConfig};

#[derive(Parser)]
#[command(name = "scrim-insights")]
#[command(about = "Team and player analytics over recorded scrim logs")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Request deadline (e.g., "30s", "2m")
    #[arg(long)]
    timeout: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print a team's inferred roster
    Roster {
        /// Team id
        team_id: i64,
    },

    /// Print MVP scoring for a map
    Mvp {
        /// Map id
        map_id: i64,

        /// Score this player instead of picking the map MVP
        #[arg(long)]
        player: Option<String>,
    },

    /// Print every team view as one JSON document
    Report {
        /// Team id
        team_id: i64,

        /// Trend bucket: week or month
        #[arg(long, default_value = "week")]
        period: String,
    },
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let path = PathBuf::from(&cli.config);
    let mut config = if path.exists() {
        AppConfig::from_file(&path)
            .with_context(|| format!("loading config from {}", path.display()))?
    } else {
        AppConfig::default()
    };

    if let Some(dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(dir);
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(raw) = &cli.timeout {
        let timeout = parse_duration(raw)
            .with_context(|| format!("invalid --timeout: {}", raw))?;
        config.server.request_timeout_seconds = timeout.as_secs();
    }

    config.validate()?;
    Ok(config)
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    // stdout carries command output; logs go to stderr.
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    init_tracing(&config.log_level, cli.json_logs);
    tracing::info!("Starting scrim-insights v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(config.data_dir.clone());
    if !storage.tables_dir().exists() {
        tracing::warn!("No tables directory at {:?}; every query will be empty", storage.tables_dir());
    }
    let store: Arc<dyn StatsStore> = Arc::new(JsonlStore::new(storage));
    let deadline = Duration::from_secs(config.server.request_timeout_seconds);

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let state = AppState::new(store, config);
            let app = scrim_insights::api::build_router(state);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Roster { team_id } => {
            let ctx = RequestContext::new(store);
            let roster = with_deadline(deadline, resolve_roster(&ctx, TeamId(team_id))).await?;
            if roster.is_empty() {
                tracing::warn!("No roster found for team {}", team_id);
            }
            for name in roster.iter() {
                println!("{}", name);
            }
        }
        Commands::Mvp { map_id, player } => {
            let ctx = RequestContext::new(store);
            let map_id = MapId(map_id);
            let thresholds = config.analytics.mvp_thresholds();
            let result = match player {
                Some(name) => {
                    let query = MvpQuery::new(map_id, name).with_thresholds(thresholds);
                    with_deadline(deadline, calculate_mvp_score(&ctx, &query)).await?
                }
                None => with_deadline(deadline, get_mvp_for_map(&ctx, map_id, thresholds)).await?,
            };
            match result {
                Some(score) => print_json(&score)?,
                None => tracing::warn!("No comparable stats on map {}", map_id),
            }
        }
        Commands::Report { team_id, period } => {
            let period: TrendPeriod = period.parse().map_err(anyhow::Error::msg)?;
            let ctx = RequestContext::new(store);
            let dataset = with_deadline(deadline, TeamDataset::load(&ctx, TeamId(team_id))).await?;
            if dataset.maps.is_empty() {
                tracing::warn!("Team {} has no maps", team_id);
            }
            print_json(&team_report(&dataset, period))?;
        }
    }

    Ok(())
}
