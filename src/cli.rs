//! Command-line interface.
//!
//! Single binary with subcommands: `serve` runs the HTTP hub (and is the
//! default when no subcommand is given); `ingest` and `apply-rules` are
//! offline one-shots for fetching quakes and matching stored quakes
//! against the current rules; `rule` manages rules from the terminal.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::AppState;
use crate::config::HubConfig;
use crate::domain::{BoundingBox, EventBus};
use crate::error::HubError;
use crate::feed::{FeedClient, resolve_feed};
use crate::metrics::init_metrics;
use crate::persistence::Store;
use crate::service::IngestService;

/// Top-level argument parser.
#[derive(Debug, Parser)]
#[command(name = "quakehub", about = "Earthquake feed ingestion and alerting hub", version)]
pub struct Cli {
    /// Subcommand to run; defaults to `serve`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Hub subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server.
    Serve,

    /// Fetch a feed and store its quakes, without matching rules.
    Ingest {
        /// Feed key from the static table, or a literal URL.
        #[arg(default_value = "all_hour")]
        feed: String,
    },

    /// Match stored quakes from the recent past against the current rules.
    ApplyRules {
        /// How far back to scan, in hours.
        #[arg(long, default_value_t = 24.0)]
        hours: f64,
    },

    /// Manage alerting rules.
    Rule {
        /// Rule operation.
        #[command(subcommand)]
        command: RuleCommand,
    },
}

/// Rule management subcommands.
#[derive(Debug, Subcommand)]
pub enum RuleCommand {
    /// Add a rule.
    Add {
        /// Free-text rule name.
        #[arg(long)]
        name: String,
        /// Minimum magnitude threshold.
        #[arg(long)]
        min_mag: f64,
        /// Optional bounding box as `lon1,lat1,lon2,lat2`.
        #[arg(long)]
        bbox: Option<String>,
    },
    /// List rules as JSON.
    List,
    /// Delete a rule by id.
    Del {
        /// Rule id.
        #[arg(long)]
        id: i64,
    },
}

/// Dispatches the parsed command.
///
/// # Errors
///
/// Propagates [`HubError`] from whichever operation ran.
pub async fn run(config: HubConfig, command: Option<Command>) -> Result<(), HubError> {
    match command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Ingest { feed } => ingest(&config, &feed).await,
        Command::ApplyRules { hours } => apply_rules(&config, hours).await,
        Command::Rule { command } => rule(&config, command).await,
    }
}

/// Runs the HTTP server until shutdown.
async fn serve(config: HubConfig) -> Result<(), HubError> {
    let metrics_handle = init_metrics()?;

    let store = Store::connect(&config.database_url, config.database_max_connections).await?;
    let feed = FeedClient::new(Duration::from_secs(config.feed_timeout_secs))?;
    let event_bus = EventBus::new(config.event_bus_capacity);
    let ingest = Arc::new(IngestService::new(feed, store.clone(), event_bus.clone()));

    let state = AppState {
        ingest,
        store,
        event_bus,
    };

    let app = api::build_router(Some(metrics_handle))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .map_err(|e| HubError::Internal(format!("bind {}: {e}", config.listen_addr)))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| HubError::Internal(format!("server error: {e}")))
}

/// Fetches a feed and stores its quakes.
async fn ingest(config: &HubConfig, feed: &str) -> Result<(), HubError> {
    let url = resolve_feed(feed);
    if url == feed {
        println!("Using custom URL: {feed}");
    } else {
        println!("Using feed key: {feed} -> {url}");
    }

    let store = Store::connect(&config.database_url, config.database_max_connections).await?;
    let client = FeedClient::new(Duration::from_secs(config.feed_timeout_secs))?;

    let quakes = client.fetch(feed).await?;
    let inserted = store.upsert_quakes(&quakes).await?;
    println!("Fetched {} quakes; newly inserted {inserted}.", quakes.len());
    Ok(())
}

/// Matches stored quakes from the last `hours` against the current rules.
#[allow(clippy::cast_possible_truncation)]
async fn apply_rules(config: &HubConfig, hours: f64) -> Result<(), HubError> {
    let store = Store::connect(&config.database_url, config.database_max_connections).await?;

    let rules = store.list_rules().await?;
    if rules.is_empty() {
        println!(
            "No rules found. Add one with: quakehub rule add --name 'USA West 3+' --min-mag 3.0 --bbox '-125,32,-114,42'"
        );
        return Ok(());
    }

    let now_ms = chrono::Utc::now().timestamp_millis();
    let since_ms = now_ms - (hours * 3_600_000.0) as i64;
    let quakes = store.list_quakes_since(since_ms).await?;
    println!(
        "Scanning {} quakes across {} rules (since {hours}h)...",
        quakes.len(),
        rules.len()
    );

    let mut inserted = 0_u32;
    for quake in &quakes {
        for rule in &rules {
            if rule.matches(quake) && store.record_alert(&quake.id, rule.id, now_ms).await? {
                inserted += 1;
                println!(
                    "[ALERT] Rule#{}({}) matched {}  M{}  {}",
                    rule.id, rule.name, quake.id, quake.mag, quake.place
                );
            }
        }
    }

    println!("Done. New alerts inserted: {inserted}");
    Ok(())
}

/// Runs a rule management subcommand.
async fn rule(config: &HubConfig, command: RuleCommand) -> Result<(), HubError> {
    let store = Store::connect(&config.database_url, config.database_max_connections).await?;

    match command {
        RuleCommand::Add { name, min_mag, bbox } => {
            let bbox = bbox.as_deref().map(str::parse::<BoundingBox>).transpose()?;
            let id = store.create_rule(&name, min_mag, bbox.as_ref()).await?;
            println!("Created rule #{id}");
        }
        RuleCommand::List => {
            let rules = store.list_rules().await?;
            let json = serde_json::to_string_pretty(&rules)
                .map_err(|e| HubError::Internal(format!("serialize rules: {e}")))?;
            println!("{json}");
        }
        RuleCommand::Del { id } => {
            if store.delete_rule(id).await? {
                println!("Deleted rule #{id}");
            } else {
                println!("No rule #{id}");
            }
        }
    }
    Ok(())
}
