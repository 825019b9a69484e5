//! docsync: selective MongoDB to Meilisearch sync.
//!
//! Selects documents flagged for indexing and marked within the selection
//! window, then upserts them into the target index.
//!
//! Usage:
//!   MONGODB_URI=mongodb://localhost:27017 docsync run
//!   docsync --window-days 1 watch --interval-secs 600
//!
//! `watch` runs passes back to back on one orchestrator, so passes never
//! overlap.

use anyhow::{Context, Result};
use clap::Parser;
use docsync_cli::{Cli, Command, ConnectionArgs, HealthReport};
use docsync_search::{MeiliClient, SearchEngine};
use docsync_store::{MongoStore, RecordStore};
use docsync_sync::{SyncFailure, SyncOrchestrator, SyncReport};
use docsync_types::Movie;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match cli.command {
        Command::Run => run_once(&cli.connection).await,
        Command::Watch { interval_secs } => {
            watch(&cli.connection, Duration::from_secs(interval_secs.max(1))).await
        }
        Command::Health => health(&cli.connection).await,
        Command::Search { query } => search(&cli.connection, &query).await,
        Command::Task { uid } => task(&cli.connection, uid).await,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn meili_client(args: &ConnectionArgs) -> Result<MeiliClient> {
    MeiliClient::new(args.meili_config()).context("Failed to create Meilisearch client")
}

async fn build_orchestrator(args: &ConnectionArgs) -> Result<SyncOrchestrator<Movie>> {
    let sync_config = args.sync_config()?;
    let store = MongoStore::connect(args.store_config()?).await?;
    let writer = meili_client(args)?;
    let orchestrator =
        SyncOrchestrator::<Movie>::new(sync_config, Arc::new(store), Arc::new(writer))?;
    Ok(orchestrator)
}

async fn run_pass(orchestrator: &SyncOrchestrator<Movie>) -> Result<SyncReport> {
    match orchestrator.run().await {
        Ok(report) => {
            print_json(&report)?;
            Ok(report)
        }
        Err(e) => {
            error!("Sync run failed ({}): {}", e.kind(), e);
            print_json(&SyncFailure::from(&e))?;
            Err(e.into())
        }
    }
}

async fn run_once(args: &ConnectionArgs) -> Result<()> {
    let orchestrator = build_orchestrator(args).await?;
    if orchestrator.config().window.is_disabled() {
        warn!("Selection window is zero; sync is disabled");
        return Ok(());
    }
    run_pass(&orchestrator).await?;
    info!("Done");
    Ok(())
}

async fn watch(args: &ConnectionArgs, interval: Duration) -> Result<()> {
    let orchestrator = build_orchestrator(args).await?;
    if orchestrator.config().window.is_disabled() {
        warn!("Selection window is zero; sync is disabled");
        return Ok(());
    }

    info!("Syncing every {}s, Ctrl-C to stop", interval.as_secs());
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // A failed pass is reported; the next tick is the retry.
                let _ = run_pass(&orchestrator).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                return Ok(());
            }
        }
    }
}

async fn health(args: &ConnectionArgs) -> Result<()> {
    let store = MongoStore::connect(args.store_config()?).await?;
    let search = meili_client(args)?;

    let report = HealthReport {
        store: RecordStore::<Movie>::health_check(&store).await,
        search: search.health().await,
    };
    print_json(&report)?;

    if !report.is_healthy() {
        anyhow::bail!("one or more services are unreachable");
    }
    Ok(())
}

async fn search(args: &ConnectionArgs, query: &str) -> Result<()> {
    let client = meili_client(args)?;
    let result = client
        .search(&args.index, query)
        .await
        .with_context(|| format!("Search on {} failed", args.index))?;
    print_json(&result)
}

async fn task(args: &ConnectionArgs, uid: u64) -> Result<()> {
    let client = meili_client(args)?;
    let task = client
        .get_task(uid)
        .await
        .with_context(|| format!("Failed to fetch task {uid}"))?;
    print_json(&task)
}
