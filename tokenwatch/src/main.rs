use std::sync::Arc;

use anyhow::Context;
use args::{Args, Command};
use capture::RequestEvent;
use clap::Parser;
use config::Config;
use storage::FileStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracker::{Observation, Tracker, spawn_sweeper};

mod args;
mod logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init(&args.log);

    let config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::default(),
    };

    let store = Arc::new(FileStore::new(config.storage.path.clone()));
    let tracker = Arc::new(Tracker::from_config(store, &config));

    match args.subcommand() {
        Command::Run => run(tracker, &config).await,
        Command::Snapshot => {
            let snapshot = tracker.snapshot().await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);

            Ok(())
        }
        Command::Copy { identity } => match tracker.copy_raw_credential(&identity).await? {
            Some(credential) => {
                println!("{credential}");
                Ok(())
            }
            None => anyhow::bail!("No token group with identity {identity}"),
        },
        Command::Sweep => {
            let report = tracker
                .sweep()
                .await
                .context("Retention sweep could not reach storage")?;

            println!(
                "retained: {}\nexpired: {}\nevicted: {}\npruned requests: {}",
                report.groups_retained, report.groups_expired, report.groups_evicted, report.requests_pruned
            );

            Ok(())
        }
    }
}

async fn run(tracker: Arc<Tracker>, config: &Config) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let sweeper = spawn_sweeper(tracker.clone(), config.sweeper.interval, shutdown.clone());

    log::info!(
        "Watching request events on stdin, storing token groups in {}",
        config.storage.path.display()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupted, shutting down");
                break;
            }
            line = lines.next_line() => line.context("Failed to read request events from stdin")?,
        };

        let Some(line) = line else {
            log::debug!("Request event stream closed");
            break;
        };

        if line.trim().is_empty() {
            continue;
        }

        let event: RequestEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(err) => {
                log::warn!("Skipping malformed request event: {err}");
                continue;
            }
        };

        if let Observation::StorageUnavailable = tracker.observe(&event).await {
            log::debug!("Request to {} was not recorded", event.url);
        }
    }

    shutdown.cancel();
    sweeper.await.context("Retention sweeper task failed")?;

    Ok(())
}
