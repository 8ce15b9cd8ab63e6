//! barq — unattended barcode intake pipeline.
//!
//! Hosting only: argument parsing, logging, configuration, directory
//! bootstrap, stale-claim recovery, and the scheduler run loop. All
//! pipeline behaviour lives in the member crates.

use barq_config::Config;
use barq_decode::DecodeEngine;
use barq_intake::{FileClaimer, OutputRouter, Scheduler, WorkerPool, ensure_directories};
use clap::Parser;
use derive_more::{Display, Error};
use exn::ResultExt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Display, Error)]
enum ErrorKind {
    #[display("configuration error")]
    Config,
    #[display("could not bootstrap pipeline directories")]
    Bootstrap,
    #[display("could not recover stale claims")]
    Recovery,
}

type Result<T> = std::result::Result<T, exn::Exn<ErrorKind>>;

#[derive(Debug, Parser)]
#[command(name = "barq", version, about = "Watch a directory, decode barcodes, route files by value")]
struct Args {
    /// Path to a TOML configuration file. Environment variables prefixed
    /// with BARQ_ override file values.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = ?err, "fatal");
            ExitCode::FAILURE
        },
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    ensure_directories([&config.watch_dir, &config.output_dir, &config.error_dir])
        .await
        .or_raise(|| ErrorKind::Bootstrap)?;

    let claimer = FileClaimer::new(&config.watch_dir);
    let released = claimer.release_stale_claims().await.or_raise(|| ErrorKind::Recovery)?;
    if released > 0 {
        info!(released, "released stale claims from a previous run");
    }

    let router = OutputRouter::new(&config.output_dir, &config.error_dir);
    let pool = WorkerPool::new(config.workers, Arc::new(DecodeEngine::new()), router);
    let scheduler = Scheduler::new(claimer, pool, config.poll_interval());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested, finishing in-flight batch");
            let _ = shutdown_tx.send(true);
        }
    });

    info!(
        watch = %config.watch_dir.display(),
        output = %config.output_dir.display(),
        error = %config.error_dir.display(),
        workers = config.workers,
        "barq started"
    );
    scheduler.run(shutdown_rx).await;
    Ok(())
}
