//! zonesync CLI - One-way sync of a local directory into a storage zone
//!
//! Wires the external collaborators around the engine:
//! - clap flag parsing and configuration validation
//! - tracing subscriber setup (diagnostics on stderr; the `+`/`-`
//!   decision protocol goes to stdout)
//! - SIGINT/SIGTERM translated into the run's cancellation token
//! - non-zero exit code on any error

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use zonesync_engine::{SyncConfig, SyncEngine, SyncReporter};
use zonesync_storage::StorageClient;

#[derive(Debug, Parser)]
#[command(
    name = "zonesync",
    version,
    about = "Synchronize a local directory into an edge storage zone"
)]
struct Cli {
    /// Source directory to sync from
    #[arg(long, default_value = ".")]
    source: PathBuf,

    /// Base URL of the storage endpoint
    #[arg(long, default_value = "https://storage.bunnycdn.com")]
    endpoint: String,

    /// API key for the storage zone
    #[arg(long, env = "ZONESYNC_ACCESS_KEY", hide_env_values = true)]
    access_key: String,

    /// Storage zone name
    #[arg(long)]
    zone: String,

    /// Report all decisions without performing any remote change
    #[arg(long)]
    dry_run: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Rejects configurations that clap cannot: present-but-empty values.
///
/// Runs before any network activity so a bad invocation never touches the
/// remote zone.
fn validate(cli: &Cli) -> Result<()> {
    if cli.endpoint.trim().is_empty() {
        bail!("endpoint is required");
    }
    if cli.access_key.trim().is_empty() {
        bail!("access-key is required");
    }
    if cli.zone.trim().is_empty() {
        bail!("zone is required");
    }
    Ok(())
}

/// Translates OS-level interrupts into the run-scoped cancellation token.
/// The engine only ever observes the token, never the raw signals.
fn spawn_signal_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(stream) => stream,
                Err(error) => {
                    warn!(%error, "failed to install SIGTERM handler");
                    return;
                }
            };
            tokio::select! {
                _ = ctrl_c => info!("received interrupt, cancelling sync"),
                _ = sigterm.recv() => info!("received SIGTERM, cancelling sync"),
            }
        }

        #[cfg(not(unix))]
        if ctrl_c.await.is_ok() {
            info!("received interrupt, cancelling sync");
        }

        cancel.cancel();
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    validate(&cli)?;

    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone());

    let client = StorageClient::new(&cli.endpoint, &cli.zone, &cli.access_key);
    let config = SyncConfig {
        dry_run: cli.dry_run,
        ..SyncConfig::default()
    };
    let engine = SyncEngine::new(Arc::new(client), SyncReporter::stdout(), config, cancel);

    let summary = engine
        .run(&cli.source)
        .await
        .with_context(|| format!("failed to sync {}", cli.source.display()))?;

    info!(
        uploaded = summary.files_uploaded,
        deleted = summary.files_deleted,
        duration_ms = summary.duration_ms,
        dry_run = cli.dry_run,
        "sync complete"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(args)
    }

    #[test]
    fn test_missing_zone_is_rejected() {
        let result = parse(&["zonesync", "--access-key", "k"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["zonesync", "--access-key", "k", "--zone", "z"]).expect("parse");
        assert_eq!(cli.source, PathBuf::from("."));
        assert_eq!(cli.endpoint, "https://storage.bunnycdn.com");
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_empty_endpoint_fails_validation() {
        let cli = parse(&[
            "zonesync",
            "--endpoint",
            "",
            "--access-key",
            "k",
            "--zone",
            "z",
        ])
        .expect("parse");
        let error = validate(&cli).expect_err("validation should fail");
        assert!(error.to_string().contains("endpoint is required"));
    }

    #[test]
    fn test_empty_access_key_fails_validation() {
        let cli = parse(&["zonesync", "--access-key", "", "--zone", "z"]).expect("parse");
        let error = validate(&cli).expect_err("validation should fail");
        assert!(error.to_string().contains("access-key is required"));
    }

    #[test]
    fn test_empty_zone_fails_validation() {
        let cli = parse(&["zonesync", "--access-key", "k", "--zone", ""]).expect("parse");
        let error = validate(&cli).expect_err("validation should fail");
        assert!(error.to_string().contains("zone is required"));
    }

    #[test]
    fn test_dry_run_flag() {
        let cli = parse(&[
            "zonesync",
            "--access-key",
            "k",
            "--zone",
            "z",
            "--dry-run",
        ])
        .expect("parse");
        assert!(cli.dry_run);
    }
}
