//! Freebox munin client binary.
//!
//! `freebox-munin authorize` runs the one-time authorization flow; any other
//! invocation loads the stored credentials and prints the disk report. Every
//! fatal condition exits with status 1 after a printed diagnostic; the
//! library itself never terminates the process.

use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use freebox_munin::api::{FreeboxClient, DEFAULT_BASE_URL};
use freebox_munin::auth::{request_authorization, SessionManager};
use freebox_munin::config::CredentialStore;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let result = if args.len() > 1 && args[1] == "authorize" {
        run_authorize().await
    } else {
        run_disk_report().await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// One-time authorization against the Freebox front panel.
async fn run_authorize() -> Result<()> {
    let store = CredentialStore::new()?;
    let device_name = hostname::get()
        .context("Could not determine hostname")?
        .to_string_lossy()
        .into_owned();

    info!(device_name = %device_name, "Requesting authorization");
    let http = reqwest::Client::new();
    request_authorization(&http, DEFAULT_BASE_URL, &store, &device_name).await?;

    println!(
        "Successfully authorized. Credentials saved to {}",
        store.path().display()
    );
    Ok(())
}

/// Default run: fetch the disk inventory and print one line per disk.
async fn run_disk_report() -> Result<()> {
    let store = CredentialStore::new()?;
    let credentials = store
        .load()
        .context("No saved credentials - run `freebox-munin authorize` first")?;

    let session = SessionManager::new(credentials, store);
    let mut client = FreeboxClient::new(session)?;

    let disks = client.connected_disks().await?;
    for disk in &disks {
        println!("{}: {}", disk.slug(), disk.display_name());
        for partition in &disk.partitions {
            println!(
                "  {}: {} / {} bytes used",
                partition.label, partition.used_bytes, partition.total_bytes
            );
        }
    }
    Ok(())
}
