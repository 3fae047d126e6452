//! Reconciler Service
//!
//! One-shot binary: reconcile the local machine inventory with the
//! provisioning backend and exit. Meant to be run by cron or a systemd
//! timer; exits non-zero if anything failed so the scheduler can alert.

mod store;

use std::env;
use std::sync::Arc;

use anyhow::{bail, Context};
use provisioner_client::ProvisionerClient;
use reconciler::Reconciler;
use tracing::{info, warn};

use crate::store::JsonFileMachineStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    info!("Starting reconciler");

    // Load configuration from environment variables
    let provisioner_url =
        env::var("PROVISIONER_URL").unwrap_or_else(|_| "http://localhost:8800".to_string());
    let provisioner_token = env::var("PROVISIONER_TOKEN")
        .context("PROVISIONER_TOKEN environment variable is required")?;
    let machines_file =
        env::var("MACHINES_FILE").unwrap_or_else(|_| "/var/lib/bootforge/machines.json".to_string());
    let release = env::var("MAAS_RELEASE").unwrap_or_else(|_| "precise".to_string());

    info!("Configuration:");
    info!("  Provisioner URL: {}", provisioner_url);
    info!("  Machines file: {}", machines_file);
    info!("  Release: {}", release);

    let client = ProvisionerClient::new(provisioner_url, provisioner_token)?;
    let store = JsonFileMachineStore::load(&machines_file)
        .await
        .with_context(|| format!("opening machine store {machines_file}"))?;

    let reconciler = Reconciler::new(Arc::new(store), Arc::new(client), release);
    let report = reconciler.reconcile().await?;

    info!(
        created_local = report.created_local,
        created_remote = report.created_remote,
        macs_added_local = report.macs_added_local,
        mac_sets_pushed = report.mac_sets_pushed,
        "reconcile finished"
    );

    if !report.failures.is_empty() {
        for failure in &report.failures {
            warn!("failure: {}", failure);
        }
        bail!("{} item(s) failed to reconcile", report.failures.len());
    }

    Ok(())
}
