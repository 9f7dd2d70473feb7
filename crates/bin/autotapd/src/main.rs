//! # autotapd — autotap replay daemon
//!
//! Composition root that wires the virtual host, the selector engine and the
//! rule engine together, then replays a scenario.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialise logging
//! - Load the scenario (raw rule records and UI snapshots)
//! - Construct the virtual host from the configured screen and launcher
//! - Run the replay loop and report what fired
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

use std::sync::Arc;

use autotap_adapter_virtual::VirtualHost;
use autotapd::config::Config;
use autotapd::replay;
use autotapd::scenario::Scenario;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    init_logging(&config.logging.filter);

    let scenario = Scenario::from_file(&config.scenario.path)?;
    tracing::info!(path = %config.scenario.path.display(), "scenario loaded");

    // Host
    let host = Arc::new(VirtualHost::new(config.screen_size()).with_tap_timeout(config.tap_timeout()));
    host.set_launcher_activity_id(config.host.launcher_activity_id.clone());

    let summary = replay::run(scenario, Arc::clone(&host)).await?;

    for firing in &summary.firings {
        tracing::info!(
            at_ms = firing.at.as_millis(),
            activity = ?firing.activity_id,
            rule = %firing.rule.label,
            action = %firing.rule.result.action,
            succeeded = firing.rule.result.succeeded,
            "fired"
        );
    }
    tracing::info!(taps = host.taps().len(), "done");

    Ok(())
}

fn init_logging(filter: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::new(filter))
        .init();
}
