//! linkhealthd daemon entry point.
//!
//! Takes no command-line arguments. Configuration comes from the file
//! named by `LINKHEALTHD_CONFIG` (default
//! `/etc/linkhealth/linkhealthd.conf`), with built-in platform defaults
//! when the file is absent. One invocation performs one complete
//! health-check run; periodic execution is the scheduler's job.
//!
//! The exit status does not encode the run verdict: a completed run
//! exits successfully whether it alerted or recovered, and the alert
//! sink is the only outcome channel. Only startup failures (bad
//! configuration) exit nonzero.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use linkhealth_common::{CliChannel, FileCounterStore, LogAlertSink};
use linkhealthd::{HealthCheckConfig, HealthController};

/// Default configuration file location.
const DEFAULT_CONFIG_PATH: &str = "/etc/linkhealth/linkhealthd.conf";

/// Initialize tracing/logging.
fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    info!("--- Starting linkhealthd ---");

    let config_path =
        std::env::var("LINKHEALTHD_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let config = match HealthCheckConfig::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!(path = %config_path, error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    info!(
        interfaces = config.interface_names().len(),
        pool_size = config.probe.pool_size,
        counter_file = %config.counter_file,
        "Configuration loaded"
    );

    let channel = Arc::new(CliChannel::new());
    let counter = Arc::new(FileCounterStore::new(&config.counter_file));
    let alerts = Arc::new(LogAlertSink::new());

    let controller = HealthController::new(channel, counter, alerts, config);
    let outcome = controller.run().await;

    info!(
        run_id = outcome.run_id,
        action = ?outcome.action,
        any_interface_down = outcome.scan.any_interface_down,
        faulty_lanes = outcome.scan.faulty_lanes.len(),
        "linkhealthd exiting"
    );

    // The run verdict is reported through the alert sink, not the exit
    // status.
    ExitCode::SUCCESS
}
