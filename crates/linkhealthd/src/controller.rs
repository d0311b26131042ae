//! Verdict aggregator and recovery controller.
//!
//! The top-level per-run state machine: persist the incremented run
//! counter, wait out the settling delay, run the interface scan and the
//! ASIC counter extraction, then either alert on the findings or
//! perform the factory-reset + reboot recovery sequence.
//!
//! Side-effect ordering is load-bearing: the counter write lands before
//! any probing so the count reflects attempts, and alert emission
//! always precedes the irreversible recovery action.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{error, info, warn};

use linkhealth_common::alert::{AlertSink, Severity};
use linkhealth_common::channel::CommandChannel;
use linkhealth_common::counter::RunCounterStore;

use crate::config::HealthCheckConfig;
use crate::prober::InterfaceProber;
use crate::report;
use crate::scan::ScanOrchestrator;
use crate::types::{LaneFaultReport, ScanResult};

/// Terminal action taken by one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunAction {
    /// An issue was found; critical alerts were emitted, no recovery.
    Alerted,
    /// No issue was found; factory reset and reboot were invoked.
    Recovered,
    /// No issue was found but a recovery command failed.
    RecoveryFailed,
}

/// Outcome of one complete health-check run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Run identifier (the persisted execution count for this run).
    pub run_id: u64,
    /// The aggregate scan findings.
    pub scan: ScanResult,
    /// The action the run ended with.
    pub action: RunAction,
}

/// The per-run health-check state machine.
pub struct HealthController {
    channel: Arc<dyn CommandChannel>,
    counter: Arc<dyn RunCounterStore>,
    alerts: Arc<dyn AlertSink>,
    config: HealthCheckConfig,
}

impl HealthController {
    /// Creates a controller over the injected collaborators.
    pub fn new(
        channel: Arc<dyn CommandChannel>,
        counter: Arc<dyn RunCounterStore>,
        alerts: Arc<dyn AlertSink>,
        config: HealthCheckConfig,
    ) -> Self {
        Self {
            channel,
            counter,
            alerts,
            config,
        }
    }

    /// Executes one full run and returns its outcome.
    ///
    /// Never fails: every collaborator error degrades toward the
    /// conservative "no issue" reading or is surfaced through the alert
    /// sink, per the daemon's bias against false-positive recovery.
    pub async fn run(&self) -> RunOutcome {
        let run_id = self.increment_run_counter().await;
        info!(run_id, "Starting health-check run");

        // Post-boot interface and ASIC state needs time to stabilize
        // before a rate reading means anything.
        sleep(self.config.settle_delay()).await;

        let prober = InterfaceProber::new(
            Arc::clone(&self.channel),
            self.config.probe.rate_sample_count,
            self.config.rate_sample_interval(),
        );
        let orchestrator = ScanOrchestrator::new(prober, self.config.probe.pool_size);
        let interfaces = self.config.interface_names();

        // Both findings must be complete before the decision; the two
        // queries are independent so they run concurrently.
        let (any_interface_down, fault_report) =
            tokio::join!(orchestrator.scan(&interfaces), self.check_asic_counter());

        let scan = ScanResult {
            any_interface_down,
            faulty_lanes: fault_report.lanes,
        };

        let action = if scan.healthy() {
            self.recover(run_id).await
        } else {
            self.alert_issue(run_id, &scan);
            RunAction::Alerted
        };

        info!(run_id, ?action, "Health-check run complete");
        RunOutcome {
            run_id,
            scan,
            action,
        }
    }

    /// Reads, increments, and persists the execution count.
    ///
    /// The write happens before any probing so the persisted count
    /// reflects attempts. A failed write is logged and the run
    /// continues with the in-memory value.
    async fn increment_run_counter(&self) -> u64 {
        let run_id = self.counter.read().await + 1;
        if let Err(e) = self.counter.write(run_id).await {
            error!(run_id, error = %e, "Failed to persist run counter");
        }
        run_id
    }

    /// Fetches and parses the ASIC error-counter table.
    ///
    /// A failed fetch reads as "no fault", the same as a table of
    /// sentinel placeholders.
    async fn check_asic_counter(&self) -> LaneFaultReport {
        match self.channel.execute(&self.config.asic.counter_command).await {
            Ok(output) => {
                report::parse_lane_faults(&output, self.config.asic.max_faulty_lane_instance)
            }
            Err(e) => {
                warn!(error = %e, "ASIC counter query failed, treating as no fault");
                LaneFaultReport::default()
            }
        }
    }

    /// Emits the issue-detected alerts. No recovery action is taken.
    fn alert_issue(&self, run_id: u64, scan: &ScanResult) {
        self.alerts.emit(
            Severity::Critical,
            &format!("Issue detected on execution #{}", run_id),
        );
        for lane in &scan.faulty_lanes {
            self.alerts.emit(
                Severity::Critical,
                &format!("Bad preamble found in MAC instance: {}", lane),
            );
        }
    }

    /// Runs the factory-reset + reboot sequence.
    ///
    /// The informational alert is emitted before the first destructive
    /// command. A failing command produces one error alert and ends the
    /// attempt; there is no retry and no escalation.
    async fn recover(&self, run_id: u64) -> RunAction {
        self.alerts.emit(
            Severity::Info,
            &format!("No issue detected on execution #{}", run_id),
        );

        let sequence = [
            &self.config.recovery.factory_reset_command,
            &self.config.recovery.reboot_command,
        ];
        for command in sequence {
            if let Err(e) = self.channel.execute(command).await {
                self.alerts.emit(
                    Severity::Error,
                    &format!("Failed to execute {}: {}", command, e),
                );
                return RunAction::RecoveryFailed;
            }
        }

        info!(run_id, "Recovery sequence invoked");
        RunAction::Recovered
    }
}
