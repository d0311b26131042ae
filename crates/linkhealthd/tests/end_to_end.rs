//! End-to-end scenarios for linkhealthd.
//!
//! Runs the full controller against a scripted fake device with the
//! production 47-interface range, a real file-backed run counter, and a
//! recording alert sink.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use linkhealth_common::alert::{AlertSink, Severity};
use linkhealth_common::channel::CommandChannel;
use linkhealth_common::counter::{FileCounterStore, RunCounterStore};
use linkhealth_common::error::Result;
use linkhealthd::{HealthCheckConfig, HealthController, RunAction};

/// Scripted switch: every interface healthy unless listed, counter
/// table all sentinels unless replaced. Tracks concurrent in-flight
/// calls and every executed command.
struct FakeSwitch {
    down_interfaces: Vec<String>,
    lane_table: String,
    executed: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeSwitch {
    fn healthy() -> Self {
        Self {
            down_interfaces: Vec::new(),
            lane_table: "REG_NAME M0,0-25G M1,0-25G M2,0-25G\n\
                         90-Rx Bad Preamble .... .... ....\n"
                .to_string(),
            executed: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    fn with_down_interface(mut self, interface: &str) -> Self {
        self.down_interfaces.push(interface.to_string());
        self
    }

    fn with_lane_table(mut self, table: &str) -> Self {
        self.lane_table = table.to_string();
        self
    }

    fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    fn recovery_invocations(&self) -> usize {
        self.executed()
            .iter()
            .filter(|c| *c == "write erase")
            .count()
    }

    fn max_concurrent_calls(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandChannel for FakeSwitch {
    async fn execute(&self, command: &str) -> Result<String> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        self.executed.lock().unwrap().push(command.to_string());

        // Keep the call open briefly so concurrency is observable.
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;

        let output = if command == "write erase" || command == "reload" {
            String::new()
        } else if command.contains("tah count asic") {
            self.lane_table.clone()
        } else {
            let iface = command
                .trim_start_matches("show cdp neighbors interface ")
                .trim_start_matches("show interface ")
                .trim_end_matches(" detail")
                .to_string();
            let down = self.down_interfaces.iter().any(|d| *d == iface);

            if command.starts_with("show cdp neighbors") {
                if down {
                    String::new()
                } else {
                    format!(
                        "Device ID:peer-switch\n\
                         Interface: {}, Port ID (outgoing port): Ethernet1/1\n",
                        iface
                    )
                }
            } else if down {
                "input rate 0 bps\ninput rate 0 bps\n".to_string()
            } else {
                "input rate 104 bps\ninput rate 96 bps\n".to_string()
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(output)
    }
}

#[derive(Default)]
struct RecordingSink {
    emitted: Mutex<Vec<(Severity, String)>>,
}

impl RecordingSink {
    fn emitted(&self) -> Vec<(Severity, String)> {
        self.emitted.lock().unwrap().clone()
    }
}

impl AlertSink for RecordingSink {
    fn emit(&self, severity: Severity, message: &str) {
        self.emitted
            .lock()
            .unwrap()
            .push((severity, message.to_string()));
    }
}

fn fast_config(counter_path: &std::path::Path) -> HealthCheckConfig {
    let mut config = HealthCheckConfig::default();
    config.probe.rate_sample_interval_ms = 0;
    config.probe.settle_delay_secs = 0;
    config.counter_file = counter_path.display().to_string();
    config
}

struct Harness {
    switch: Arc<FakeSwitch>,
    counter: Arc<FileCounterStore>,
    sink: Arc<RecordingSink>,
    controller: HealthController,
    _dir: tempfile::TempDir,
}

fn harness(switch: FakeSwitch) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let counter_path = dir.path().join("execution_count.txt");

    let switch = Arc::new(switch);
    let counter = Arc::new(FileCounterStore::new(&counter_path));
    let sink = Arc::new(RecordingSink::default());
    let controller = HealthController::new(
        switch.clone(),
        counter.clone(),
        sink.clone(),
        fast_config(&counter_path),
    );

    Harness {
        switch,
        counter,
        sink,
        controller,
        _dir: dir,
    }
}

#[tokio::test]
async fn healthy_device_recovers_with_single_info_alert() {
    let h = harness(FakeSwitch::healthy());

    let outcome = h.controller.run().await;
    assert_eq!(outcome.action, RunAction::Recovered);
    assert!(!outcome.scan.any_interface_down);
    assert!(outcome.scan.faulty_lanes.is_empty());

    let emitted = h.sink.emitted();
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].0, Severity::Info);
    assert_eq!(emitted[0].1, "No issue detected on execution #1");

    assert_eq!(h.switch.recovery_invocations(), 1);
    let executed = h.switch.executed();
    assert_eq!(executed.last().map(String::as_str), Some("reload"));
}

#[tokio::test]
async fn down_interface_raises_tagged_critical_and_blocks_recovery() {
    let h = harness(FakeSwitch::healthy().with_down_interface("Ethernet1/5"));

    let outcome = h.controller.run().await;
    assert_eq!(outcome.action, RunAction::Alerted);
    assert!(outcome.scan.any_interface_down);

    let emitted = h.sink.emitted();
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].0, Severity::Critical);
    assert_eq!(emitted[0].1, "Issue detected on execution #1");

    assert_eq!(h.switch.recovery_invocations(), 0);
}

#[tokio::test]
async fn lane_fault_raises_per_lane_criticals_and_blocks_recovery() {
    let table = "REG_NAME M1,0-25G M2,0-25G M15,0-25G\n\
                 90-Rx Bad Preamble .... X X\n";
    let h = harness(FakeSwitch::healthy().with_lane_table(table));

    let outcome = h.controller.run().await;
    assert_eq!(outcome.action, RunAction::Alerted);
    assert_eq!(outcome.scan.faulty_lanes.len(), 1);

    let emitted = h.sink.emitted();
    assert_eq!(emitted.len(), 2);
    assert_eq!(emitted[0].1, "Issue detected on execution #1");
    assert_eq!(
        emitted[1].1,
        "Bad preamble found in MAC instance: M2,0-25G"
    );

    assert_eq!(h.switch.recovery_invocations(), 0);
}

#[tokio::test]
async fn run_counter_persists_across_runs() {
    let h = harness(FakeSwitch::healthy());

    for expected in 1..=4u64 {
        let outcome = h.controller.run().await;
        assert_eq!(outcome.run_id, expected);
        assert_eq!(h.counter.read().await, expected);
    }

    // Alerts from every run carry their own run id.
    let emitted = h.sink.emitted();
    assert!(emitted[3].1.contains("execution #4"));
}

#[tokio::test]
async fn probe_concurrency_bounded_by_pool_size() {
    let h = harness(FakeSwitch::healthy());

    h.controller.run().await;

    // 47 interfaces, pool of 10, plus the single ASIC query.
    let max = h.switch.max_concurrent_calls();
    assert!(max <= 11, "observed {} concurrent device calls", max);

    // All interfaces were probed despite the bound.
    let executed = h.switch.executed();
    let neighbor_queries = executed
        .iter()
        .filter(|c| c.starts_with("show cdp neighbors"))
        .count();
    assert_eq!(neighbor_queries, 47);
}

#[tokio::test]
async fn all_interfaces_probed_even_with_early_down_finding() {
    // The first interface in the range is down; the scan must still
    // assess every other interface.
    let h = harness(FakeSwitch::healthy().with_down_interface("Ethernet1/2"));

    h.controller.run().await;

    let executed = h.switch.executed();
    let neighbor_queries = executed
        .iter()
        .filter(|c| c.starts_with("show cdp neighbors"))
        .count();
    assert_eq!(neighbor_queries, 47);
}
