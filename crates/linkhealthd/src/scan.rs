//! Concurrent scan orchestrator.
//!
//! Fans the per-interface probe out over the configured range with a
//! fixed-size worker pool and waits for every probe to finish. The scan
//! never exits early on a "down" finding: all interfaces are assessed
//! so alerting stays complete, and the boolean aggregate is a plain OR
//! over the verdict set.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::prober::InterfaceProber;
use crate::types::InterfaceId;

/// Runs the interface probers with bounded parallelism.
pub struct ScanOrchestrator {
    prober: InterfaceProber,
    pool_size: usize,
}

impl ScanOrchestrator {
    /// Creates an orchestrator with the given worker-pool size.
    pub fn new(prober: InterfaceProber, pool_size: usize) -> Self {
        Self { prober, pool_size }
    }

    /// Probes every interface and returns true if any is down.
    ///
    /// At most `pool_size` probes run concurrently; the call returns
    /// only after all probes have completed.
    pub async fn scan(&self, interfaces: &[InterfaceId]) -> bool {
        let semaphore = Arc::new(Semaphore::new(self.pool_size));
        let mut probes = JoinSet::new();

        for interface in interfaces {
            let prober = self.prober.clone();
            let interface = interface.clone();
            let semaphore = Arc::clone(&semaphore);
            probes.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("scan semaphore closed");
                let sample = prober.probe(&interface).await;
                (interface, sample.is_down())
            });
        }

        let mut any_down = false;
        let mut down_count = 0usize;
        while let Some(result) = probes.join_next().await {
            match result {
                Ok((interface, down)) => {
                    if down {
                        warn!(interface = %interface, "Interface verdict: down");
                        any_down = true;
                        down_count += 1;
                    }
                }
                Err(e) => {
                    // A panicked probe task counts as no evidence, the
                    // same conservative reading as a failed fetch.
                    warn!(error = %e, "Probe task failed to complete");
                }
            }
        }

        info!(
            interfaces = interfaces.len(),
            down = down_count,
            "Interface scan complete"
        );
        any_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use linkhealth_common::channel::CommandChannel;
    use linkhealth_common::error::Result;

    /// Channel tracking the high-water mark of concurrent in-flight calls.
    struct InstrumentedChannel {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        down_interfaces: Mutex<Vec<String>>,
    }

    impl InstrumentedChannel {
        fn new(down_interfaces: &[&str]) -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                down_interfaces: Mutex::new(
                    down_interfaces.iter().map(|s| s.to_string()).collect(),
                ),
            }
        }

        fn max_seen(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CommandChannel for InstrumentedChannel {
        async fn execute(&self, command: &str) -> Result<String> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);

            // Hold the call open long enough for other workers to pile up.
            tokio::time::sleep(Duration::from_millis(5)).await;

            let iface = command
                .trim_start_matches("show cdp neighbors interface ")
                .trim_start_matches("show interface ")
                .trim_end_matches(" detail")
                .to_string();
            let down = self
                .down_interfaces
                .lock()
                .unwrap()
                .iter()
                .any(|d| *d == iface);

            let output = if command.starts_with("show cdp neighbors") {
                if down {
                    String::new()
                } else {
                    format!(
                        "Device ID:peer\nInterface: {}, Port ID (outgoing port): Ethernet1/1\n",
                        iface
                    )
                }
            } else if down {
                "input rate 0 bps\ninput rate 0 bps\n".to_string()
            } else {
                "input rate 100 bps\ninput rate 96 bps\n".to_string()
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(output)
        }
    }

    fn interfaces(count: u32) -> Vec<InterfaceId> {
        (2..2 + count).map(|i| InterfaceId::new("Ethernet1/", i)).collect()
    }

    fn orchestrator(channel: Arc<InstrumentedChannel>, pool_size: usize) -> ScanOrchestrator {
        let prober = InterfaceProber::new(channel, 3, Duration::from_millis(0));
        ScanOrchestrator::new(prober, pool_size)
    }

    #[tokio::test]
    async fn test_all_healthy_scan_is_clean() {
        let channel = Arc::new(InstrumentedChannel::new(&[]));
        let scan = orchestrator(channel, 10);
        assert!(!scan.scan(&interfaces(47)).await);
    }

    #[tokio::test]
    async fn test_single_down_interface_detected() {
        let channel = Arc::new(InstrumentedChannel::new(&["Ethernet1/5"]));
        let scan = orchestrator(channel, 10);
        assert!(scan.scan(&interfaces(47)).await);
    }

    #[tokio::test]
    async fn test_concurrency_stays_within_pool_size() {
        let channel = Arc::new(InstrumentedChannel::new(&[]));
        let scan = orchestrator(Arc::clone(&channel), 10);
        scan.scan(&interfaces(47)).await;

        assert!(
            channel.max_seen() <= 10,
            "observed {} concurrent calls",
            channel.max_seen()
        );
        // The pool should actually be exercised, not serialized.
        assert!(channel.max_seen() > 1);
    }

    #[tokio::test]
    async fn test_empty_interface_list() {
        let channel = Arc::new(InstrumentedChannel::new(&[]));
        let scan = orchestrator(channel, 10);
        assert!(!scan.scan(&[]).await);
    }
}
