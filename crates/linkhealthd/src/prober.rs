//! Per-interface prober.
//!
//! Produces one [`ProbeSample`] for one interface: a single neighbor
//! query followed by a fixed number of paced input-rate readings.
//! Every failure is confined to the sample it would have produced; a
//! probe never returns an error and never aborts the scan.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use linkhealth_common::channel::CommandChannel;

use crate::report;
use crate::types::{InterfaceId, ProbeSample};

/// Probes one interface for link-failure symptoms.
#[derive(Clone)]
pub struct InterfaceProber {
    channel: Arc<dyn CommandChannel>,
    rate_sample_count: u32,
    rate_sample_interval: Duration,
}

impl InterfaceProber {
    /// Creates a prober issuing commands over the given channel.
    pub fn new(
        channel: Arc<dyn CommandChannel>,
        rate_sample_count: u32,
        rate_sample_interval: Duration,
    ) -> Self {
        Self {
            channel,
            rate_sample_count,
            rate_sample_interval,
        }
    }

    /// Runs the full probe sequence for one interface.
    ///
    /// The neighbor query runs once; a fetch failure is logged and
    /// treated as "no entry", the same as a clean negative. Rate
    /// queries run `rate_sample_count` times with a pause between
    /// successive queries; a failed or unparseable reading contributes
    /// an absent sample.
    pub async fn probe(&self, interface: &InterfaceId) -> ProbeSample {
        let has_neighbor_entry = self.check_neighbor_entry(interface).await;

        let mut rate_samples = Vec::with_capacity(self.rate_sample_count as usize);
        for i in 0..self.rate_sample_count {
            if i > 0 {
                sleep(self.rate_sample_interval).await;
            }
            rate_samples.push(self.read_input_rate(interface).await);
        }

        let sample = ProbeSample {
            has_neighbor_entry,
            rate_samples,
        };
        debug!(
            interface = %interface,
            neighbor = sample.has_neighbor_entry,
            samples = ?sample.rate_samples,
            down = sample.is_down(),
            "Probe complete"
        );
        sample
    }

    /// Queries the discovery protocol for a neighbor entry.
    async fn check_neighbor_entry(&self, interface: &InterfaceId) -> bool {
        let command = format!("show cdp neighbors interface {} detail", interface);
        match self.channel.execute(&command).await {
            Ok(output) => report::has_neighbor_entry(&output, interface.as_str()),
            Err(e) => {
                // Indistinguishable from a clean negative for the
                // verdict; the log line is the only place the two
                // cases diverge.
                warn!(
                    interface = %interface,
                    error = %e,
                    "Neighbor query failed, treating as no entry"
                );
                false
            }
        }
    }

    /// Reads one input-rate sample, if available.
    async fn read_input_rate(&self, interface: &InterfaceId) -> Option<u64> {
        let command = format!("show interface {}", interface);
        match self.channel.execute(&command).await {
            Ok(output) => {
                let rate = report::second_input_rate(&output);
                if rate.is_none() {
                    warn!(
                        interface = %interface,
                        "Could not parse second input rate, dropping sample"
                    );
                }
                rate
            }
            Err(e) => {
                warn!(
                    interface = %interface,
                    error = %e,
                    "Rate query failed, dropping sample"
                );
                None
            }
        }
    }
}
