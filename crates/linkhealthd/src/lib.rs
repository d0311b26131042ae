//! # linkhealthd - Interface Health-Check Daemon
//!
//! Periodic health checker for a fixed range of front-panel interfaces
//! on a switching device. Each invocation probes every interface for
//! link-failure symptoms (no discovery-protocol neighbor and a
//! consistently zero input rate) and parses the forwarding-ASIC error
//! counters for bad-preamble faults on in-scope MAC lanes.
//!
//! ## Decision rule
//! - Any interface down OR any in-scope lane fault: critical alerts
//!   are emitted and nothing else happens.
//! - Neither found: an informational alert is emitted, then the device
//!   is factory-reset and rebooted (a reset-to-clean-state maintenance
//!   action, deliberately gated on the all-clear verdict).
//!
//! ## Structure
//! - [`config`]: TOML configuration with platform defaults
//! - [`report`]: parsers for the raw device report text
//! - [`prober`]: the per-interface probe sequence
//! - [`scan`]: bounded-concurrency fan-out over the interface range
//! - [`controller`]: the per-run state machine and recovery gate
//!
//! A durable execution counter is incremented and persisted at the
//! start of every run and tags every alert for cross-run correlation.

pub mod config;
pub mod controller;
pub mod prober;
pub mod report;
pub mod scan;
pub mod types;

pub use config::HealthCheckConfig;
pub use controller::{HealthController, RunAction, RunOutcome};
pub use prober::InterfaceProber;
pub use scan::ScanOrchestrator;
pub use types::{InterfaceId, LaneFaultReport, LaneId, ProbeSample, ScanResult};
