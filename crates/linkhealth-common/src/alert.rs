//! Severity-leveled alert sink.
//!
//! Alerts are the daemon's only operator-visible outcome channel: the
//! process exit status deliberately does not encode the run verdict.
//! The sink is fire-and-forget; no acknowledgment is required.

use tracing::{error, info};

/// Alert severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational - normal operation
    Info,
    /// Error - an operation failed
    Error,
    /// Critical - immediate attention required
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Error => write!(f, "error"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Append-only, severity-leveled message channel.
pub trait AlertSink: Send + Sync {
    /// Emits one alert message. Fire-and-forget.
    fn emit(&self, severity: Severity, message: &str);
}

/// Alert sink routing messages through `tracing`.
///
/// Critical and error alerts land on the error level so they survive
/// release log filtering; informational alerts on the info level.
#[derive(Debug, Clone, Default)]
pub struct LogAlertSink;

impl LogAlertSink {
    /// Creates a new log-backed alert sink.
    pub fn new() -> Self {
        Self
    }
}

impl AlertSink for LogAlertSink {
    fn emit(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Critical | Severity::Error => {
                error!(severity = %severity, "{}", message)
            }
            Severity::Info => info!(severity = %severity, "{}", message),
        }
    }
}
