//! Common infrastructure for the linkhealth daemons.
//!
//! This crate provides the external collaborators the health-check core
//! depends on, each behind a small trait so the daemon logic can be
//! exercised without a real device:
//!
//! - [`channel`]: the device command channel (one textual command in,
//!   one textual response out) plus the production CLI implementation
//! - [`alert`]: the severity-leveled, fire-and-forget alert sink
//! - [`counter`]: the durable whole-value run counter store
//! - [`error`]: error types shared across the workspace
//!
//! # Example
//!
//! ```ignore
//! use linkhealth_common::{
//!     channel::{CliChannel, CommandChannel},
//!     error::Result,
//! };
//!
//! async fn show_version(channel: &CliChannel) -> Result<String> {
//!     channel.execute("show version").await
//! }
//! ```

pub mod alert;
pub mod channel;
pub mod counter;
pub mod error;

// Re-export commonly used items at crate root
pub use alert::{AlertSink, LogAlertSink, Severity};
pub use channel::{shellquote, CliChannel, CommandChannel};
pub use counter::{FileCounterStore, RunCounterStore};
pub use error::{HealthError, Result};
