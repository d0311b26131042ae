//! Configuration for linkhealthd.
//!
//! Loads and validates daemon configuration from TOML files.
//! Default location: /etc/linkhealth/linkhealthd.conf
//!
//! Every value has a built-in default matching the reference platform
//! (48-port leaf switch, `Ethernet1/2` through `Ethernet1/48`), so the
//! daemon runs with no config file at all.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use linkhealth_common::error::{HealthError, Result};

use crate::types::InterfaceId;

/// Interface range configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceConfig {
    /// Platform name prefix, e.g. "Ethernet1/"
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,

    /// First port ordinal in the checked range (inclusive)
    #[serde(default = "default_first_ordinal")]
    pub first_ordinal: u32,

    /// Last port ordinal in the checked range (inclusive)
    #[serde(default = "default_last_ordinal")]
    pub last_ordinal: u32,
}

/// Probing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Number of input-rate readings per interface
    #[serde(default = "default_rate_sample_count")]
    pub rate_sample_count: u32,

    /// Pause between successive rate readings in milliseconds.
    /// The device smooths its rate counters exponentially; spaced
    /// readings approximate a settled value.
    #[serde(default = "default_rate_sample_interval")]
    pub rate_sample_interval_ms: u64,

    /// Settling delay before scanning begins, in seconds
    #[serde(default = "default_settle_delay")]
    pub settle_delay_secs: u64,

    /// Maximum number of interfaces probed concurrently
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

/// ASIC counter-table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsicConfig {
    /// Device command producing the error-counter table
    #[serde(default = "default_counter_command")]
    pub counter_command: String,

    /// Highest MAC lane instance number in fault scope (inclusive).
    /// Lanes above this are ignored even when flagged.
    #[serde(default = "default_max_faulty_lane_instance")]
    pub max_faulty_lane_instance: u32,
}

/// Recovery action configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// Factory-reset command
    #[serde(default = "default_factory_reset_command")]
    pub factory_reset_command: String,

    /// Reboot command
    #[serde(default = "default_reboot_command")]
    pub reboot_command: String,
}

/// Complete linkhealthd configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckConfig {
    /// Interface range configuration
    #[serde(default)]
    pub interfaces: InterfaceConfig,

    /// Probing configuration
    #[serde(default)]
    pub probe: ProbeConfig,

    /// ASIC counter-table configuration
    #[serde(default)]
    pub asic: AsicConfig,

    /// Recovery action configuration
    #[serde(default)]
    pub recovery: RecoveryConfig,

    /// Path of the persisted run counter file
    #[serde(default = "default_counter_file")]
    pub counter_file: String,
}

// Default functions
fn default_name_prefix() -> String {
    "Ethernet1/".to_string()
}

fn default_first_ordinal() -> u32 {
    2
}

fn default_last_ordinal() -> u32 {
    48
}

fn default_rate_sample_count() -> u32 {
    3
}

fn default_rate_sample_interval() -> u64 {
    1000
}

fn default_settle_delay() -> u64 {
    15
}

fn default_pool_size() -> usize {
    10
}

fn default_counter_command() -> String {
    "slot 1 q \"sh ha int tah count asic 0\" | egrep -i \"REG_NAME.*M[0-9]|preamble\"".to_string()
}

fn default_max_faulty_lane_instance() -> u32 {
    14
}

fn default_factory_reset_command() -> String {
    "write erase".to_string()
}

fn default_reboot_command() -> String {
    "reload".to_string()
}

fn default_counter_file() -> String {
    "/bootflash/execution_count.txt".to_string()
}

// Default implementations
impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            name_prefix: default_name_prefix(),
            first_ordinal: default_first_ordinal(),
            last_ordinal: default_last_ordinal(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            rate_sample_count: default_rate_sample_count(),
            rate_sample_interval_ms: default_rate_sample_interval(),
            settle_delay_secs: default_settle_delay(),
            pool_size: default_pool_size(),
        }
    }
}

impl Default for AsicConfig {
    fn default() -> Self {
        Self {
            counter_command: default_counter_command(),
            max_faulty_lane_instance: default_max_faulty_lane_instance(),
        }
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            factory_reset_command: default_factory_reset_command(),
            reboot_command: default_reboot_command(),
        }
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            interfaces: InterfaceConfig::default(),
            probe: ProbeConfig::default(),
            asic: AsicConfig::default(),
            recovery: RecoveryConfig::default(),
            counter_file: default_counter_file(),
        }
    }
}

impl HealthCheckConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => {
                let config: Self = toml::from_str(&content).map_err(|e| {
                    HealthError::configuration(format!(
                        "Failed to parse config file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                config.validate()?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %path.display(),
                    "Config file not found, using defaults"
                );
                Ok(Self::default())
            }
            Err(e) => Err(HealthError::Io(e)),
        }
    }

    /// Load from default location or defaults
    pub fn load() -> Result<Self> {
        Self::load_or_default("/etc/linkhealth/linkhealthd.conf")
    }

    /// Returns the interface ids for the configured range, in order.
    pub fn interface_names(&self) -> Vec<InterfaceId> {
        (self.interfaces.first_ordinal..=self.interfaces.last_ordinal)
            .map(|ordinal| InterfaceId::new(&self.interfaces.name_prefix, ordinal))
            .collect()
    }

    /// Get the pause between rate readings as Duration
    pub fn rate_sample_interval(&self) -> Duration {
        Duration::from_millis(self.probe.rate_sample_interval_ms)
    }

    /// Get the pre-scan settling delay as Duration
    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.probe.settle_delay_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.interfaces.name_prefix.is_empty() {
            return Err(HealthError::configuration(
                "interfaces.name_prefix must not be empty",
            ));
        }

        if self.interfaces.first_ordinal > self.interfaces.last_ordinal {
            return Err(HealthError::configuration(format!(
                "interface range is inverted: {}..={}",
                self.interfaces.first_ordinal, self.interfaces.last_ordinal
            )));
        }

        if self.probe.pool_size == 0 {
            return Err(HealthError::configuration("probe.pool_size must be > 0"));
        }

        if self.probe.rate_sample_count == 0 {
            return Err(HealthError::configuration(
                "probe.rate_sample_count must be > 0",
            ));
        }

        if self.counter_file.is_empty() {
            return Err(HealthError::configuration("counter_file must not be empty"));
        }

        Ok(())
    }
}
