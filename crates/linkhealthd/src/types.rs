//! Type definitions for linkhealthd.

/// Identifier of one physical front-panel interface.
///
/// Derived from the configured name prefix and ordinal, e.g.
/// `Ethernet1/5`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterfaceId(String);

impl InterfaceId {
    /// Creates an interface id from prefix and ordinal.
    pub fn new(prefix: &str, ordinal: u32) -> Self {
        Self(format!("{}{}", prefix, ordinal))
    }

    /// Returns the interface name as used in device commands.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one hardware MAC lane instance, e.g. `M2,0-25G`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LaneId(String);

impl LaneId {
    /// Creates a lane id from its table label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Returns the lane label as printed in the counter table.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LaneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One probing pass over a single interface.
///
/// `rate_samples` preserves query order; `None` marks a query that
/// failed or whose output could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSample {
    /// Whether a discovery-protocol neighbor entry was found.
    pub has_neighbor_entry: bool,
    /// Input-rate readings in bits per second, in query order.
    pub rate_samples: Vec<Option<u64>>,
}

impl ProbeSample {
    /// Applies the interface-down verdict rule.
    ///
    /// Down iff there is no neighbor entry AND at least one rate sample
    /// was successfully read AND every read sample equals zero. A run of
    /// failed reads alone must not mark an interface down.
    pub fn is_down(&self) -> bool {
        if self.has_neighbor_entry {
            return false;
        }
        let mut read_any = false;
        for sample in self.rate_samples.iter().flatten() {
            read_any = true;
            if *sample != 0 {
                return false;
            }
        }
        read_any
    }
}

/// Lanes flagged in one ASIC counter report.
///
/// Duplicates are collapsed; discovery order is preserved for
/// reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneFaultReport {
    /// In-scope lanes with a bad-preamble count.
    pub lanes: Vec<LaneId>,
}

impl LaneFaultReport {
    /// Returns true if any in-scope lane was flagged.
    pub fn any_fault(&self) -> bool {
        !self.lanes.is_empty()
    }
}

/// Aggregate of one full health-check pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// True if any interface met the down verdict.
    pub any_interface_down: bool,
    /// In-scope lanes flagged by the counter table.
    pub faulty_lanes: Vec<LaneId>,
}

impl ScanResult {
    /// Returns true if the pass found no issue at all.
    pub fn healthy(&self) -> bool {
        !self.any_interface_down && self.faulty_lanes.is_empty()
    }
}
