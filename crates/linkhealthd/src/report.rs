//! Report parsers for raw device command output.
//!
//! Three independent extraction routines, all pure and all tolerant of
//! missing structure: absent fields and missing table rows are expected
//! readings (transient timing, idle hardware), never errors. The only
//! way these routines influence the verdict is through the structured
//! values they return.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{LaneFaultReport, LaneId};

/// Input-rate field as printed by `show interface`.
static INPUT_RATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"input rate (\d+) bps").expect("Invalid regex pattern"));

/// Lane-instance label as printed in the counter table header,
/// e.g. `M2,0-25G` or `M12,0-50Gx2`.
static LANE_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"M\d+,\d+-\d+Gx?\d*").expect("Invalid regex pattern"));

/// Marker that opens one neighbor block in `show cdp neighbors ... detail`.
const NEIGHBOR_BLOCK_MARKER: &str = "Device ID:";

/// Header label that opens the lane-instance row of the counter table.
const COUNTER_HEADER_MARKER: &str = "REG_NAME";

/// Row label of the bad-preamble error counter.
const FAULT_ROW_MARKER: &str = "90-Rx Bad Preamble";

/// Placeholder printed for a counter with no recorded events.
const NO_DATA_SENTINEL: &str = "....";

/// Extracts the second `input rate N bps` occurrence from a
/// `show interface` response.
///
/// The device prints a short-window rate followed by the settled rate;
/// the second occurrence is the current sample. Fewer than two
/// occurrences means the reading is simply unavailable this pass.
pub fn second_input_rate(output: &str) -> Option<u64> {
    let mut matches = INPUT_RATE_RE.captures_iter(output);
    matches.next()?;
    let second = matches.next()?;
    second[1].parse().ok()
}

/// Checks a `show cdp neighbors interface <iface> detail` response for
/// a neighbor entry on the queried interface.
///
/// A positive entry is a `Device ID:` block whose body references the
/// queried interface as the local end of the adjacency. Output with no
/// such block is a legitimate negative reading.
pub fn has_neighbor_entry(output: &str, interface: &str) -> bool {
    let needle = format!("Interface: {}, Port ID (outgoing port):", interface);

    let mut rest = output;
    while let Some(start) = rest.find(NEIGHBOR_BLOCK_MARKER) {
        let block_body = &rest[start + NEIGHBOR_BLOCK_MARKER.len()..];
        let block = match block_body.find(NEIGHBOR_BLOCK_MARKER) {
            Some(end) => &block_body[..end],
            None => block_body,
        };
        if block.contains(&needle) {
            return true;
        }
        rest = block_body;
    }
    false
}

/// Parses the ASIC error-counter table for bad-preamble lane faults.
///
/// The table carries a `REG_NAME` header enumerating lane-instance
/// labels and one data row per error type; values align positionally
/// with the header labels. A value is faulty if it is not the `....`
/// placeholder, and counts only when its lane instance number is within
/// `0..=max_instance`. Missing header or data row yields an empty
/// report.
pub fn parse_lane_faults(output: &str, max_instance: u32) -> LaneFaultReport {
    let mut labels: Vec<&str> = Vec::new();
    let mut report = LaneFaultReport::default();

    for line in output.lines() {
        if line.trim_start().starts_with(COUNTER_HEADER_MARKER) {
            labels = LANE_LABEL_RE.find_iter(line).map(|m| m.as_str()).collect();
        } else if line.contains(FAULT_ROW_MARKER) {
            // The row label is three whitespace-separated tokens
            // ("90-Rx", "Bad", "Preamble"); everything after aligns
            // with the header labels.
            let values = line.split_whitespace().skip(3);
            for (label, value) in labels.iter().zip(values) {
                if value == NO_DATA_SENTINEL {
                    continue;
                }
                let in_scope = lane_instance(label).is_some_and(|n| n <= max_instance);
                if !in_scope {
                    tracing::debug!(lane = %label, "Flagged lane outside fault scope, ignoring");
                    continue;
                }
                let lane = LaneId::new(*label);
                if !report.lanes.contains(&lane) {
                    report.lanes.push(lane);
                }
            }
        }
    }

    report
}

/// Extracts the instance number from a lane label like `M2,0-25G`.
fn lane_instance(label: &str) -> Option<u32> {
    label
        .strip_prefix('M')?
        .split(',')
        .next()?
        .parse()
        .ok()
}
