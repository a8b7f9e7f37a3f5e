use std::fmt;

use crate::summary::TrackSummary;

/// One distinct reason a summary failed (or was flagged during) validation.
///
/// `NoTrafficObserved` is a flagged condition, not a failure: a window with
/// zero operations validates with a 0% failure rate.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationFlag {
    OverheadAboveThreshold { threshold_pct: f64 },
    NoTrafficObserved,
    FailureRateAboveThreshold { threshold_pct: f64 },
    ResponseTimeTargetsMissed { ops: Vec<String> },
}

impl fmt::Display for ValidationFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverheadAboveThreshold { threshold_pct } => {
                write!(f, "little's law overhead > {threshold_pct}%")
            }
            Self::NoTrafficObserved => write!(f, "slept through steady state"),
            Self::FailureRateAboveThreshold { threshold_pct } => {
                write!(f, "pct ops failed > {threshold_pct}%")
            }
            Self::ResponseTimeTargetsMissed { .. } => {
                write!(f, "response time target(s) not met")
            }
        }
    }
}

/// Outcome of validating one track summary against its embedded thresholds.
#[derive(Debug, Clone)]
pub struct TrackValidation {
    pub track_name: String,

    pub pct_overhead_ops: f64,
    pub pct_overhead_ops_acceptable: bool,

    pub pct_ops_failed: f64,
    pub pct_failed_ops_acceptable: bool,

    pub op_response_time_targets_met: bool,

    /// Every flag raised, in check order (overhead, traffic, failure rate,
    /// response-time targets).
    pub flags: Vec<ValidationFlag>,
}

impl TrackValidation {
    pub fn is_acceptable(&self) -> bool {
        self.pct_overhead_ops_acceptable
            && self.pct_failed_ops_acceptable
            && self.op_response_time_targets_met
    }

    /// Single-line note for reports: the last flag raised wins, matching
    /// the legacy overwrite behavior. `None` when nothing was flagged.
    pub fn note(&self) -> Option<String> {
        self.flags.last().map(ToString::to_string)
    }
}

/// Classify a summary as acceptable or not against its thresholds.
///
/// Overhead: gap between the Little's-Law estimate and the effective load,
/// as a percentage of the estimate. A zero (or negative) estimate makes the
/// overhead check unconditionally acceptable; interval records always take
/// this branch since the scoreboard reports no estimate per interval.
pub fn validate(summary: &TrackSummary) -> TrackValidation {
    let mut flags = Vec::new();

    let mut pct_overhead_ops = 0.0;
    let overhead_acceptable = if summary.littles_estimate_ops_per_sec > 0.0 {
        pct_overhead_ops = (summary.littles_estimate_ops_per_sec
            - summary.effective_load_ops_per_sec)
            / summary.littles_estimate_ops_per_sec
            * 100.0;

        if pct_overhead_ops <= summary.pct_overhead_ops_threshold {
            true
        } else {
            flags.push(ValidationFlag::OverheadAboveThreshold {
                threshold_pct: summary.pct_overhead_ops_threshold,
            });
            false
        }
    } else {
        true
    };

    let total_ops = summary.total_operations();
    let pct_ops_failed = if total_ops > 0 {
        summary.operations_failed as f64 / total_ops as f64 * 100.0
    } else {
        flags.push(ValidationFlag::NoTrafficObserved);
        0.0
    };

    let failed_acceptable = if pct_ops_failed <= summary.pct_failed_ops_threshold {
        true
    } else {
        flags.push(ValidationFlag::FailureRateAboveThreshold {
            threshold_pct: summary.pct_failed_ops_threshold,
        });
        false
    };

    let mut missed_ops: Vec<String> = Vec::new();
    for (op, target) in &summary.op_response_time_thresholds {
        if let Some(observed) = summary.op_response_times.get(op)
            && (observed.p90 > target.p90 || observed.p99 > target.p99)
        {
            missed_ops.push(op.clone());
        }
    }
    let targets_met = missed_ops.is_empty();
    if !targets_met {
        flags.push(ValidationFlag::ResponseTimeTargetsMissed { ops: missed_ops });
    }

    TrackValidation {
        track_name: summary.name.clone(),
        pct_overhead_ops,
        pct_overhead_ops_acceptable: overhead_acceptable,
        pct_ops_failed,
        pct_failed_ops_acceptable: failed_acceptable,
        op_response_time_targets_met: targets_met,
        flags,
    }
}
