use std::collections::BTreeMap;

/// Response-time statistics for a single operation, in seconds.
///
/// The scoreboard table reports these per operation; `p90`/`p99` are the
/// percentiles the validation thresholds are checked against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpResponseTimes {
    pub p90: f64,
    pub p99: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

/// Percentile targets for one operation, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpThreshold {
    pub p90: f64,
    pub p99: f64,
}

/// Summary results for one load track (or one interval within a track).
///
/// Produced by the parser in a single pass over the log text; callers may
/// adjust the threshold fields before validation, but the measured fields
/// are never mutated after parsing.
#[derive(Debug, Clone)]
pub struct TrackSummary {
    /// Track name, or `"<track>-<interval>"` for interval records.
    pub name: String,

    pub offered_load_ops_per_sec: f64,
    pub effective_load_ops_per_sec: f64,
    /// Theoretical throughput baseline; 0.0 for interval records (the
    /// scoreboard only reports it in the final block).
    pub littles_estimate_ops_per_sec: f64,
    pub effective_load_reqs_per_sec: f64,

    pub operations_successful: u64,
    pub operations_failed: u64,

    pub average_op_response_time_sec: f64,
    pub average_users: f64,

    /// Per-operation response-time statistics, keyed by operation name.
    /// Shares its key set with `op_proportions`.
    pub op_response_times: BTreeMap<String, OpResponseTimes>,
    /// Fraction in [0, 1] of total operations attributable to each op.
    pub op_proportions: BTreeMap<String, f64>,

    /// Validation thresholds. Defaults 5.0 / 5.0; drivers commonly relax
    /// the overhead threshold to 10.0.
    pub pct_overhead_ops_threshold: f64,
    pub pct_failed_ops_threshold: f64,
    /// Only operations present here are checked against their targets.
    pub op_response_time_thresholds: BTreeMap<String, OpThreshold>,

    pub validation_note: String,
}

impl TrackSummary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            offered_load_ops_per_sec: 0.0,
            effective_load_ops_per_sec: 0.0,
            littles_estimate_ops_per_sec: 0.0,
            effective_load_reqs_per_sec: 0.0,
            operations_successful: 0,
            operations_failed: 0,
            average_op_response_time_sec: 0.0,
            average_users: 0.0,
            op_response_times: BTreeMap::new(),
            op_proportions: BTreeMap::new(),
            pct_overhead_ops_threshold: 5.0,
            pct_failed_ops_threshold: 5.0,
            op_response_time_thresholds: BTreeMap::new(),
            validation_note: "n/a".to_string(),
        }
    }

    pub fn total_operations(&self) -> u64 {
        self.operations_successful
            .saturating_add(self.operations_failed)
    }
}
