use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;

use raingauge_core::{OpThreshold, TrackSummary};

/// Service-level thresholds applied to every parsed record before
/// validation. Absent fields keep the record defaults (5.0 / 5.0, no
/// per-operation targets).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ThresholdsFile {
    /// Maximum acceptable Little's-Law overhead, percent.
    #[serde(default)]
    pub overhead_pct: Option<f64>,

    /// Maximum acceptable failed-operation rate, percent.
    #[serde(default)]
    pub failed_pct: Option<f64>,

    /// Per-operation 90th/99th percentile response-time targets, seconds.
    #[serde(default)]
    pub operations: BTreeMap<String, OpTargets>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpTargets {
    pub p90: f64,
    pub p99: f64,
}

impl ThresholdsFile {
    /// Load a thresholds file. `.json` parses as JSON, everything else as
    /// YAML (JSON being valid YAML, the extension check is a formality).
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read thresholds file {}", path.display()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&text)
                .with_context(|| format!("parse thresholds file {}", path.display()))
        } else {
            serde_yaml::from_str(&text)
                .with_context(|| format!("parse thresholds file {}", path.display()))
        }
    }

    pub fn apply(&self, summary: &mut TrackSummary) {
        if let Some(pct) = self.overhead_pct {
            summary.pct_overhead_ops_threshold = pct;
        }
        if let Some(pct) = self.failed_pct {
            summary.pct_failed_ops_threshold = pct;
        }
        for (op, targets) in &self.operations {
            summary.op_response_time_thresholds.insert(
                op.clone(),
                OpThreshold {
                    p90: targets.p90,
                    p99: targets.p99,
                },
            );
        }
    }
}
