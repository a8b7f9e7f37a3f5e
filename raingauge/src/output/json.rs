use std::collections::BTreeMap;

use serde::Serialize;

use super::OutputFormatter;

use raingauge_core::{TrackSummary, validate};

pub(crate) struct JsonOutput;

impl OutputFormatter for JsonOutput {
    fn print_report(&self, summaries: &[TrackSummary]) -> anyhow::Result<()> {
        let records: Vec<JsonTrackRecord> = summaries.iter().map(build_record).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonTrackRecord {
    pub name: String,

    pub offered_load_ops_per_sec: f64,
    pub effective_load_ops_per_sec: f64,
    pub littles_estimate_ops_per_sec: f64,
    pub effective_load_reqs_per_sec: f64,

    pub operations_successful: u64,
    pub operations_failed: u64,

    pub average_op_response_time_sec: f64,
    pub average_users: f64,

    pub op_response_times: BTreeMap<String, JsonOpResponseTimes>,
    pub op_proportions: BTreeMap<String, f64>,

    pub validation: JsonValidation,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonOpResponseTimes {
    pub p90: f64,
    pub p99: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonValidation {
    pub pct_overhead_ops: f64,
    pub pct_overhead_ops_acceptable: bool,
    pub pct_ops_failed: f64,
    pub pct_failed_ops_acceptable: bool,
    pub op_response_time_targets_met: bool,
    pub acceptable: bool,
    pub flags: Vec<String>,
    pub note: String,
}

fn build_record(summary: &TrackSummary) -> JsonTrackRecord {
    let validation = validate(summary);

    JsonTrackRecord {
        name: summary.name.clone(),
        offered_load_ops_per_sec: summary.offered_load_ops_per_sec,
        effective_load_ops_per_sec: summary.effective_load_ops_per_sec,
        littles_estimate_ops_per_sec: summary.littles_estimate_ops_per_sec,
        effective_load_reqs_per_sec: summary.effective_load_reqs_per_sec,
        operations_successful: summary.operations_successful,
        operations_failed: summary.operations_failed,
        average_op_response_time_sec: summary.average_op_response_time_sec,
        average_users: summary.average_users,
        op_response_times: summary
            .op_response_times
            .iter()
            .map(|(op, t)| {
                (
                    op.clone(),
                    JsonOpResponseTimes {
                        p90: t.p90,
                        p99: t.p99,
                        avg: t.avg,
                        min: t.min,
                        max: t.max,
                    },
                )
            })
            .collect(),
        op_proportions: summary.op_proportions.clone(),
        validation: JsonValidation {
            pct_overhead_ops: validation.pct_overhead_ops,
            pct_overhead_ops_acceptable: validation.pct_overhead_ops_acceptable,
            pct_ops_failed: validation.pct_ops_failed,
            pct_failed_ops_acceptable: validation.pct_failed_ops_acceptable,
            op_response_time_targets_met: validation.op_response_time_targets_met,
            acceptable: validation.is_acceptable(),
            flags: validation.flags.iter().map(ToString::to_string).collect(),
            note: validation
                .note()
                .unwrap_or_else(|| summary.validation_note.clone()),
        },
    }
}
