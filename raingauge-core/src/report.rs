use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::aggregate::{ConfigKey, ConfigStats, SampleStats};
use crate::summary::TrackSummary;
use crate::validate::{TrackValidation, validate};

/// Header for the fixed-width per-track results table.
pub fn results_header() -> String {
    format!(
        "{:<20} {:<10} {:<10} {:<10} {:<10} {:<10} {:<10} {:<10} {:<10} {:<10} {:<6} (note)",
        "track",
        "eff-ops/s",
        "ltl-ops/s",
        "eff-reqs/s",
        "%ovh-ops",
        "avg-resp(s)",
        "avg-users",
        "succeeded",
        "failed",
        "%failed",
        "passed"
    )
}

/// One table row for a validated summary. Rates and percentages carry four
/// decimal places, counts render as plain integers.
pub fn format_summary_row(summary: &TrackSummary, validation: &TrackValidation) -> String {
    let note = validation
        .note()
        .unwrap_or_else(|| summary.validation_note.clone());
    let passed = if validation.is_acceptable() {
        "OK"
    } else {
        "FAIL"
    };

    format!(
        "{:<20} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10} {:>10} {:>10.4} {:<6} ({note})",
        summary.name,
        summary.effective_load_ops_per_sec,
        summary.littles_estimate_ops_per_sec,
        summary.effective_load_reqs_per_sec,
        validation.pct_overhead_ops,
        summary.average_op_response_time_sec,
        summary.average_users,
        summary.operations_successful,
        summary.operations_failed,
        validation.pct_ops_failed,
        passed,
    )
}

/// Header plus one row per record; each record is validated against its own
/// embedded thresholds.
pub fn render_results_table(summaries: &[TrackSummary]) -> String {
    let mut out = String::new();
    writeln!(&mut out, "{}", results_header()).ok();
    for summary in summaries {
        let validation = validate(summary);
        writeln!(&mut out, "{}", format_summary_row(summary, &validation)).ok();
    }
    out
}

/// CSV column header for a sweep over the given tracked operations.
/// Columns group by statistic (avg, 90th, 99th), then by operation.
pub fn sweep_csv_header(ops: &[String]) -> String {
    let mut cols: Vec<String> = vec![
        "size".to_string(),
        "#users".to_string(),
        "avg_tput".to_string(),
        "tput_95conf".to_string(),
        "avg_resp(s)".to_string(),
        "resp_95conf".to_string(),
    ];

    for op in ops {
        let op = op.to_lowercase();
        cols.push(format!("avg_{op}(s)"));
        cols.push(format!("{op}_95conf"));
    }
    for op in ops {
        let op = op.to_lowercase();
        cols.push(format!("90th_{op}(s)"));
        cols.push(format!("90th_{op}_95conf"));
    }
    for op in ops {
        let op = op.to_lowercase();
        cols.push(format!("99th_{op}(s)"));
        cols.push(format!("99th_{op}_95conf"));
    }

    cols.join(",")
}

fn stat_cells(stat: Option<SampleStats>, cells: &mut Vec<String>) {
    match stat {
        Some(s) => {
            cells.push(s.mean.to_string());
            cells.push(s.ci95_half_width.to_string());
        }
        None => {
            cells.push("n/a".to_string());
            cells.push("n/a".to_string());
        }
    }
}

/// One CSV row per configuration; configurations with no surviving runs
/// render `n/a` in every statistic cell.
pub fn format_sweep_csv_row(key: ConfigKey, stats: &ConfigStats, ops: &[String]) -> String {
    let mut cells = vec![key.size.to_string(), key.users.to_string()];

    stat_cells(stats.throughput, &mut cells);
    stat_cells(stats.response_time, &mut cells);

    for op in ops {
        stat_cells(stats.per_op.get(op).and_then(|o| o.avg), &mut cells);
    }
    for op in ops {
        stat_cells(stats.per_op.get(op).and_then(|o| o.p90), &mut cells);
    }
    for op in ops {
        stat_cells(stats.per_op.get(op).and_then(|o| o.p99), &mut cells);
    }

    cells.join(",")
}

pub fn render_sweep_csv(stats: &BTreeMap<ConfigKey, ConfigStats>, ops: &[String]) -> String {
    let mut out = String::new();
    writeln!(&mut out, "{}", sweep_csv_header(ops)).ok();
    for (key, config) in stats {
        writeln!(&mut out, "{}", format_sweep_csv_row(*key, config, ops)).ok();
    }
    out
}
