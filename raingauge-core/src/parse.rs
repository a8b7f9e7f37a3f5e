use std::str::FromStr;

use crate::error::ParseError;
use crate::summary::{OpResponseTimes, TrackSummary};

/// Labeled scalar metrics the scoreboard reports.
///
/// The serialized form is the exact label text the benchmark engine prints;
/// lines with any other label are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
pub enum MetricLabel {
    #[strum(serialize = "Offered load (ops/sec)")]
    OfferedLoadOps,
    #[strum(serialize = "Effective load (ops/sec)")]
    EffectiveLoadOps,
    #[strum(serialize = "Little's Law Estimate (ops/sec)")]
    LittlesEstimateOps,
    #[strum(serialize = "Effective load (requests/sec)")]
    EffectiveLoadReqs,
    #[strum(serialize = "Operations successfully completed")]
    OpsSuccessful,
    #[strum(serialize = "Operations failed")]
    OpsFailed,
    #[strum(serialize = "Average operation response time (s)")]
    AvgOpResponseTime,
    #[strum(serialize = "Average number of users")]
    AverageUsers,
    #[strum(serialize = "Active users")]
    ActiveUsers,
}

/// Everything extracted from one log text: the records that parsed plus the
/// per-track failures. A malformed track reduces `summaries` without
/// touching the other tracks.
#[derive(Debug, Default)]
pub struct ParseReport {
    pub summaries: Vec<TrackSummary>,
    pub failures: Vec<ParseError>,
}

/// One classified line of log text. Pass 1 of the scan produces these;
/// pass 2 folds them into records, so no patterns are ever built from
/// track names (names with regex metacharacters are fine, names containing
/// `]` are not expressible in the marker grammar).
#[derive(Debug, Clone, Copy)]
enum Token<'a> {
    TrackStart {
        track: &'a str,
    },
    FinalResults {
        track: &'a str,
    },
    IntervalName {
        track: &'a str,
        interval: &'a str,
    },
    Metric {
        track: &'a str,
        label: MetricLabel,
        raw: &'a str,
        value: f64,
    },
    OpRow {
        track: &'a str,
        op: &'a str,
        proportion: f64,
        stats: OpResponseTimes,
    },
}

/// Parse final-results records: one summary per track that reached its
/// `Final results` marker. Tracks that started but never printed final
/// results yield no record; tracks whose final block is missing a required
/// metric yield a failure instead of a record.
pub fn parse_output(output: &str) -> ParseReport {
    let tokens = tokenize(output);
    let mut report = ParseReport::default();

    for track in discover_tracks(&tokens) {
        let Some(anchor) = final_results_anchor(&tokens, track) else {
            continue;
        };

        match fold_final(track, &tokens, anchor) {
            Ok(summary) => report.summaries.push(summary),
            Err(err) => report.failures.push(err),
        }
    }

    report
}

/// Parse interval records: one summary per `Interval name` declaration,
/// named `"<track>-<interval>"`, in declaration order. Operation rows are
/// attributed to an interval only if they appear before the next interval
/// marker (or the final-results marker after the last interval).
pub fn parse_interval_output(output: &str) -> ParseReport {
    let tokens = tokenize(output);
    let mut report = ParseReport::default();

    for track in discover_tracks(&tokens) {
        let final_anchor = final_results_anchor(&tokens, track);

        let marks: Vec<(usize, &str)> = tokens
            .iter()
            .enumerate()
            .filter_map(|(idx, t)| match t {
                Token::IntervalName {
                    track: tr,
                    interval,
                } if *tr == track => Some((idx, *interval)),
                _ => None,
            })
            .collect();

        for (i, (start, interval)) in marks.iter().enumerate() {
            let end = marks
                .get(i + 1)
                .map(|(idx, _)| *idx)
                .or(final_anchor)
                .unwrap_or(tokens.len());

            match fold_interval(track, interval, &tokens, *start, end) {
                Ok(summary) => report.summaries.push(summary),
                Err(err) => report.failures.push(err),
            }
        }
    }

    report
}

fn tokenize(output: &str) -> Vec<Token<'_>> {
    output.lines().filter_map(classify).collect()
}

fn classify(line: &str) -> Option<Token<'_>> {
    if let Some(rest) = line.strip_prefix("[TRACK: ") {
        let (track, rest) = rest.split_once(']')?;
        rest.strip_prefix(" starting load scheduler")?;
        return Some(Token::TrackStart { track });
    }

    let rest = line.strip_prefix("[SCOREBOARD TRACK: ")?;
    let (track, rest) = rest.split_once(']')?;

    // Operation table rows follow the tag with no separating space.
    if rest.starts_with('|') {
        return classify_op_row(track, rest);
    }

    let rest = rest.strip_prefix(' ')?;

    // Section markers are padded with dashes up to the colon.
    if rest.starts_with("Final results") {
        return Some(Token::FinalResults { track });
    }
    if let Some(tail) = rest.strip_prefix("Interval name") {
        let (_, interval) = tail.split_once(':')?;
        return Some(Token::IntervalName {
            track,
            interval: interval.trim(),
        });
    }

    let (label, value) = rest.split_once(':')?;
    let label = MetricLabel::from_str(label.trim()).ok()?;
    let raw = value.trim();
    let value = raw.parse::<f64>().ok()?;

    Some(Token::Metric {
        track,
        label,
        raw,
        value,
    })
}

/// Cells after splitting on `|`:
/// `["", name, pct%, successes, failures, avg, min, max, 90th, 99th, samples…]`.
/// Header rows fail the numeric-cell checks and fall through as noise.
fn classify_op_row<'a>(track: &'a str, rest: &'a str) -> Option<Token<'a>> {
    let mut cells = rest.split('|');
    let _ = cells.next();

    let op = cells.next()?.trim();
    if op.is_empty() {
        return None;
    }

    let pct = numeric_cell(cells.next()?.trim_end().strip_suffix('%')?)?;
    let _successes = numeric_cell(cells.next()?)?;
    let _failures = numeric_cell(cells.next()?)?;
    let avg = numeric_cell(cells.next()?)?;
    let min = numeric_cell(cells.next()?)?;
    let max = numeric_cell(cells.next()?)?;
    let p90 = numeric_cell(cells.next()?)?;
    let p99 = numeric_cell(cells.next()?)?;

    Some(Token::OpRow {
        track,
        op,
        proportion: pct / 100.0,
        stats: OpResponseTimes {
            p90,
            p99,
            avg,
            min,
            max,
        },
    })
}

fn numeric_cell(cell: &str) -> Option<f64> {
    let v = cell.trim();
    if v.is_empty() { None } else { v.parse().ok() }
}

/// Track discovery order, first start marker wins; duplicate start markers
/// for the same name collapse to one discovery.
fn discover_tracks<'a>(tokens: &[Token<'a>]) -> Vec<&'a str> {
    let mut tracks: Vec<&str> = Vec::new();
    for t in tokens {
        if let Token::TrackStart { track } = t
            && !tracks.contains(track)
        {
            tracks.push(*track);
        }
    }
    tracks
}

fn final_results_anchor(tokens: &[Token<'_>], track: &str) -> Option<usize> {
    tokens.iter().position(|t| match t {
        Token::FinalResults { track: tr } => *tr == track,
        _ => false,
    })
}

fn fold_final(track: &str, tokens: &[Token<'_>], anchor: usize) -> Result<TrackSummary, ParseError> {
    let missing = |label| ParseError::MissingFinalMetric {
        track: track.to_string(),
        label,
    };

    let mut summary = TrackSummary::new(track);
    summary.offered_load_ops_per_sec = rate_after(tokens, anchor, track, MetricLabel::OfferedLoadOps)
        .ok_or_else(|| missing(MetricLabel::OfferedLoadOps))?;
    summary.effective_load_ops_per_sec =
        rate_after(tokens, anchor, track, MetricLabel::EffectiveLoadOps)
            .ok_or_else(|| missing(MetricLabel::EffectiveLoadOps))?;
    summary.littles_estimate_ops_per_sec =
        rate_after(tokens, anchor, track, MetricLabel::LittlesEstimateOps)
            .ok_or_else(|| missing(MetricLabel::LittlesEstimateOps))?;
    summary.effective_load_reqs_per_sec =
        rate_after(tokens, anchor, track, MetricLabel::EffectiveLoadReqs)
            .ok_or_else(|| missing(MetricLabel::EffectiveLoadReqs))?;
    summary.operations_successful =
        count_after(tokens, anchor, track, MetricLabel::OpsSuccessful, &missing)?;
    summary.operations_failed =
        count_after(tokens, anchor, track, MetricLabel::OpsFailed, &missing)?;
    summary.average_op_response_time_sec =
        rate_after(tokens, anchor, track, MetricLabel::AvgOpResponseTime)
            .ok_or_else(|| missing(MetricLabel::AvgOpResponseTime))?;
    summary.average_users = rate_after(tokens, anchor, track, MetricLabel::AverageUsers)
        .ok_or_else(|| missing(MetricLabel::AverageUsers))?;

    collect_op_rows(&mut summary, track, &tokens[anchor..]);

    Ok(summary)
}

fn fold_interval(
    track: &str,
    interval: &str,
    tokens: &[Token<'_>],
    start: usize,
    end: usize,
) -> Result<TrackSummary, ParseError> {
    let missing = |label| ParseError::MissingIntervalMetric {
        track: track.to_string(),
        interval: interval.to_string(),
        label,
    };

    let mut summary = TrackSummary::new(format!("{track}-{interval}"));
    summary.offered_load_ops_per_sec = rate_after(tokens, start, track, MetricLabel::OfferedLoadOps)
        .ok_or_else(|| missing(MetricLabel::OfferedLoadOps))?;
    summary.effective_load_ops_per_sec =
        rate_after(tokens, start, track, MetricLabel::EffectiveLoadOps)
            .ok_or_else(|| missing(MetricLabel::EffectiveLoadOps))?;
    summary.effective_load_reqs_per_sec =
        rate_after(tokens, start, track, MetricLabel::EffectiveLoadReqs)
            .ok_or_else(|| missing(MetricLabel::EffectiveLoadReqs))?;
    summary.operations_successful =
        count_after(tokens, start, track, MetricLabel::OpsSuccessful, &missing)?;
    summary.operations_failed = count_after(tokens, start, track, MetricLabel::OpsFailed, &missing)?;
    summary.average_op_response_time_sec =
        rate_after(tokens, start, track, MetricLabel::AvgOpResponseTime)
            .ok_or_else(|| missing(MetricLabel::AvgOpResponseTime))?;
    summary.average_users = rate_after(tokens, start, track, MetricLabel::ActiveUsers)
        .ok_or_else(|| missing(MetricLabel::ActiveUsers))?;

    // The scoreboard reports no Little's-Law estimate per interval; the
    // estimate stays 0.0 so overhead validation passes unconditionally.

    collect_op_rows(&mut summary, track, &tokens[start..end]);

    Ok(summary)
}

fn collect_op_rows(summary: &mut TrackSummary, track: &str, window: &[Token<'_>]) {
    for token in window {
        if let Token::OpRow {
            track: tr,
            op,
            proportion,
            stats,
        } = token
            && *tr == track
        {
            summary.op_response_times.insert(op.to_string(), *stats);
            summary.op_proportions.insert(op.to_string(), *proportion);
        }
    }
}

fn metric_after<'a>(
    tokens: &'a [Token<'_>],
    from: usize,
    track: &str,
    label: MetricLabel,
) -> Option<(&'a str, f64)> {
    tokens[from..].iter().find_map(|t| match t {
        Token::Metric {
            track: tr,
            label: l,
            raw,
            value,
        } if *tr == track && *l == label => Some((*raw, *value)),
        _ => None,
    })
}

fn rate_after(tokens: &[Token<'_>], from: usize, track: &str, label: MetricLabel) -> Option<f64> {
    metric_after(tokens, from, track, label).map(|(_, value)| value)
}

fn count_after(
    tokens: &[Token<'_>],
    from: usize,
    track: &str,
    label: MetricLabel,
    missing: impl Fn(MetricLabel) -> ParseError,
) -> Result<u64, ParseError> {
    let (raw, _) = metric_after(tokens, from, track, label).ok_or_else(|| missing(label))?;
    raw.parse::<u64>().map_err(|_| ParseError::NonIntegerCount {
        track: track.to_string(),
        label,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn final_block(track: &str) -> String {
        format!(
            "[SCOREBOARD TRACK: {track}] Final results----------------------: \n\
             [SCOREBOARD TRACK: {track}] Average number of users            : 50.0000\n\
             [SCOREBOARD TRACK: {track}] Offered load (ops/sec)             : 100.0000\n\
             [SCOREBOARD TRACK: {track}] Effective load (ops/sec)           : 95.0000\n\
             [SCOREBOARD TRACK: {track}] Little's Law Estimate (ops/sec)    : 100.0000\n\
             [SCOREBOARD TRACK: {track}] Effective load (requests/sec)      : 95.0000\n\
             [SCOREBOARD TRACK: {track}] Operations initiated               : 10000\n\
             [SCOREBOARD TRACK: {track}] Operations successfully completed  : 9500\n\
             [SCOREBOARD TRACK: {track}] Average operation response time (s): 0.0500\n\
             [SCOREBOARD TRACK: {track}] Operations late                    : 0\n\
             [SCOREBOARD TRACK: {track}] Operations failed                  : 500\n\
             [SCOREBOARD TRACK: {track}]|           operation|proportion| successes|  failures|avg response|min response|max response|  90th (s)|  99th (s)|    pctile|\n\
             [SCOREBOARD TRACK: {track}]|                    |          |          |          |    time (s)|    time (s)|     time(s)|          |          |   samples|\n\
             [SCOREBOARD TRACK: {track}]|                 Get|  100.0000% |      9500|       500|      0.0400|      0.0100|      0.2000|    0.0800|    0.1500| 9500/10000 (mu: 0.0400, sd: 0.0100 t: 1.0000)|\n"
        )
    }

    fn sample_log(track: &str) -> String {
        format!(
            "[TRACK: {track}] starting load scheduler\n\
             some unrelated engine chatter\n\
             {}",
            final_block(track)
        )
    }

    #[test]
    fn no_track_markers_yields_empty_report() {
        let report = parse_output("nothing to see here\njust noise\n");
        assert!(report.summaries.is_empty());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn final_results_round_trip_exact_literals() {
        let report = parse_output(&sample_log("Foo"));
        assert!(report.failures.is_empty());
        assert_eq!(report.summaries.len(), 1);

        let s = &report.summaries[0];
        assert_eq!(s.name, "Foo");
        assert_eq!(s.offered_load_ops_per_sec, 100.0);
        assert_eq!(s.effective_load_ops_per_sec, 95.0);
        assert_eq!(s.littles_estimate_ops_per_sec, 100.0);
        assert_eq!(s.effective_load_reqs_per_sec, 95.0);
        assert_eq!(s.operations_successful, 9500);
        assert_eq!(s.operations_failed, 500);
        assert_eq!(s.average_op_response_time_sec, 0.05);
        assert_eq!(s.average_users, 50.0);
    }

    #[test]
    fn operation_rows_are_named_records_with_proportion() {
        let report = parse_output(&sample_log("Foo"));
        let s = &report.summaries[0];

        let get = match s.op_response_times.get("Get") {
            Some(v) => v,
            None => panic!("Get row missing: {:?}", s.op_response_times),
        };
        assert_eq!(get.p90, 0.08);
        assert_eq!(get.p99, 0.15);
        assert_eq!(get.avg, 0.04);
        assert_eq!(get.min, 0.01);
        assert_eq!(get.max, 0.2);

        assert_eq!(s.op_proportions.get("Get"), Some(&1.0));
        // Same key set on both maps.
        assert_eq!(
            s.op_response_times.keys().collect::<Vec<_>>(),
            s.op_proportions.keys().collect::<Vec<_>>()
        );
    }

    #[test]
    fn scientific_notation_values_parse() {
        let log = sample_log("Foo").replace(
            "Offered load (ops/sec)             : 100.0000",
            "Offered load (ops/sec)             : 1.0e2",
        );
        let report = parse_output(&log);
        assert_eq!(report.summaries[0].offered_load_ops_per_sec, 100.0);
    }

    #[test]
    fn track_without_final_results_yields_no_record_and_no_failure() {
        let report = parse_output("[TRACK: Bar] starting load scheduler\n");
        assert!(report.summaries.is_empty());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn missing_required_metric_fails_that_track_only() {
        let mut log = sample_log("Good");
        let broken = sample_log("Broken").replace(
            "[SCOREBOARD TRACK: Broken] Operations failed                  : 500\n",
            "",
        );
        log.push_str(&broken);

        let report = parse_output(&log);
        assert_eq!(report.summaries.len(), 1);
        assert_eq!(report.summaries[0].name, "Good");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].track(), "Broken");
        assert!(
            report.failures[0]
                .to_string()
                .contains("Operations failed")
        );
    }

    #[test]
    fn non_integer_operation_count_is_a_hard_error() {
        let log = sample_log("Foo").replace(
            "Operations failed                  : 500",
            "Operations failed                  : 500.5",
        );
        let report = parse_output(&log);
        assert!(report.summaries.is_empty());
        assert!(matches!(
            report.failures[..],
            [ParseError::NonIntegerCount { .. }]
        ));
    }

    #[test]
    fn track_names_with_regex_metacharacters_are_fine() {
        let report = parse_output(&sample_log("a+b(c)"));
        assert!(report.failures.is_empty());
        assert_eq!(report.summaries[0].name, "a+b(c)");
    }

    #[test]
    fn duplicate_start_markers_produce_one_record() {
        let log = format!("[TRACK: Foo] starting load scheduler\n{}", sample_log("Foo"));
        let report = parse_output(&log);
        assert_eq!(report.summaries.len(), 1);
    }

    #[test]
    fn tracks_emit_in_discovery_order() {
        let log = format!("{}{}", sample_log("B"), sample_log("A"));
        let report = parse_output(&log);
        let names: Vec<&str> = report.summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
    }

    fn interval_log() -> String {
        format!(
            "[TRACK: Foo] starting load scheduler\n\
             [SCOREBOARD TRACK: Foo] Interval results-------------------: \n\
             [SCOREBOARD TRACK: Foo] Interval name                      : ramp-up\n\
             [SCOREBOARD TRACK: Foo] Active users                       : 25.0000\n\
             [SCOREBOARD TRACK: Foo] Activation count                   : 1.0000\n\
             [SCOREBOARD TRACK: Foo] Offered load (ops/sec)             : 50.0000\n\
             [SCOREBOARD TRACK: Foo] Effective load (ops/sec)           : 48.0000\n\
             [SCOREBOARD TRACK: Foo] Effective load (requests/sec)      : 48.0000\n\
             [SCOREBOARD TRACK: Foo] Operations successfully completed  : 4800\n\
             [SCOREBOARD TRACK: Foo] Operations failed                  : 200\n\
             [SCOREBOARD TRACK: Foo] Average operation response time (s): 0.0200\n\
             [SCOREBOARD TRACK: Foo]|                 Get|  100.0000% |      4800|       200|      0.0200|      0.0100|      0.1000|    0.0300|    0.0500| 4800/5000 (mu: 0.0200, sd: 0.0050 t: 1.0000)|\n\
             [SCOREBOARD TRACK: Foo] Interval name                      : steady\n\
             [SCOREBOARD TRACK: Foo] Active users                       : 50.0000\n\
             [SCOREBOARD TRACK: Foo] Offered load (ops/sec)             : 100.0000\n\
             [SCOREBOARD TRACK: Foo] Effective load (ops/sec)           : 96.0000\n\
             [SCOREBOARD TRACK: Foo] Effective load (requests/sec)      : 96.0000\n\
             [SCOREBOARD TRACK: Foo] Operations successfully completed  : 9600\n\
             [SCOREBOARD TRACK: Foo] Operations failed                  : 400\n\
             [SCOREBOARD TRACK: Foo] Average operation response time (s): 0.0400\n\
             [SCOREBOARD TRACK: Foo]|                 Put|   100.0000% |      9600|       400|      0.0400|      0.0200|      0.3000|    0.0900|    0.1800| 9600/10000 (mu: 0.0400, sd: 0.0100 t: 1.0000)|\n\
             {}",
            final_block("Foo")
        )
    }

    #[test]
    fn interval_mode_scopes_fields_and_rows_per_interval() {
        let report = parse_interval_output(&interval_log());
        assert!(report.failures.is_empty(), "failures: {:?}", report.failures);
        assert_eq!(report.summaries.len(), 2);

        let ramp = &report.summaries[0];
        assert_eq!(ramp.name, "Foo-ramp-up");
        assert_eq!(ramp.average_users, 25.0);
        assert_eq!(ramp.offered_load_ops_per_sec, 50.0);
        assert_eq!(ramp.littles_estimate_ops_per_sec, 0.0);
        assert!(ramp.op_response_times.contains_key("Get"));
        assert!(!ramp.op_response_times.contains_key("Put"));

        let steady = &report.summaries[1];
        assert_eq!(steady.name, "Foo-steady");
        assert_eq!(steady.average_users, 50.0);
        assert_eq!(steady.operations_successful, 9600);
        assert!(steady.op_response_times.contains_key("Put"));
        assert!(!steady.op_response_times.contains_key("Get"));
    }

    #[test]
    fn interval_rows_never_leak_into_final_results() {
        let report = parse_output(&interval_log());
        assert_eq!(report.summaries.len(), 1);

        let s = &report.summaries[0];
        // The final block only lists Get; the steady interval's Put row
        // appears before the final anchor and must not be attributed.
        assert_eq!(s.operations_successful, 9500);
        assert!(s.op_response_times.contains_key("Get"));
        assert!(!s.op_response_times.contains_key("Put"));
        assert_eq!(
            s.op_response_times.get("Get").map(|g| g.p90),
            Some(0.08)
        );
    }

    #[test]
    fn last_interval_is_bounded_by_the_final_results_marker() {
        let report = parse_interval_output(&interval_log());
        let steady = &report.summaries[1];
        // The final block's Get row sits past the final anchor.
        assert!(!steady.op_response_times.contains_key("Get"));
    }
}
