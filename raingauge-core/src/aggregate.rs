use std::collections::BTreeMap;

use crate::summary::TrackSummary;

/// Mean / sample standard deviation / 95% confidence half-width for one
/// metric across repeated runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleStats {
    pub n: usize,
    pub mean: f64,
    pub stdev: f64,
    pub ci95_half_width: f64,
}

/// Compute statistics over a sample list. `None` when the list is empty —
/// the caller reports a "no data" row instead of dividing by zero.
pub fn sample_stats(samples: &[f64]) -> Option<SampleStats> {
    if samples.is_empty() {
        return None;
    }

    let n = samples.len();
    let n_f = n as f64;
    let mean = samples.iter().sum::<f64>() / n_f;

    let stdev = if n < 2 {
        0.0
    } else {
        let m2 = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
        (m2 / (n_f - 1.0)).sqrt()
    };

    Some(SampleStats {
        n,
        mean,
        stdev,
        ci95_half_width: 1.96 * stdev / n_f.sqrt(),
    })
}

/// Statistics for one tracked operation: average, 90th and 99th percentile
/// response times across runs.
#[derive(Debug, Clone, Default)]
pub struct OpStats {
    pub avg: Option<SampleStats>,
    pub p90: Option<SampleStats>,
    pub p99: Option<SampleStats>,
}

/// Aggregated statistics for one (size, users) configuration.
///
/// `runs` counts the records that contributed throughput samples; per-op
/// sample counts are independent (a run missing a tracked op contributes
/// nothing to that op's statistics).
#[derive(Debug, Clone)]
pub struct ConfigStats {
    pub runs: usize,
    pub throughput: Option<SampleStats>,
    pub response_time: Option<SampleStats>,
    pub per_op: BTreeMap<String, OpStats>,
}

impl ConfigStats {
    pub fn has_data(&self) -> bool {
        self.runs > 0
    }
}

/// Sweep configuration key: workload size first, then user count, so the
/// natural ordering is ascending on both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigKey {
    pub size: u64,
    pub users: u64,
}

#[derive(Debug, Default)]
struct OpSamples {
    avg: Vec<f64>,
    p90: Vec<f64>,
    p99: Vec<f64>,
}

#[derive(Debug, Default)]
struct ConfigSamples {
    throughput: Vec<f64>,
    response_time: Vec<f64>,
    per_op: BTreeMap<String, OpSamples>,
}

/// Accumulates repeated-run summaries keyed by configuration and produces
/// per-configuration statistics. The sweep never reads files itself;
/// callers feed it already-parsed records.
#[derive(Debug)]
pub struct Sweep {
    ops: Vec<String>,
    configs: BTreeMap<ConfigKey, ConfigSamples>,
}

impl Sweep {
    /// `ops` are the operations whose response times get the full
    /// mean/stddev/CI treatment in the output.
    pub fn new(ops: impl IntoIterator<Item = String>) -> Self {
        Self {
            ops: ops.into_iter().collect(),
            configs: BTreeMap::new(),
        }
    }

    pub fn ops(&self) -> &[String] {
        &self.ops
    }

    /// Register a configuration so it shows up in the output even if every
    /// one of its runs ends up missing or unparsable.
    pub fn touch(&mut self, key: ConfigKey) {
        self.configs.entry(key).or_default();
    }

    /// Add one run's record to a configuration.
    pub fn add_run(&mut self, key: ConfigKey, summary: &TrackSummary) {
        let samples = self.configs.entry(key).or_default();

        samples.throughput.push(summary.effective_load_ops_per_sec);
        samples
            .response_time
            .push(summary.average_op_response_time_sec);

        for op in &self.ops {
            if let Some(observed) = summary.op_response_times.get(op) {
                let entry = samples.per_op.entry(op.clone()).or_default();
                entry.avg.push(observed.avg);
                entry.p90.push(observed.p90);
                entry.p99.push(observed.p99);
            }
        }
    }

    /// Per-configuration statistics, ascending by (size, users).
    pub fn stats(&self) -> BTreeMap<ConfigKey, ConfigStats> {
        self.configs
            .iter()
            .map(|(key, samples)| {
                let per_op = self
                    .ops
                    .iter()
                    .map(|op| {
                        let stats = match samples.per_op.get(op) {
                            Some(s) => OpStats {
                                avg: sample_stats(&s.avg),
                                p90: sample_stats(&s.p90),
                                p99: sample_stats(&s.p99),
                            },
                            None => OpStats::default(),
                        };
                        (op.clone(), stats)
                    })
                    .collect();

                let stats = ConfigStats {
                    runs: samples.throughput.len(),
                    throughput: sample_stats(&samples.throughput),
                    response_time: sample_stats(&samples.response_time),
                    per_op,
                };
                (*key, stats)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::OpResponseTimes;

    fn run_summary(tput: f64, resp: f64, get_avg: f64) -> TrackSummary {
        let mut s = TrackSummary::new("default");
        s.effective_load_ops_per_sec = tput;
        s.average_op_response_time_sec = resp;
        s.op_response_times.insert(
            "Get".to_string(),
            OpResponseTimes {
                p90: get_avg * 2.0,
                p99: get_avg * 3.0,
                avg: get_avg,
                min: get_avg / 2.0,
                max: get_avg * 4.0,
            },
        );
        s.op_proportions.insert("Get".to_string(), 1.0);
        s
    }

    #[test]
    fn empty_samples_have_no_stats() {
        assert_eq!(sample_stats(&[]), None);
    }

    #[test]
    fn single_sample_has_zero_spread() {
        let stats = match sample_stats(&[42.0]) {
            Some(s) => s,
            None => panic!("expected stats"),
        };
        assert_eq!(stats.n, 1);
        assert_eq!(stats.mean, 42.0);
        assert_eq!(stats.stdev, 0.0);
        assert_eq!(stats.ci95_half_width, 0.0);
    }

    #[test]
    fn identical_samples_have_zero_stdev_and_ci() {
        let stats = match sample_stats(&[95.0, 95.0, 95.0, 95.0]) {
            Some(s) => s,
            None => panic!("expected stats"),
        };
        assert_eq!(stats.n, 4);
        assert_eq!(stats.mean, 95.0);
        assert_eq!(stats.stdev, 0.0);
        assert_eq!(stats.ci95_half_width, 0.0);
    }

    #[test]
    fn known_sample_spread() {
        // mean 20, sample variance ((10^2)*2)/3
        let stats = match sample_stats(&[10.0, 20.0, 30.0, 20.0]) {
            Some(s) => s,
            None => panic!("expected stats"),
        };
        assert!((stats.mean - 20.0).abs() < 1e-9);
        let expected_sd = (200.0f64 / 3.0).sqrt();
        assert!((stats.stdev - expected_sd).abs() < 1e-9);
        assert!((stats.ci95_half_width - 1.96 * expected_sd / 2.0).abs() < 1e-9);
    }

    #[test]
    fn sweep_groups_by_size_then_users_ascending() {
        let mut sweep = Sweep::new(["Get".to_string()]);
        for (size, users) in [(8192, 200), (4096, 400), (4096, 100)] {
            sweep.add_run(ConfigKey { size, users }, &run_summary(90.0, 0.05, 0.04));
        }

        let keys: Vec<ConfigKey> = sweep.stats().keys().copied().collect();
        assert_eq!(
            keys,
            [
                ConfigKey {
                    size: 4096,
                    users: 100
                },
                ConfigKey {
                    size: 4096,
                    users: 400
                },
                ConfigKey {
                    size: 8192,
                    users: 200
                },
            ]
        );
    }

    #[test]
    fn sweep_computes_per_op_stats_from_remaining_runs() {
        let key = ConfigKey {
            size: 4096,
            users: 100,
        };
        let mut sweep = Sweep::new(["Get".to_string(), "Put".to_string()]);
        // 4 expected runs, one went missing: only 3 recorded.
        for _ in 0..3 {
            sweep.add_run(key, &run_summary(95.0, 0.05, 0.04));
        }

        let stats = sweep.stats();
        let config = match stats.get(&key) {
            Some(c) => c,
            None => panic!("missing config"),
        };
        assert_eq!(config.runs, 3);

        let tput = match config.throughput {
            Some(t) => t,
            None => panic!("missing throughput stats"),
        };
        assert_eq!(tput.mean, 95.0);
        assert_eq!(tput.ci95_half_width, 0.0);

        let get = match config.per_op.get("Get") {
            Some(g) => g,
            None => panic!("missing Get stats"),
        };
        assert!(get.avg.is_some());
        assert!(get.p90.is_some());

        // No run reported Put: absent stats, not a crash.
        let put = match config.per_op.get("Put") {
            Some(p) => p,
            None => panic!("Put column should still exist"),
        };
        assert!(put.avg.is_none());
    }

    #[test]
    fn touched_config_with_no_runs_reports_no_data() {
        let key = ConfigKey {
            size: 4096,
            users: 100,
        };
        let mut sweep = Sweep::new(["Get".to_string()]);
        sweep.touch(key);

        let stats = sweep.stats();
        let config = match stats.get(&key) {
            Some(c) => c,
            None => panic!("missing config"),
        };
        assert!(!config.has_data());
        assert!(config.throughput.is_none());
        assert!(config.response_time.is_none());
    }
}
