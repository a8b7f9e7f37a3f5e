use std::path::PathBuf;

use anyhow::Context as _;

use crate::cli::SweepArgs;
use crate::exit_codes::ExitCode;
use crate::run_error::RunError;

use raingauge_core::aggregate::{ConfigKey, Sweep};
use raingauge_core::parse_output;
use raingauge_core::report::render_sweep_csv;

pub(crate) fn sweep(args: SweepArgs) -> Result<ExitCode, RunError> {
    let mut sweep = Sweep::new(args.ops.clone());

    for &size in &args.sizes {
        for &users in &args.users {
            let key = ConfigKey { size, users };
            sweep.touch(key);

            for run in 0..args.repeats {
                let path = run_log_path(&args, users, size, run);

                // One missing or corrupt run must never abort the batch:
                // report it and compute statistics from the runs that
                // remain.
                let text = match std::fs::read_to_string(&path) {
                    Ok(text) => text,
                    Err(err) => {
                        eprintln!("skipping {}: {err}", path.display());
                        continue;
                    }
                };

                let parsed = parse_output(&text);
                for failure in &parsed.failures {
                    eprintln!("skipping track in {}: {failure}", path.display());
                }
                for summary in &parsed.summaries {
                    sweep.add_run(key, summary);
                }
            }
        }
    }

    let stats = sweep.stats();
    let csv = render_sweep_csv(&stats, sweep.ops());

    match &args.out {
        Some(path) => {
            std::fs::write(path, &csv)
                .with_context(|| format!("write csv {}", path.display()))
                .map_err(RunError::RuntimeError)?;
        }
        None => print!("{csv}"),
    }

    let any_data = stats.values().any(|config| config.has_data());
    Ok(if any_data {
        ExitCode::Success
    } else {
        ExitCode::MalformedInput
    })
}

/// The run logs follow the experiment driver's naming convention.
fn run_log_path(args: &SweepArgs, users: u64, size: u64, run: u32) -> PathBuf {
    args.dir.join(format!(
        "expt_{}_users_{}_size_{}_run_{}.log",
        args.tag, users, size, run
    ))
}
