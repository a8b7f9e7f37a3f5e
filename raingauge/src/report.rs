use anyhow::Context as _;

use crate::cli::ReportArgs;
use crate::exit_codes::ExitCode;
use crate::output;
use crate::run_error::RunError;
use crate::thresholds::ThresholdsFile;

use raingauge_core::{parse_interval_output, parse_output, validate};

pub(crate) fn report(args: ReportArgs) -> Result<ExitCode, RunError> {
    let thresholds = match &args.thresholds {
        Some(path) => Some(ThresholdsFile::load(path).map_err(RunError::InvalidInput)?),
        None => None,
    };

    let text = std::fs::read_to_string(&args.log)
        .with_context(|| format!("read log {}", args.log.display()))
        .map_err(RunError::RuntimeError)?;

    let mut parsed = if args.intervals {
        parse_interval_output(&text)
    } else {
        parse_output(&text)
    };

    for failure in &parsed.failures {
        eprintln!("parse error: {failure}");
    }

    if let Some(thresholds) = &thresholds {
        for summary in &mut parsed.summaries {
            thresholds.apply(summary);
        }
    }

    output::formatter(args.output)
        .print_report(&parsed.summaries)
        .map_err(RunError::RuntimeError)?;

    // A reduced record list must not masquerade as a clean pass.
    if !parsed.failures.is_empty() {
        return Ok(ExitCode::MalformedInput);
    }

    let all_acceptable = parsed
        .summaries
        .iter()
        .all(|summary| validate(summary).is_acceptable());

    Ok(if all_acceptable {
        ExitCode::Success
    } else {
        ExitCode::ValidationFailed
    })
}
