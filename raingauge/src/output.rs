use crate::cli::OutputFormat;

use raingauge_core::TrackSummary;

mod human;
mod json;

pub(crate) trait OutputFormatter {
    fn print_report(&self, summaries: &[TrackSummary]) -> anyhow::Result<()>;
}

pub(crate) fn formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::HumanReadable => Box::new(human::HumanReadableOutput),
        OutputFormat::Json => Box::new(json::JsonOutput),
    }
}
