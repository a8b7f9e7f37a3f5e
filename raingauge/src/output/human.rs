use super::OutputFormatter;

use raingauge_core::TrackSummary;
use raingauge_core::report::render_results_table;

pub(crate) struct HumanReadableOutput;

impl OutputFormatter for HumanReadableOutput {
    fn print_report(&self, summaries: &[TrackSummary]) -> anyhow::Result<()> {
        print!("{}", render_results_table(summaries));
        Ok(())
    }
}
