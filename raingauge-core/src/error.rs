use crate::parse::MetricLabel;

pub type Result<T> = std::result::Result<T, ParseError>;

/// Extraction failures for a single track or interval.
///
/// A failure here never aborts extraction of the other tracks in the same
/// text; the parser collects these alongside the records that did parse.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("track `{track}`: `{label}` missing from final results")]
    MissingFinalMetric { track: String, label: MetricLabel },

    #[error("track `{track}`, interval `{interval}`: `{label}` missing")]
    MissingIntervalMetric {
        track: String,
        interval: String,
        label: MetricLabel,
    },

    #[error("track `{track}`: expected an integer for `{label}`, got `{value}`")]
    NonIntegerCount {
        track: String,
        label: MetricLabel,
        value: String,
    },
}

impl ParseError {
    /// Name of the track the failure belongs to.
    pub fn track(&self) -> &str {
        match self {
            Self::MissingFinalMetric { track, .. }
            | Self::MissingIntervalMetric { track, .. }
            | Self::NonIntegerCount { track, .. } => track,
        }
    }
}
