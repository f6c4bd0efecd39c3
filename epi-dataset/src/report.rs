use serde::Serialize;
use std::fmt;

/// How one source resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SourceOutcome {
    Loaded { rows: usize },
    /// The file was there but held no usable rows
    Empty,
    /// Some or all of the source was missing, unreachable or unreadable;
    /// whatever could not be read is left out
    Degraded { reason: String },
}

impl SourceOutcome {
    pub fn from_rows(rows: usize) -> SourceOutcome {
        if rows == 0 {
            SourceOutcome::Empty
        } else {
            SourceOutcome::Loaded { rows }
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, SourceOutcome::Degraded { .. })
    }
}

impl fmt::Display for SourceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceOutcome::Loaded { rows } => write!(f, "loaded {} rows", rows),
            SourceOutcome::Empty => f.write_str("empty"),
            SourceOutcome::Degraded { reason } => write!(f, "degraded: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub source: String,
    #[serde(flatten)]
    pub outcome: SourceOutcome,
}

/// The resolution of every source of one load, in load order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub sources: Vec<SourceReport>,
}

impl LoadReport {
    pub fn record(&mut self, source: impl Into<String>, outcome: SourceOutcome) {
        let source = source.into();
        match &outcome {
            SourceOutcome::Degraded { reason } => log::warn!("{}: {}", source, reason),
            outcome => log::info!("{}: {}", source, outcome),
        }
        self.sources.push(SourceReport { source, outcome });
    }

    pub fn outcome(&self, source: &str) -> Option<&SourceOutcome> {
        self.sources
            .iter()
            .find(|report| report.source == source)
            .map(|report| &report.outcome)
    }

    pub fn degraded(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources.iter().filter(|report| report.outcome.is_degraded())
    }
}
