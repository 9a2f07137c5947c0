use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a run as recorded by the tracking store.
///
/// The file store writes the status as an integer code in the run's `meta.yaml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Running,
    Scheduled,
    Finished,
    Failed,
    Killed,
    Unknown,
}

impl RunStatus {
    /// Maps the tracking store's numeric status code to a `RunStatus`.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => RunStatus::Running,
            2 => RunStatus::Scheduled,
            3 => RunStatus::Finished,
            4 => RunStatus::Failed,
            5 => RunStatus::Killed,
            _ => RunStatus::Unknown,
        }
    }

    /// Parses the textual form (`"FINISHED"`, `"failed"`, ...) some tool versions write.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "RUNNING" => RunStatus::Running,
            "SCHEDULED" => RunStatus::Scheduled,
            "FINISHED" => RunStatus::Finished,
            "FAILED" => RunStatus::Failed,
            "KILLED" => RunStatus::Killed,
            _ => RunStatus::Unknown,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Running => "RUNNING",
            RunStatus::Scheduled => "SCHEDULED",
            RunStatus::Finished => "FINISHED",
            RunStatus::Failed => "FAILED",
            RunStatus::Killed => "KILLED",
            RunStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Whether an experiment or run is live or has been soft-deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStage {
    #[default]
    Active,
    Deleted,
}

/// The artifact types the viewer knows how to read from a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Daily portfolio report: returns, benchmark, costs, turnover.
    PortfolioReport,
    /// The research framework's precomputed risk summary table.
    RiskAnalysis,
    /// Trade indicators such as turnover and fulfilment rate.
    Indicators,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::PortfolioReport,
        ArtifactKind::RiskAnalysis,
        ArtifactKind::Indicators,
    ];

    /// A human readable label used in notices.
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::PortfolioReport => "portfolio report",
            ArtifactKind::RiskAnalysis => "risk analysis",
            ArtifactKind::Indicators => "trade indicators",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
