//! Shared data model for the run inspector: experiments, runs, and the
//! artifact tables a run may carry.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{ArtifactKind, LifecycleStage, RunStatus};
pub use error::CoreError;
pub use structs::{
    ArtifactStatus, Experiment, IndicatorSeries, PortfolioReport, RiskAnalysis, RiskEntry,
    RunArtifacts, RunInfo,
};
