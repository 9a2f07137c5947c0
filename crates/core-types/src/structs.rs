use crate::enums::{LifecycleStage, RunStatus};
use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// An experiment directory found directly under the tracking root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Experiment {
    /// The directory name, which is also the tracking tool's experiment id.
    pub experiment_id: String,
    /// Display name from `meta.yaml`; falls back to the id when unreadable.
    pub name: String,
    pub artifact_location: Option<String>,
    pub lifecycle_stage: LifecycleStage,
    pub path: PathBuf,
}

/// One recorded execution of the external research workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunInfo {
    pub experiment_id: String,
    pub run_id: String,
    pub run_name: Option<String>,
    pub status: RunStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub lifecycle_stage: LifecycleStage,
    /// Logged parameters, keyed by parameter name.
    pub params: BTreeMap<String, String>,
    /// Latest value of every logged metric.
    pub metrics: BTreeMap<String, f64>,
    pub path: PathBuf,
}

impl RunInfo {
    /// A bare run with no metadata, as produced for a directory without a readable `meta.yaml`.
    pub fn bare(experiment_id: impl Into<String>, run_id: impl Into<String>, path: PathBuf) -> Self {
        Self {
            experiment_id: experiment_id.into(),
            run_id: run_id.into(),
            run_name: None,
            status: RunStatus::Unknown,
            start_time: None,
            end_time: None,
            lifecycle_stage: LifecycleStage::Active,
            params: BTreeMap::new(),
            metrics: BTreeMap::new(),
            path,
        }
    }
}

/// The daily portfolio report written by the backtest, one row per trading day.
///
/// Only `return` is required. Every optional column, when present, has exactly
/// one value per date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioReport {
    dates: Vec<NaiveDate>,
    returns: Vec<f64>,
    bench: Option<Vec<f64>>,
    cost: Option<Vec<f64>>,
    total_cost: Option<Vec<f64>>,
    turnover: Option<Vec<f64>>,
}

impl PortfolioReport {
    pub fn new(dates: Vec<NaiveDate>, returns: Vec<f64>) -> Result<Self, CoreError> {
        check_len("return", dates.len(), returns.len())?;
        Ok(Self {
            dates,
            returns,
            bench: None,
            cost: None,
            total_cost: None,
            turnover: None,
        })
    }

    pub fn with_bench(mut self, bench: Vec<f64>) -> Result<Self, CoreError> {
        check_len("bench", self.dates.len(), bench.len())?;
        self.bench = Some(bench);
        Ok(self)
    }

    pub fn with_cost(mut self, cost: Vec<f64>) -> Result<Self, CoreError> {
        check_len("cost", self.dates.len(), cost.len())?;
        self.cost = Some(cost);
        Ok(self)
    }

    pub fn with_total_cost(mut self, total_cost: Vec<f64>) -> Result<Self, CoreError> {
        check_len("total_cost", self.dates.len(), total_cost.len())?;
        self.total_cost = Some(total_cost);
        Ok(self)
    }

    pub fn with_turnover(mut self, turnover: Vec<f64>) -> Result<Self, CoreError> {
        check_len("turnover", self.dates.len(), turnover.len())?;
        self.turnover = Some(turnover);
        Ok(self)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    pub fn bench(&self) -> Option<&[f64]> {
        self.bench.as_deref()
    }

    pub fn cost(&self) -> Option<&[f64]> {
        self.cost.as_deref()
    }

    pub fn total_cost(&self) -> Option<&[f64]> {
        self.total_cost.as_deref()
    }

    pub fn turnover(&self) -> Option<&[f64]> {
        self.turnover.as_deref()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// One cell of the framework's risk summary, e.g.
/// `("excess_return_with_cost", "information_ratio", 1.3)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskEntry {
    pub group: String,
    pub metric: String,
    pub value: f64,
}

/// The precomputed risk analysis table recorded alongside the report.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RiskAnalysis {
    pub entries: Vec<RiskEntry>,
}

impl RiskAnalysis {
    pub fn get(&self, group: &str, metric: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.group == group && e.metric == metric)
            .map(|e| e.value)
    }
}

/// Date-indexed trade indicators. Columns are kept by name since the set
/// varies with the framework's executor configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl IndicatorSeries {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: BTreeMap::new(),
        }
    }

    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self, CoreError> {
        let name = name.into();
        check_len(&name, self.dates.len(), values.len())?;
        self.columns.insert(name, values);
        Ok(self)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn turnover(&self) -> Option<&[f64]> {
        self.column("turnover")
    }
}

/// Outcome of looking up one artifact for a run.
///
/// A missing artifact is an expected state, not an error: not every run
/// records every artifact type.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactStatus<T> {
    Loaded(T),
    Missing { path: PathBuf },
    Malformed { path: PathBuf, reason: String },
}

impl<T> ArtifactStatus<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            ArtifactStatus::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ArtifactStatus::Loaded(_))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ArtifactStatus::Missing { .. })
    }
}

/// Everything the viewer could load for a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunArtifacts {
    pub report: ArtifactStatus<PortfolioReport>,
    pub risk_analysis: ArtifactStatus<RiskAnalysis>,
    pub indicators: ArtifactStatus<IndicatorSeries>,
}

fn check_len(column: &str, expected: usize, actual: usize) -> Result<(), CoreError> {
    if expected != actual {
        return Err(CoreError::LengthMismatch {
            column: column.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: u32) -> Vec<NaiveDate> {
        (1..=n)
            .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
            .collect()
    }

    #[test]
    fn report_rejects_misaligned_columns() {
        let err = PortfolioReport::new(dates(3), vec![0.1, 0.2]).unwrap_err();
        assert_eq!(
            err,
            CoreError::LengthMismatch {
                column: "return".into(),
                expected: 3,
                actual: 2
            }
        );

        let report = PortfolioReport::new(dates(2), vec![0.1, 0.2]).unwrap();
        assert!(report.with_bench(vec![0.0]).is_err());
    }

    #[test]
    fn optional_columns_are_absent_until_set() {
        let report = PortfolioReport::new(dates(2), vec![0.1, 0.2])
            .unwrap()
            .with_cost(vec![0.001, 0.002])
            .unwrap();
        assert!(report.bench().is_none());
        assert_eq!(report.cost(), Some(&[0.001, 0.002][..]));
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn risk_analysis_lookup_by_group_and_metric() {
        let table = RiskAnalysis {
            entries: vec![
                RiskEntry {
                    group: "excess_return_with_cost".into(),
                    metric: "information_ratio".into(),
                    value: 1.25,
                },
                RiskEntry {
                    group: "excess_return_without_cost".into(),
                    metric: "information_ratio".into(),
                    value: 1.5,
                },
            ],
        };
        assert_eq!(table.get("excess_return_with_cost", "information_ratio"), Some(1.25));
        assert_eq!(table.get("excess_return_with_cost", "max_drawdown"), None);
    }

    #[test]
    fn artifact_status_accessors() {
        let missing: ArtifactStatus<RiskAnalysis> = ArtifactStatus::Missing {
            path: PathBuf::from("a/b.csv"),
        };
        assert!(missing.is_missing());
        assert!(missing.loaded().is_none());

        let loaded = ArtifactStatus::Loaded(RiskAnalysis::default());
        assert!(loaded.is_loaded());
    }
}
