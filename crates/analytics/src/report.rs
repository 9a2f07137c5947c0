use crate::risk::{HistogramBin, RiskMetrics};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Every metric and curve derived from a run's portfolio report.
///
/// This struct is the output of the `AnalyticsEngine`. It has no lifecycle of
/// its own and is recomputed whenever a run is viewed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub dates: Vec<NaiveDate>,

    // I. Curves
    pub strategy_cumulative: Vec<f64>,
    pub benchmark_cumulative: Option<Vec<f64>>, // None when no benchmark is recorded
    pub daily_excess: Vec<f64>,
    pub excess_histogram: Vec<HistogramBin>,
    pub cumulative_cost: Option<Vec<f64>>,
    pub cumulative_total_cost: Option<Vec<f64>>,
    pub turnover: Option<Vec<f64>>,

    // II. Risk
    pub excess_without_cost: RiskMetrics,
    pub excess_with_cost: Option<RiskMetrics>, // None when no cost column is recorded
    pub strategy_max_drawdown: f64,
}

impl PerformanceReport {
    pub fn has_benchmark(&self) -> bool {
        self.benchmark_cumulative.is_some()
    }

    pub fn final_strategy_return(&self) -> Option<f64> {
        self.strategy_cumulative.last().copied()
    }

    pub fn final_benchmark_return(&self) -> Option<f64> {
        self.benchmark_cumulative.as_ref()?.last().copied()
    }

    /// The risk figures shown first: net of cost when costs are recorded.
    pub fn headline_risk(&self) -> (ExcessFlavor, &RiskMetrics) {
        match &self.excess_with_cost {
            Some(with_cost) => (ExcessFlavor::WithCost, with_cost),
            None => (ExcessFlavor::WithoutCost, &self.excess_without_cost),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcessFlavor {
    WithoutCost,
    WithCost,
}

impl ExcessFlavor {
    pub fn label(&self) -> &'static str {
        match self {
            ExcessFlavor::WithoutCost => "excess return without cost",
            ExcessFlavor::WithCost => "excess return with cost",
        }
    }
}
