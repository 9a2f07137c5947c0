use crate::error::AnalyticsError;
use crate::report::PerformanceReport;
use crate::risk::{self, cumulative_sum, difference};
use core_types::PortfolioReport;

/// A stateless calculator for deriving performance metrics from a portfolio report.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    periods_per_year: u32,
    histogram_bins: usize,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(252, 40)
    }
}

impl AnalyticsEngine {
    /// # Arguments
    ///
    /// * `periods_per_year` - Trading periods per year used for annualization (252 for daily data).
    /// * `histogram_bins` - Bin count of the excess return distribution.
    pub fn new(periods_per_year: u32, histogram_bins: usize) -> Self {
        Self {
            periods_per_year,
            histogram_bins,
        }
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// Daily excess return is `return - bench`; without a benchmark it is the
    /// strategy return itself. When costs are recorded a second, net-of-cost
    /// series `return - bench - cost` is analysed as well.
    pub fn calculate(&self, report: &PortfolioReport) -> Result<PerformanceReport, AnalyticsError> {
        if report.is_empty() {
            return Err(AnalyticsError::NotEnoughData(
                "portfolio report has no rows".to_string(),
            ));
        }

        let returns = report.returns();
        let daily_excess = match report.bench() {
            Some(bench) => difference(returns, bench, "bench")?,
            None => returns.to_vec(),
        };
        let excess_without_cost = risk::risk_metrics(&daily_excess, self.periods_per_year)?;

        let excess_with_cost = report
            .cost()
            .map(|cost| {
                let net = difference(&daily_excess, cost, "cost")?;
                risk::risk_metrics(&net, self.periods_per_year)
            })
            .transpose()?;

        let strategy_cumulative = cumulative_sum(returns);
        let strategy_max_drawdown = risk::max_drawdown(&strategy_cumulative);

        tracing::debug!(
            rows = report.len(),
            information_ratio = ?excess_without_cost.information_ratio,
            "Calculated performance report."
        );

        Ok(PerformanceReport {
            dates: report.dates().to_vec(),
            strategy_cumulative,
            benchmark_cumulative: report.bench().map(cumulative_sum),
            excess_histogram: risk::histogram(&daily_excess, self.histogram_bins),
            daily_excess,
            cumulative_cost: report.cost().map(cumulative_sum),
            cumulative_total_cost: report.total_cost().map(cumulative_sum),
            turnover: report.turnover().map(<[f64]>::to_vec),
            excess_without_cost,
            excess_with_cost,
            strategy_max_drawdown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ExcessFlavor;
    use chrono::NaiveDate;

    fn report(returns: Vec<f64>) -> PortfolioReport {
        let dates = (0..returns.len())
            .map(|i| NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i as u64))
            .collect();
        PortfolioReport::new(dates, returns).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_report_is_not_enough_data() {
        let err = AnalyticsEngine::default().calculate(&report(vec![])).unwrap_err();
        assert!(matches!(err, AnalyticsError::NotEnoughData(_)));
    }

    #[test]
    fn excess_is_return_minus_bench() {
        let r = report(vec![0.02, 0.01, -0.01])
            .with_bench(vec![0.01, 0.01, 0.00])
            .unwrap();
        let perf = AnalyticsEngine::default().calculate(&r).unwrap();

        assert!(close(perf.daily_excess[0], 0.01));
        assert!(close(perf.daily_excess[1], 0.0));
        assert!(close(perf.daily_excess[2], -0.01));
        assert!(close(perf.final_strategy_return().unwrap(), 0.02));
        assert!(close(perf.final_benchmark_return().unwrap(), 0.02));
        assert!(perf.excess_with_cost.is_none());
        assert_eq!(perf.headline_risk().0, ExcessFlavor::WithoutCost);
    }

    #[test]
    fn cost_produces_net_series() {
        let r = report(vec![0.02, 0.02])
            .with_bench(vec![0.01, 0.00])
            .unwrap()
            .with_cost(vec![0.001, 0.001])
            .unwrap();
        let perf = AnalyticsEngine::new(252, 10).calculate(&r).unwrap();

        let (flavor, headline) = perf.headline_risk();
        assert_eq!(flavor, ExcessFlavor::WithCost);
        assert!(close(headline.mean, 0.014));
        assert!(close(perf.cumulative_cost.as_ref().unwrap()[1], 0.002));
    }

    #[test]
    fn missing_benchmark_measures_against_zero() {
        let perf = AnalyticsEngine::default()
            .calculate(&report(vec![0.01, 0.02]))
            .unwrap();
        assert!(!perf.has_benchmark());
        assert_eq!(perf.daily_excess, vec![0.01, 0.02]);
        assert_eq!(perf.final_benchmark_return(), None);
    }

    #[test]
    fn strategy_drawdown_is_taken_on_cumulative_returns() {
        let perf = AnalyticsEngine::default()
            .calculate(&report(vec![0.05, -0.02, -0.03, 0.04]))
            .unwrap();
        assert!(close(perf.strategy_max_drawdown, 0.05));
    }
}
