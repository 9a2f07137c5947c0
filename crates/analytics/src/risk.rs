//! Descriptive statistics over daily return series.
//!
//! Returns accumulate additively: the cumulative curve is a running sum of
//! period returns, and drawdowns are measured on that curve in return units.
//! Non-finite values (missing cells in the artifact) are skipped.

use crate::error::AnalyticsError;
use serde::Serialize;

/// Standard deviations below this are treated as zero variance.
const ZERO_VARIANCE_EPS: f64 = 1e-12;

/// Summary statistics of one daily (excess) return series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskMetrics {
    /// Number of finite observations used.
    pub observations: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two observations.
    pub std: Option<f64>,
    /// `mean * periods_per_year`.
    pub annualized_return: f64,
    /// `mean / std * sqrt(periods_per_year)`; `None` when the series has no variance.
    pub information_ratio: Option<f64>,
    /// Largest peak-to-trough decline of the cumulative curve, as a non-negative number.
    pub max_drawdown: f64,
}

pub fn risk_metrics(returns: &[f64], periods_per_year: u32) -> Result<RiskMetrics, AnalyticsError> {
    let finite = finite_values(returns);
    let mean = mean(&finite).ok_or_else(|| {
        AnalyticsError::NotEnoughData("return series has no finite observations".to_string())
    })?;
    let std = sample_std(&finite);
    let periods = f64::from(periods_per_year);

    let information_ratio = match std {
        Some(std) if std > ZERO_VARIANCE_EPS => Some(mean / std * periods.sqrt()),
        _ => None,
    };

    Ok(RiskMetrics {
        observations: finite.len(),
        mean,
        std,
        annualized_return: mean * periods,
        information_ratio,
        max_drawdown: max_drawdown(&cumulative_sum(returns)),
    })
}

/// Running sum of `values`; non-finite entries add nothing.
pub fn cumulative_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, v| {
            if v.is_finite() {
                *acc += v;
            }
            Some(*acc)
        })
        .collect()
}

/// Largest drop from a running peak. The peak starts at the first point, so a
/// non-decreasing curve has a drawdown of exactly zero.
pub fn max_drawdown(curve: &[f64]) -> f64 {
    let mut points = curve.iter().copied().filter(|v| v.is_finite());
    let Some(first) = points.next() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_drawdown = 0.0_f64;
    for value in points {
        if value > peak {
            peak = value;
        }
        max_drawdown = max_drawdown.max(peak - value);
    }
    max_drawdown
}

/// Element-wise `a - b`.
pub fn difference(a: &[f64], b: &[f64], name: &str) -> Result<Vec<f64>, AnalyticsError> {
    if a.len() != b.len() {
        return Err(AnalyticsError::MisalignedSeries(name.to_string()));
    }
    Ok(a.iter().zip(b).map(|(x, y)| x - y).collect())
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// One bucket of a histogram, covering `[start, end)` (the last bucket is closed).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram over the finite values.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite = finite_values(values);
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max - min <= f64::EPSILON {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for value in &finite {
        let index = (((value - min) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count,
        })
        .collect()
}

fn finite_values(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}
