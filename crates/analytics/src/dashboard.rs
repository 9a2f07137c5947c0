//! The view model rendered by the dashboard and the CLI.
//!
//! `build_run_view` turns whatever artifacts a run has into cards, a summary
//! table, chart series and notices. Absent or broken artifacts only remove
//! their own parts of the page.

use crate::engine::AnalyticsEngine;
use crate::report::PerformanceReport;
use crate::risk::RiskMetrics;
use core_types::{ArtifactKind, ArtifactStatus, RiskEntry, RunArtifacts};
use serde::Serialize;
use std::path::Path;

pub const UNAVAILABLE: &str = "unavailable";
pub const UNDEFINED: &str = "undefined";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunView {
    pub experiment_id: String,
    pub run_id: String,
    pub cards: Vec<MetricCard>,
    pub summary: Vec<SummaryRow>,
    /// The research framework's own risk table, when the run recorded one.
    pub recorded_risk: Vec<RiskEntry>,
    pub charts: Vec<Chart>,
    pub notices: Vec<Notice>,
}

impl RunView {
    pub fn chart(&self, id: &str) -> Option<&Chart> {
        self.charts.iter().find(|c| c.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub label: String,
    pub value: String,
}

/// A row of the metrics table. `with_cost` is `None` when no cost was recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub metric: String,
    pub without_cost: String,
    pub with_cost: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ChartSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

pub fn format_pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

pub fn format_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| UNDEFINED.to_string(), |v| format!("{v:.2}"))
}

/// Builds the page for one run from its loaded artifacts.
pub fn build_run_view(
    engine: &AnalyticsEngine,
    experiment_id: &str,
    run_id: &str,
    artifacts: &RunArtifacts,
) -> RunView {
    let mut view = RunView {
        experiment_id: experiment_id.to_string(),
        run_id: run_id.to_string(),
        cards: Vec::new(),
        summary: Vec::new(),
        recorded_risk: Vec::new(),
        charts: Vec::new(),
        notices: Vec::new(),
    };

    let performance = match &artifacts.report {
        ArtifactStatus::Loaded(report) => match engine.calculate(report) {
            Ok(performance) => Some(performance),
            Err(e) => {
                view.notices.push(Notice::warning(format!(
                    "Portfolio report cannot be analysed: {e}"
                )));
                None
            }
        },
        status => {
            push_status_notice(&mut view.notices, ArtifactKind::PortfolioReport, status);
            None
        }
    };

    view.cards = cards(performance.as_ref());
    if let Some(performance) = &performance {
        if !performance.has_benchmark() {
            view.notices.push(Notice::info(
                "No benchmark recorded for this run; excess returns are measured against zero.",
            ));
        }
        view.summary = summary(performance);
        view.charts.extend(return_charts(performance));
    }

    match &artifacts.risk_analysis {
        ArtifactStatus::Loaded(table) => view.recorded_risk = table.entries.clone(),
        status => push_status_notice(&mut view.notices, ArtifactKind::RiskAnalysis, status),
    }

    let indicator_turnover = match &artifacts.indicators {
        ArtifactStatus::Loaded(indicators) => indicators
            .turnover()
            .map(|turnover| (dates_as_strings(indicators.dates()), turnover.to_vec())),
        status => {
            push_status_notice(&mut view.notices, ArtifactKind::Indicators, status);
            None
        }
    };
    let report_turnover = performance
        .as_ref()
        .and_then(|p| p.turnover.clone().map(|t| (dates_as_strings(&p.dates), t)));

    match indicator_turnover.or(report_turnover) {
        Some((x, y)) => view.charts.push(Chart {
            id: "turnover".to_string(),
            title: "Turnover Ratio".to_string(),
            kind: ChartKind::Line,
            x_label: "Date".to_string(),
            y_label: "Turnover".to_string(),
            series: vec![ChartSeries {
                name: "Turnover".to_string(),
                x,
                y,
            }],
        }),
        None if artifacts.indicators.is_loaded() => view
            .notices
            .push(Notice::info("No turnover data available for this run.")),
        None => {}
    }

    view
}

/// Missing artifacts only earn a notice when the page loses its main section;
/// malformed ones are always reported.
fn push_status_notice<T>(notices: &mut Vec<Notice>, kind: ArtifactKind, status: &ArtifactStatus<T>) {
    match status {
        ArtifactStatus::Loaded(_) => {}
        ArtifactStatus::Missing { path } => {
            if kind == ArtifactKind::PortfolioReport {
                notices.push(Notice::info(format!(
                    "{} not found for this run; return metrics are unavailable.",
                    file_name(path)
                )));
            }
        }
        ArtifactStatus::Malformed { path, reason } => notices.push(Notice::warning(format!(
            "Failed to load {} ({kind}): {reason}",
            file_name(path)
        ))),
    }
}

fn cards(performance: Option<&PerformanceReport>) -> Vec<MetricCard> {
    let strategy = performance
        .and_then(PerformanceReport::final_strategy_return)
        .map_or_else(|| UNAVAILABLE.to_string(), format_pct);
    let benchmark = performance
        .and_then(PerformanceReport::final_benchmark_return)
        .map_or_else(|| UNAVAILABLE.to_string(), format_pct);
    let (ir_label, information_ratio) = match performance {
        Some(p) => {
            let (flavor, headline) = p.headline_risk();
            (
                format!("Information Ratio ({})", flavor.label()),
                format_ratio(headline.information_ratio),
            )
        }
        None => ("Information Ratio".to_string(), UNAVAILABLE.to_string()),
    };
    let drawdown = performance.map_or_else(
        || UNAVAILABLE.to_string(),
        |p| format_pct(p.strategy_max_drawdown),
    );

    vec![
        MetricCard {
            label: "Final Strategy Cumulative Return".to_string(),
            value: strategy,
        },
        MetricCard {
            label: "Final Benchmark Cumulative Return".to_string(),
            value: benchmark,
        },
        MetricCard {
            label: ir_label,
            value: information_ratio,
        },
        MetricCard {
            label: "Strategy Max Drawdown".to_string(),
            value: drawdown,
        },
    ]
}

fn summary(performance: &PerformanceReport) -> Vec<SummaryRow> {
    let row = |metric: &str, format: fn(&RiskMetrics) -> String| SummaryRow {
        metric: metric.to_string(),
        without_cost: format(&performance.excess_without_cost),
        with_cost: performance.excess_with_cost.as_ref().map(format),
    };

    vec![
        row("Annualized Excess Return", |m| format_pct(m.annualized_return)),
        row("Information Ratio", |m| format_ratio(m.information_ratio)),
        row("Max Drawdown", |m| format_pct(m.max_drawdown)),
    ]
}

fn return_charts(performance: &PerformanceReport) -> Vec<Chart> {
    let dates = dates_as_strings(&performance.dates);
    let series = |name: &str, y: &[f64]| ChartSeries {
        name: name.to_string(),
        x: dates.clone(),
        y: y.to_vec(),
    };

    let mut cumulative = vec![series("Strategy", &performance.strategy_cumulative)];
    if let Some(bench) = &performance.benchmark_cumulative {
        cumulative.push(series("Benchmark", bench));
    }

    let mut charts = vec![
        Chart {
            id: "cumulative_return".to_string(),
            title: "Cumulative Return".to_string(),
            kind: ChartKind::Line,
            x_label: "Date".to_string(),
            y_label: "Cumulative Return".to_string(),
            series: cumulative,
        },
        Chart {
            id: "daily_excess_return".to_string(),
            title: "Daily Strategy Excess Return".to_string(),
            kind: ChartKind::Line,
            x_label: "Date".to_string(),
            y_label: "Excess Return".to_string(),
            series: vec![series("Excess Return", &performance.daily_excess)],
        },
        Chart {
            id: "excess_return_distribution".to_string(),
            title: "Distribution of Daily Excess Returns".to_string(),
            kind: ChartKind::Bar,
            x_label: "Excess Return".to_string(),
            y_label: "Days".to_string(),
            series: vec![ChartSeries {
                name: "Days".to_string(),
                x: performance
                    .excess_histogram
                    .iter()
                    .map(|bin| format!("{:.4}", (bin.start + bin.end) / 2.0))
                    .collect(),
                y: performance
                    .excess_histogram
                    .iter()
                    .map(|bin| bin.count as f64)
                    .collect(),
            }],
        },
    ];

    let mut costs = Vec::new();
    if let Some(cost) = &performance.cumulative_cost {
        costs.push(series("Cost", cost));
    }
    if let Some(total_cost) = &performance.cumulative_total_cost {
        costs.push(series("Total Cost", total_cost));
    }
    if !costs.is_empty() {
        charts.push(Chart {
            id: "cumulative_cost".to_string(),
            title: "Cumulative Trading Costs".to_string(),
            kind: ChartKind::Line,
            x_label: "Date".to_string(),
            y_label: "Cost".to_string(),
            series: costs,
        });
    }

    charts
}

fn dates_as_strings(dates: &[chrono::NaiveDate]) -> Vec<String> {
    dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
