use analytics::dashboard::{UNAVAILABLE, UNDEFINED};
use analytics::{AnalyticsEngine, NoticeLevel, build_run_view};
use chrono::NaiveDate;
use core_types::{
    ArtifactStatus, IndicatorSeries, PortfolioReport, RiskAnalysis, RiskEntry, RunArtifacts,
};
use std::path::PathBuf;

fn dates(n: usize) -> Vec<NaiveDate> {
    (0..n)
        .map(|i| NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() + chrono::Days::new(i as u64))
        .collect()
}

fn missing<T>(name: &str) -> ArtifactStatus<T> {
    ArtifactStatus::Missing {
        path: PathBuf::from("portfolio_analysis").join(name),
    }
}

fn full_report() -> PortfolioReport {
    PortfolioReport::new(dates(4), vec![0.01, -0.005, 0.02, 0.003])
        .unwrap()
        .with_bench(vec![0.004, -0.001, 0.01, 0.002])
        .unwrap()
        .with_cost(vec![0.0005; 4])
        .unwrap()
        .with_total_cost(vec![0.0006; 4])
        .unwrap()
}

#[test]
fn full_run_renders_every_section() {
    let artifacts = RunArtifacts {
        report: ArtifactStatus::Loaded(full_report()),
        risk_analysis: ArtifactStatus::Loaded(RiskAnalysis {
            entries: vec![RiskEntry {
                group: "excess_return_with_cost".into(),
                metric: "information_ratio".into(),
                value: 1.7,
            }],
        }),
        indicators: ArtifactStatus::Loaded(
            IndicatorSeries::new(dates(4))
                .with_column("turnover", vec![0.1, 0.2, 0.3, 0.2])
                .unwrap(),
        ),
    };

    let view = build_run_view(&AnalyticsEngine::default(), "1", "abc", &artifacts);

    for id in [
        "cumulative_return",
        "daily_excess_return",
        "excess_return_distribution",
        "cumulative_cost",
        "turnover",
    ] {
        assert!(view.chart(id).is_some(), "missing chart {id}");
    }
    assert_eq!(view.chart("cumulative_return").unwrap().series.len(), 2);
    assert_eq!(view.summary.len(), 3);
    assert!(view.summary.iter().all(|row| row.with_cost.is_some()));
    assert_eq!(view.recorded_risk.len(), 1);
    assert!(view.notices.is_empty(), "unexpected notices: {:?}", view.notices);
    assert_eq!(view.cards[0].value, "2.80%");
}

#[test]
fn missing_report_keeps_other_artifacts() {
    let artifacts = RunArtifacts {
        report: missing("report_normal_1day.csv"),
        risk_analysis: missing("port_analysis_1day.csv"),
        indicators: ArtifactStatus::Loaded(
            IndicatorSeries::new(dates(2))
                .with_column("turnover", vec![0.4, 0.5])
                .unwrap(),
        ),
    };

    let view = build_run_view(&AnalyticsEngine::default(), "1", "abc", &artifacts);

    assert!(view.chart("cumulative_return").is_none());
    assert!(view.chart("turnover").is_some());
    assert!(view.summary.is_empty());
    assert!(view.cards.iter().all(|card| card.value == UNAVAILABLE));
    assert_eq!(view.notices.len(), 1);
    assert_eq!(view.notices[0].level, NoticeLevel::Info);
    assert!(view.notices[0].message.contains("report_normal_1day.csv"));
}

#[test]
fn missing_indicators_fall_back_to_report_turnover() {
    let report = full_report().with_turnover(vec![0.2, 0.1, 0.3, 0.2]).unwrap();
    let artifacts = RunArtifacts {
        report: ArtifactStatus::Loaded(report),
        risk_analysis: missing("port_analysis_1day.csv"),
        indicators: missing("indicators_normal_1day.csv"),
    };

    let view = build_run_view(&AnalyticsEngine::default(), "1", "abc", &artifacts);
    let turnover = view.chart("turnover").unwrap();
    assert_eq!(turnover.series[0].y, vec![0.2, 0.1, 0.3, 0.2]);
    assert!(view.notices.is_empty());
}

#[test]
fn indicators_without_turnover_is_an_info_notice() {
    let artifacts = RunArtifacts {
        report: ArtifactStatus::Loaded(full_report()),
        risk_analysis: missing("port_analysis_1day.csv"),
        indicators: ArtifactStatus::Loaded(
            IndicatorSeries::new(dates(4))
                .with_column("ffr", vec![1.0, 0.9, 1.0, 0.8])
                .unwrap(),
        ),
    };

    let view = build_run_view(&AnalyticsEngine::default(), "1", "abc", &artifacts);
    assert!(view.chart("turnover").is_none());
    assert!(view.chart("cumulative_return").is_some());
    assert!(
        view.notices
            .iter()
            .any(|n| n.level == NoticeLevel::Info && n.message.contains("turnover"))
    );
}

#[test]
fn missing_indicators_without_report_turnover_are_silent() {
    let artifacts = RunArtifacts {
        report: ArtifactStatus::Loaded(full_report()),
        risk_analysis: missing("port_analysis_1day.csv"),
        indicators: missing("indicators_normal_1day.csv"),
    };

    let view = build_run_view(&AnalyticsEngine::default(), "1", "abc", &artifacts);
    assert!(view.chart("turnover").is_none());
    assert!(view.notices.iter().all(|n| !n.message.contains("turnover")));
}

#[test]
fn strategy_drawdown_is_shown_as_a_card() {
    let artifacts = RunArtifacts {
        report: ArtifactStatus::Loaded(full_report()),
        risk_analysis: missing("port_analysis_1day.csv"),
        indicators: missing("indicators_normal_1day.csv"),
    };

    let view = build_run_view(&AnalyticsEngine::default(), "1", "abc", &artifacts);
    let card = view
        .cards
        .iter()
        .find(|card| card.label == "Strategy Max Drawdown")
        .expect("drawdown card");
    assert_eq!(card.value, "0.50%");
    assert_eq!(view.cards[2].label, "Information Ratio (excess return with cost)");
}

#[test]
fn malformed_artifact_is_a_warning_and_page_still_renders() {
    let artifacts = RunArtifacts {
        report: ArtifactStatus::Loaded(full_report()),
        risk_analysis: ArtifactStatus::Malformed {
            path: PathBuf::from("portfolio_analysis/port_analysis_1day.csv"),
            reason: "expected at least 2 columns, found 1".into(),
        },
        indicators: missing("indicators_normal_1day.csv"),
    };

    let view = build_run_view(&AnalyticsEngine::default(), "1", "abc", &artifacts);
    assert!(view.chart("cumulative_return").is_some());
    let warning = view
        .notices
        .iter()
        .find(|n| n.level == NoticeLevel::Warning)
        .expect("warning notice");
    assert!(warning.message.contains("port_analysis_1day.csv"));
}

#[test]
fn zero_variance_excess_reports_undefined_information_ratio() {
    let report = PortfolioReport::new(dates(3), vec![0.02, 0.02, 0.02])
        .unwrap()
        .with_bench(vec![0.01, 0.01, 0.01])
        .unwrap();
    let artifacts = RunArtifacts {
        report: ArtifactStatus::Loaded(report),
        risk_analysis: missing("port_analysis_1day.csv"),
        indicators: missing("indicators_normal_1day.csv"),
    };

    let view = build_run_view(&AnalyticsEngine::default(), "1", "abc", &artifacts);
    assert_eq!(view.cards[2].value, UNDEFINED);
    let ir_row = view
        .summary
        .iter()
        .find(|row| row.metric == "Information Ratio")
        .unwrap();
    assert_eq!(ir_row.without_cost, UNDEFINED);
    assert_eq!(ir_row.with_cost, None);
}

#[test]
fn report_without_benchmark_notes_it() {
    let report = PortfolioReport::new(dates(2), vec![0.01, 0.02]).unwrap();
    let artifacts = RunArtifacts {
        report: ArtifactStatus::Loaded(report),
        risk_analysis: missing("port_analysis_1day.csv"),
        indicators: missing("indicators_normal_1day.csv"),
    };

    let view = build_run_view(&AnalyticsEngine::default(), "1", "abc", &artifacts);
    assert_eq!(view.cards[1].value, UNAVAILABLE);
    assert_eq!(view.chart("cumulative_return").unwrap().series.len(), 1);
    assert!(view.notices.iter().any(|n| n.message.contains("No benchmark")));
}
