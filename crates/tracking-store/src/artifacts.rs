//! Decoding of artifact tables.
//!
//! The research framework writes date-indexed tables. They are accepted as CSV
//! (with a header row) or Parquet, picked by file extension.

use crate::error::ArtifactError;
use chrono::NaiveDate;
use core_types::{IndicatorSeries, PortfolioReport, RiskAnalysis, RiskEntry};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Names tried, in order, for the date index column. Falls back to the first column.
const INDEX_COLUMNS: [&str; 3] = ["datetime", "date", "time"];

/// Reads a whole table into memory.
pub fn read_table(path: &Path) -> Result<DataFrame, ArtifactError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => {
            let df = CsvReader::from_path(path)?
                .has_header(true)
                .infer_schema(Some(1000))
                .finish()?;
            Ok(df)
        }
        "parquet" | "pq" => {
            let file = File::open(path)?;
            Ok(ParquetReader::new(file).finish()?)
        }
        other => Err(ArtifactError::UnsupportedFormat(other.to_string())),
    }
}

pub fn decode_report(df: &DataFrame) -> Result<PortfolioReport, ArtifactError> {
    let (_, dates) = date_index(df)?;
    let returns = float_column(df, "return")?
        .ok_or_else(|| ArtifactError::MissingColumn("return".to_string()))?;

    let mut report = PortfolioReport::new(dates, returns)?;
    if let Some(bench) = float_column(df, "bench")? {
        report = report.with_bench(bench)?;
    }
    if let Some(cost) = float_column(df, "cost")? {
        report = report.with_cost(cost)?;
    }
    if let Some(total_cost) = float_column(df, "total_cost")? {
        report = report.with_total_cost(total_cost)?;
    }
    if let Some(turnover) = float_column(df, "turnover")? {
        report = report.with_turnover(turnover)?;
    }
    Ok(report)
}

/// Decodes the risk summary table. The layout is `group, metric, ..., value`:
/// the first two columns name the cell and the last one holds the number.
/// A two column table is read as `metric, value` with an empty group.
pub fn decode_risk_analysis(df: &DataFrame) -> Result<RiskAnalysis, ArtifactError> {
    let columns = df.get_columns();
    if columns.len() < 2 {
        return Err(ArtifactError::TooFewColumns {
            expected: 2,
            actual: columns.len(),
        });
    }

    let values = to_f64(&columns[columns.len() - 1])?;
    let metric_index = if columns.len() >= 3 { 1 } else { 0 };
    let metric_series = columns[metric_index].cast(&DataType::String)?;
    let metrics = metric_series.str()?;
    let group_series = if columns.len() >= 3 {
        Some(columns[0].cast(&DataType::String)?)
    } else {
        None
    };
    let groups = group_series.as_ref().map(|s| s.str()).transpose()?;

    let mut entries = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let metric = metrics.get(row).ok_or_else(|| ArtifactError::NullValue {
            row,
            column: "metric".to_string(),
        })?;
        let group = match groups {
            Some(groups) => groups.get(row).unwrap_or_default(),
            None => "",
        };
        entries.push(RiskEntry {
            group: group.to_string(),
            metric: metric.to_string(),
            value: values[row],
        });
    }

    Ok(RiskAnalysis { entries })
}

/// Decodes trade indicators, keeping every numeric column except the index.
pub fn decode_indicators(df: &DataFrame) -> Result<IndicatorSeries, ArtifactError> {
    let (index, dates) = date_index(df)?;
    let mut series = IndicatorSeries::new(dates);

    for column in df.get_columns() {
        if column.name() == index || !column.dtype().is_numeric() {
            continue;
        }
        let values = to_f64(column)?;
        series = series.with_column(column.name(), values)?;
    }
    Ok(series)
}

fn date_index(df: &DataFrame) -> Result<(String, Vec<NaiveDate>), ArtifactError> {
    let names = df.get_column_names();
    let index = INDEX_COLUMNS
        .iter()
        .copied()
        .find(|candidate| names.contains(candidate))
        .or_else(|| names.first().copied())
        .ok_or(ArtifactError::TooFewColumns {
            expected: 1,
            actual: 0,
        })?
        .to_string();

    let series = df.column(&index)?.cast(&DataType::String)?;
    let dates = series
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(raw) => parse_date(raw).ok_or_else(|| ArtifactError::InvalidDate {
                row,
                value: raw.to_string(),
            }),
            None => Err(ArtifactError::NullValue {
                row,
                column: index.clone(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((index, dates))
}

/// Accepts `YYYY-MM-DD` optionally followed by a time part.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn float_column(df: &DataFrame, name: &str) -> Result<Option<Vec<f64>>, ArtifactError> {
    if !df.get_column_names().contains(&name) {
        return Ok(None);
    }
    Ok(Some(to_f64(df.column(name)?)?))
}

/// Empty cells become NaN; the statistics skip non-finite values. A cell that
/// holds text which does not parse as a number rejects the whole column.
fn to_f64(series: &Series) -> Result<Vec<f64>, ArtifactError> {
    let cast = series.cast(&DataType::Float64)?;
    let floats = cast.f64()?;

    if floats.null_count() > series.null_count() {
        let original = series.cast(&DataType::String)?;
        let bad = original
            .str()?
            .into_iter()
            .zip(floats)
            .enumerate()
            .find_map(|(row, (raw, value))| match (raw, value) {
                (Some(raw), None) => Some((row, raw.to_string())),
                _ => None,
            });
        if let Some((row, value)) = bad {
            return Err(ArtifactError::NotNumeric {
                row,
                column: series.name().to_string(),
                value,
            });
        }
    }

    Ok(floats.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}
