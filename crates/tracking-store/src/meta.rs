//! Parsing of the tracking tool's per-directory metadata: `meta.yaml`,
//! `params/` and `metrics/`.

use chrono::{DateTime, Utc};
use core_types::{LifecycleStage, RunStatus};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const META_FILE: &str = "meta.yaml";

#[derive(Debug, Default, Deserialize)]
pub struct ExperimentMeta {
    pub name: Option<String>,
    pub artifact_location: Option<String>,
    pub lifecycle_stage: Option<LifecycleStage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RunMeta {
    pub run_name: Option<String>,
    /// Integer code in the file store, a name in some newer versions.
    pub status: Option<serde_yaml::Value>,
    /// Milliseconds since the Unix epoch.
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub lifecycle_stage: Option<LifecycleStage>,
}

impl RunMeta {
    pub fn status(&self) -> RunStatus {
        match &self.status {
            Some(serde_yaml::Value::Number(n)) => n.as_i64().map_or(RunStatus::Unknown, RunStatus::from_code),
            Some(serde_yaml::Value::String(s)) => RunStatus::from_name(s),
            _ => RunStatus::Unknown,
        }
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time.and_then(DateTime::<Utc>::from_timestamp_millis)
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time.and_then(DateTime::<Utc>::from_timestamp_millis)
    }
}

/// Reads `meta.yaml` from `dir`.
///
/// Returns `None` when the file is absent. A file that exists but does not
/// parse is logged and treated as empty metadata.
pub fn read_meta<T>(dir: &Path) -> Option<T>
where
    T: for<'de> Deserialize<'de> + Default,
{
    let path = dir.join(META_FILE);
    let contents = fs::read_to_string(&path).ok()?;
    match serde_yaml::from_str(&contents) {
        Ok(meta) => Some(meta),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Unreadable metadata, using defaults.");
            Some(T::default())
        }
    }
}

/// Reads every file under `dir` as a parameter. Nested directories produce
/// `a/b` style keys, mirroring how the tracking tool stores keys containing `/`.
pub fn read_params(dir: &Path) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    walk_key_files(dir, "", &mut |key, contents| {
        params.insert(key, contents.trim_end_matches(['\n', '\r']).to_string());
    });
    params
}

/// Reads the latest value of every metric under `dir`.
///
/// Each metric file holds one `<timestamp> <value> <step>` entry per line; the
/// last line that parses wins.
pub fn read_metrics(dir: &Path) -> BTreeMap<String, f64> {
    let mut metrics = BTreeMap::new();
    walk_key_files(dir, "", &mut |key, contents| {
        if let Some(value) = contents.lines().rev().find_map(parse_metric_line) {
            metrics.insert(key, value);
        }
    });
    metrics
}

fn parse_metric_line(line: &str) -> Option<f64> {
    let mut fields = line.split_whitespace();
    let _timestamp = fields.next()?;
    fields.next()?.parse().ok()
}

fn walk_key_files(dir: &Path, prefix: &str, visit: &mut dyn FnMut(String, String)) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        let key = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };
        let path = entry.path();
        if path.is_dir() {
            walk_key_files(&path, &key, visit);
        } else if let Ok(contents) = fs::read_to_string(&path) {
            visit(key, contents);
        }
    }
}
