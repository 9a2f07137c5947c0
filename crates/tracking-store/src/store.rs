use crate::artifacts;
use crate::error::{ArtifactError, StoreError};
use crate::meta::{self, ExperimentMeta, META_FILE, RunMeta};
use configuration::ArtifactLayout;
use core_types::{
    ArtifactKind, ArtifactStatus, Experiment, LifecycleStage, RunArtifacts, RunInfo,
};
use polars::prelude::DataFrame;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Directory the tracking tool uses for its model registry, not an experiment.
const MODEL_REGISTRY_DIR: &str = "models";
const ARTIFACTS_DIR: &str = "artifacts";

/// A read-only view over a tracking tool's file store.
///
/// Nothing is cached: every call re-reads the filesystem, so a store opened on
/// a different root (or the same root after new runs land) always reflects
/// what is on disk.
#[derive(Debug, Clone)]
pub struct TrackingStore {
    root: PathBuf,
}

impl TrackingStore {
    /// Opens a store rooted at `root`, which must be an existing directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::RootNotFound(root));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists the experiments under the root, ordered by name.
    pub fn list_experiments(&self) -> Result<Vec<Experiment>, StoreError> {
        let mut experiments = Vec::new();

        for (experiment_id, path) in subdirectories(&self.root, true)? {
            let meta = meta::read_meta::<ExperimentMeta>(&path);
            if meta.is_none() && experiment_id == MODEL_REGISTRY_DIR {
                continue;
            }
            let meta = meta.unwrap_or_default();
            let lifecycle_stage = meta.lifecycle_stage.unwrap_or_default();
            if lifecycle_stage == LifecycleStage::Deleted {
                tracing::debug!(%experiment_id, "Skipping deleted experiment.");
                continue;
            }

            experiments.push(Experiment {
                name: meta.name.unwrap_or_else(|| experiment_id.clone()),
                experiment_id,
                artifact_location: meta.artifact_location,
                lifecycle_stage,
                path,
            });
        }

        experiments.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.experiment_id.cmp(&b.experiment_id))
        });
        tracing::debug!(root = %self.root.display(), count = experiments.len(), "Listed experiments.");
        Ok(experiments)
    }

    /// Lists the runs of an experiment, most recent first.
    ///
    /// A subdirectory counts as a run when it has a `meta.yaml` or an
    /// `artifacts/` directory. Runs without a start time sort last.
    pub fn list_runs(&self, experiment_id: &str) -> Result<Vec<RunInfo>, StoreError> {
        let experiment_dir = self.experiment_dir(experiment_id)?;

        let mut runs = Vec::new();
        for (run_id, path) in subdirectories(&experiment_dir, false)? {
            if !path.join(META_FILE).is_file() && !path.join(ARTIFACTS_DIR).is_dir() {
                continue;
            }
            let run = read_run(experiment_id, &run_id, path);
            if run.lifecycle_stage == LifecycleStage::Deleted {
                continue;
            }
            runs.push(run);
        }

        runs.sort_by(|a, b| {
            b.start_time
                .cmp(&a.start_time)
                .then_with(|| a.run_id.cmp(&b.run_id))
        });
        tracing::debug!(%experiment_id, count = runs.len(), "Listed runs.");
        Ok(runs)
    }

    /// Reads the metadata, params and metrics of a single run.
    pub fn run(&self, experiment_id: &str, run_id: &str) -> Result<RunInfo, StoreError> {
        let run_dir = self.run_dir(experiment_id, run_id)?;
        Ok(read_run(experiment_id, run_id, run_dir))
    }

    /// Absolute location of an artifact of a run.
    pub fn artifact_path(&self, experiment_id: &str, run_id: &str, relative: &str) -> PathBuf {
        self.root
            .join(experiment_id)
            .join(run_id)
            .join(ARTIFACTS_DIR)
            .join(relative)
    }

    /// Attempts to load every known artifact type of a run.
    ///
    /// Each artifact is looked up on its own: a missing or malformed file
    /// shows up in its own `ArtifactStatus` and never prevents the others
    /// from loading.
    pub fn load_artifacts(
        &self,
        experiment_id: &str,
        run_id: &str,
        layout: &ArtifactLayout,
    ) -> Result<RunArtifacts, StoreError> {
        self.run_dir(experiment_id, run_id)?;

        let path_of = |kind: ArtifactKind| {
            self.artifact_path(experiment_id, run_id, layout.relative_path(kind))
        };

        Ok(RunArtifacts {
            report: load_one(
                ArtifactKind::PortfolioReport,
                path_of(ArtifactKind::PortfolioReport),
                artifacts::decode_report,
            ),
            risk_analysis: load_one(
                ArtifactKind::RiskAnalysis,
                path_of(ArtifactKind::RiskAnalysis),
                artifacts::decode_risk_analysis,
            ),
            indicators: load_one(
                ArtifactKind::Indicators,
                path_of(ArtifactKind::Indicators),
                artifacts::decode_indicators,
            ),
        })
    }

    fn experiment_dir(&self, experiment_id: &str) -> Result<PathBuf, StoreError> {
        validate_id("experiment", experiment_id)?;
        let dir = self.root.join(experiment_id);
        if !dir.is_dir() {
            return Err(StoreError::ExperimentNotFound(experiment_id.to_string()));
        }
        Ok(dir)
    }

    fn run_dir(&self, experiment_id: &str, run_id: &str) -> Result<PathBuf, StoreError> {
        let experiment_dir = self.experiment_dir(experiment_id)?;
        validate_id("run", run_id)?;
        let dir = experiment_dir.join(run_id);
        if !dir.is_dir() {
            return Err(StoreError::RunNotFound {
                experiment_id: experiment_id.to_string(),
                run_id: run_id.to_string(),
            });
        }
        Ok(dir)
    }
}

/// Non-hidden child directories of `dir` as `(name, path)` pairs.
fn subdirectories(dir: &Path, is_root: bool) -> Result<Vec<(String, PathBuf)>, StoreError> {
    let entries = fs::read_dir(dir).map_err(|source| match (is_root, source.kind()) {
        (true, ErrorKind::NotFound) => StoreError::RootNotFound(dir.to_path_buf()),
        (true, _) => StoreError::RootUnreadable {
            path: dir.to_path_buf(),
            source,
        },
        (false, _) => StoreError::Io {
            path: dir.to_path_buf(),
            source,
        },
    })?;

    let mut dirs = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        if name.starts_with('.') || !path.is_dir() {
            continue;
        }
        dirs.push((name, path));
    }
    Ok(dirs)
}

fn read_run(experiment_id: &str, run_id: &str, path: PathBuf) -> RunInfo {
    let meta = meta::read_meta::<RunMeta>(&path).unwrap_or_default();
    let mut run = RunInfo::bare(experiment_id, run_id, path);
    run.status = meta.status();
    run.start_time = meta.start_time();
    run.end_time = meta.end_time();
    run.lifecycle_stage = meta.lifecycle_stage.unwrap_or_default();
    run.run_name = meta.run_name;
    run.params = meta::read_params(&run.path.join("params"));
    run.metrics = meta::read_metrics(&run.path.join("metrics"));
    run
}

fn load_one<T>(
    kind: ArtifactKind,
    path: PathBuf,
    decode: fn(&DataFrame) -> Result<T, ArtifactError>,
) -> ArtifactStatus<T> {
    if !path.is_file() {
        tracing::debug!(%kind, path = %path.display(), "Artifact not present.");
        return ArtifactStatus::Missing { path };
    }

    match artifacts::read_table(&path).and_then(|df| decode(&df)) {
        Ok(value) => ArtifactStatus::Loaded(value),
        Err(e) => {
            tracing::warn!(%kind, path = %path.display(), error = %e, "Malformed artifact.");
            ArtifactStatus::Malformed {
                path,
                reason: e.to_string(),
            }
        }
    }
}

/// Ids come from users; they must name a single directory under their parent.
fn validate_id(kind: &'static str, value: &str) -> Result<(), StoreError> {
    let mut components = Path::new(value).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_normal || value.contains(['/', '\\']) {
        return Err(StoreError::InvalidIdentifier {
            kind,
            value: value.to_string(),
        });
    }
    Ok(())
}
