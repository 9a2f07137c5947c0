//! Scans of on-disk tracking stores laid out the way the tracking tool writes them.

use configuration::ArtifactLayout;
use core_types::{ArtifactStatus, LifecycleStage, RunStatus};
use std::fs;
use std::path::Path;
use tracking_store::{StoreError, TrackingStore};

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn experiment(root: &Path, id: &str, name: &str) {
    write(
        &root.join(id).join("meta.yaml"),
        &format!("artifact_location: file://{0}/{1}\nexperiment_id: '{1}'\nlifecycle_stage: active\nname: {2}\n", root.display(), id, name),
    );
}

fn run(root: &Path, experiment_id: &str, run_id: &str, start_ms: Option<i64>) {
    let start = start_ms.map_or("null".to_string(), |ms| ms.to_string());
    write(
        &root.join(experiment_id).join(run_id).join("meta.yaml"),
        &format!("run_id: {run_id}\nrun_name: {run_id}-name\nstatus: 3\nstart_time: {start}\nend_time: null\nlifecycle_stage: active\n"),
    );
}

fn artifact(root: &Path, experiment_id: &str, run_id: &str, relative: &str, contents: &str) {
    write(
        &root
            .join(experiment_id)
            .join(run_id)
            .join("artifacts")
            .join(relative),
        contents,
    );
}

const REPORT: &str = "datetime,return,bench,cost,turnover\n\
2024-01-02,0.010,0.004,0.0005,0.20\n\
2024-01-03,-0.004,0.001,0.0005,0.10\n\
2024-01-04,0.006,-0.002,0.0005,0.15\n";

#[test]
fn empty_root_has_no_experiments() {
    let root = tempfile::tempdir().unwrap();
    let store = TrackingStore::open(root.path()).unwrap();
    assert!(store.list_experiments().unwrap().is_empty());
}

#[test]
fn experiments_are_named_from_metadata_and_sorted() {
    let root = tempfile::tempdir().unwrap();
    experiment(root.path(), "2", "zeta");
    experiment(root.path(), "1", "alpha");
    fs::create_dir_all(root.path().join("7")).unwrap();
    fs::create_dir_all(root.path().join(".trash").join("3")).unwrap();
    fs::create_dir_all(root.path().join("models")).unwrap();
    write(&root.path().join("not_a_dir.txt"), "x");

    let store = TrackingStore::open(root.path()).unwrap();
    let experiments = store.list_experiments().unwrap();
    let names: Vec<_> = experiments.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["7", "alpha", "zeta"]);
    assert_eq!(experiments[1].experiment_id, "1");
    assert_eq!(experiments[1].lifecycle_stage, LifecycleStage::Active);
}

#[test]
fn deleted_experiments_are_hidden() {
    let root = tempfile::tempdir().unwrap();
    experiment(root.path(), "1", "kept");
    write(
        &root.path().join("2").join("meta.yaml"),
        "name: gone\nlifecycle_stage: deleted\n",
    );

    let store = TrackingStore::open(root.path()).unwrap();
    let experiments = store.list_experiments().unwrap();
    assert_eq!(experiments.len(), 1);
    assert_eq!(experiments[0].name, "kept");
}

#[test]
fn runs_are_listed_most_recent_first() {
    let root = tempfile::tempdir().unwrap();
    experiment(root.path(), "1", "workflow");
    run(root.path(), "1", "old", Some(1_700_000_000_000));
    run(root.path(), "1", "new", Some(1_700_000_500_000));
    run(root.path(), "1", "unstarted", None);
    fs::create_dir_all(root.path().join("1").join("tags")).unwrap();

    let store = TrackingStore::open(root.path()).unwrap();
    let runs = store.list_runs("1").unwrap();
    let ids: Vec<_> = runs.iter().map(|r| r.run_id.as_str()).collect();
    assert_eq!(ids, vec!["new", "old", "unstarted"]);
    assert_eq!(runs[0].status, RunStatus::Finished);
    assert_eq!(runs[0].run_name.as_deref(), Some("new-name"));
}

#[test]
fn run_params_and_metrics_are_collected() {
    let root = tempfile::tempdir().unwrap();
    experiment(root.path(), "1", "workflow");
    run(root.path(), "1", "abc", Some(1_700_000_000_000));
    write(&root.path().join("1/abc/params/model"), "LGBModel");
    write(&root.path().join("1/abc/metrics/IC"), "1700000000000 0.04 0\n");

    let store = TrackingStore::open(root.path()).unwrap();
    let info = store.run("1", "abc").unwrap();
    assert_eq!(info.params.get("model").map(String::as_str), Some("LGBModel"));
    assert_eq!(info.metrics.get("IC"), Some(&0.04));
}

#[test]
fn unknown_experiment_and_run_are_reported() {
    let root = tempfile::tempdir().unwrap();
    experiment(root.path(), "1", "workflow");
    let store = TrackingStore::open(root.path()).unwrap();

    assert!(matches!(
        store.list_runs("9"),
        Err(StoreError::ExperimentNotFound(id)) if id == "9"
    ));
    assert!(matches!(
        store.load_artifacts("1", "nope", &ArtifactLayout::default()),
        Err(StoreError::RunNotFound { .. })
    ));
    assert!(matches!(
        store.list_runs("../1"),
        Err(StoreError::InvalidIdentifier { .. })
    ));
}

#[test]
fn each_artifact_loads_independently() {
    let root = tempfile::tempdir().unwrap();
    let layout = ArtifactLayout::default();
    experiment(root.path(), "1", "workflow");
    run(root.path(), "1", "abc", Some(1_700_000_000_000));
    artifact(root.path(), "1", "abc", &layout.portfolio_report, REPORT);
    artifact(
        root.path(),
        "1",
        "abc",
        &layout.indicators,
        "datetime,turnover\n2024-01-02,0.2\n",
    );
    // risk analysis deliberately absent

    let store = TrackingStore::open(root.path()).unwrap();
    let artifacts = store.load_artifacts("1", "abc", &layout).unwrap();

    let report = artifacts.report.loaded().expect("report should load");
    assert_eq!(report.len(), 3);
    assert!(report.bench().is_some());
    assert!(artifacts.risk_analysis.is_missing());
    assert_eq!(artifacts.indicators.loaded().unwrap().turnover(), Some(&[0.2][..]));
}

#[test]
fn malformed_artifact_does_not_block_the_rest() {
    let root = tempfile::tempdir().unwrap();
    let layout = ArtifactLayout::default();
    experiment(root.path(), "1", "workflow");
    run(root.path(), "1", "abc", Some(1_700_000_000_000));
    artifact(root.path(), "1", "abc", &layout.portfolio_report, "datetime,bench\n2024-01-02,0.1\n");
    artifact(
        root.path(),
        "1",
        "abc",
        &layout.risk_analysis,
        "group,metric,risk\nexcess_return_with_cost,information_ratio,1.1\n",
    );

    let store = TrackingStore::open(root.path()).unwrap();
    let artifacts = store.load_artifacts("1", "abc", &layout).unwrap();

    match &artifacts.report {
        ArtifactStatus::Malformed { reason, .. } => assert!(reason.contains("return")),
        other => panic!("expected malformed report, got {other:?}"),
    }
    let risk = artifacts.risk_analysis.loaded().unwrap();
    assert_eq!(risk.get("excess_return_with_cost", "information_ratio"), Some(1.1));
    assert!(artifacts.indicators.is_missing());
}

#[test]
fn report_with_unparseable_number_is_malformed() {
    let root = tempfile::tempdir().unwrap();
    let layout = ArtifactLayout::default();
    experiment(root.path(), "1", "workflow");
    run(root.path(), "1", "abc", Some(1_700_000_000_000));
    artifact(
        root.path(),
        "1",
        "abc",
        &layout.portfolio_report,
        "datetime,return\n2024-01-02,0.01\n2024-01-03,oops\n2024-01-04,0.02\n",
    );

    let store = TrackingStore::open(root.path()).unwrap();
    let artifacts = store.load_artifacts("1", "abc", &layout).unwrap();

    match &artifacts.report {
        ArtifactStatus::Malformed { reason, .. } => assert!(reason.contains("oops")),
        other => panic!("expected malformed report, got {other:?}"),
    }
}

#[test]
fn scanning_does_not_modify_the_store() {
    let root = tempfile::tempdir().unwrap();
    let layout = ArtifactLayout::default();
    experiment(root.path(), "1", "workflow");
    run(root.path(), "1", "abc", Some(1_700_000_000_000));
    artifact(root.path(), "1", "abc", &layout.portfolio_report, REPORT);

    let snapshot = |dir: &Path| {
        let mut seen = Vec::new();
        let mut stack = vec![dir.to_path_buf()];
        while let Some(path) = stack.pop() {
            for entry in fs::read_dir(&path).unwrap().flatten() {
                let p = entry.path();
                if p.is_dir() {
                    stack.push(p.clone());
                }
                seen.push(p);
            }
        }
        seen.sort();
        seen
    };

    let before = snapshot(root.path());
    let store = TrackingStore::open(root.path()).unwrap();
    store.list_experiments().unwrap();
    store.list_runs("1").unwrap();
    store.load_artifacts("1", "abc", &layout).unwrap();
    assert_eq!(before, snapshot(root.path()));
}
