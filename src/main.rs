use analytics::{AnalyticsEngine, NoticeLevel, RunView, build_run_view};
use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::{Config, ConfigArgs};
use tracking_store::TrackingStore;

/// The main entry point for the run inspector.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment overrides may live in a .env file; it is optional.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = cli
        .config
        .load()
        .context("Failed to load configuration")?;
    let _log_guard = configuration::init_tracing(&config.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => {
            if let Some(host) = args.host {
                config.server.host = host;
            }
            if let Some(port) = args.port {
                config.server.port = port;
            }
            web_server::run_server(config).await
        }
        Commands::Experiments => handle_experiments(&config),
        Commands::Runs(args) => handle_runs(&config, &args.experiment_id),
        Commands::Inspect(args) => handle_inspect(&config, &args.experiment_id, &args.run_id),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Browse experiment runs recorded by the tracking tool and inspect their metrics.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard in a browser.
    Serve(ServeArgs),
    /// List the experiments in the tracking directory.
    Experiments,
    /// List the runs of an experiment, most recent first.
    Runs(RunsArgs),
    /// Print the derived metrics of a single run.
    Inspect(InspectArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Address to bind (overrides `server.host`).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides `server.port`).
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Parser)]
struct RunsArgs {
    experiment_id: String,
}

#[derive(Parser)]
struct InspectArgs {
    experiment_id: String,
    run_id: String,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn open_store(config: &Config) -> anyhow::Result<TrackingStore> {
    TrackingStore::open(&config.tracking.root_dir).context("Cannot open tracking directory")
}

fn handle_experiments(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let experiments = store.list_experiments()?;

    if experiments.is_empty() {
        println!("No experiments found in {}", store.root().display());
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["ID", "Name", "Artifact location"]);
    for experiment in experiments {
        table.add_row(vec![
            experiment.experiment_id,
            experiment.name,
            experiment.artifact_location.unwrap_or_default(),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn handle_runs(config: &Config, experiment_id: &str) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let runs = store.list_runs(experiment_id)?;

    if runs.is_empty() {
        println!("No runs recorded for experiment {experiment_id}");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Run ID", "Name", "Status", "Started", "Ended"]);
    for run in runs {
        table.add_row(vec![
            run.run_id,
            run.run_name.unwrap_or_default(),
            run.status.to_string(),
            format_time(run.start_time),
            format_time(run.end_time),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn handle_inspect(config: &Config, experiment_id: &str, run_id: &str) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let run = store.run(experiment_id, run_id)?;
    let artifacts = store.load_artifacts(experiment_id, run_id, &config.artifacts)?;

    let engine = AnalyticsEngine::new(
        config.analytics.trading_days_per_year,
        config.analytics.histogram_bins,
    );
    let view = build_run_view(&engine, experiment_id, run_id, &artifacts);

    println!(
        "Run {} ({}) · {}",
        run.run_id,
        run.run_name.as_deref().unwrap_or("unnamed"),
        run.status
    );
    print_view(&view);
    Ok(())
}

fn print_view(view: &RunView) {
    for notice in &view.notices {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
        };
        println!("[{tag}] {}", notice.message);
    }

    let mut cards = Table::new();
    cards.load_preset(UTF8_FULL).set_header(vec!["Metric", "Value"]);
    for card in &view.cards {
        cards.add_row(vec![card.label.as_str(), card.value.as_str()]);
    }
    println!("{cards}");

    if !view.summary.is_empty() {
        let with_cost = view.summary.iter().any(|row| row.with_cost.is_some());
        let mut summary = Table::new();
        let mut header = vec!["Metric", "Without cost"];
        if with_cost {
            header.push("With cost");
        }
        summary.load_preset(UTF8_FULL).set_header(header);
        for row in &view.summary {
            let mut cells = vec![row.metric.clone(), row.without_cost.clone()];
            if with_cost {
                cells.push(row.with_cost.clone().unwrap_or_default());
            }
            summary.add_row(cells);
        }
        println!("{summary}");
    }

    if !view.recorded_risk.is_empty() {
        let mut recorded = Table::new();
        recorded
            .load_preset(UTF8_FULL)
            .set_header(vec!["Group", "Metric", "Recorded value"]);
        for entry in &view.recorded_risk {
            recorded.add_row(vec![
                entry.group.clone(),
                entry.metric.clone(),
                format!("{:.6}", entry.value),
            ]);
        }
        println!("{recorded}");
    }

    let charts: Vec<&str> = view.charts.iter().map(|c| c.title.as_str()).collect();
    if !charts.is_empty() {
        println!("Charts available in the dashboard: {}", charts.join(", "));
    }
}
