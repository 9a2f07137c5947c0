use crate::error::ConfigError;
use core_types::ArtifactKind;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an empty configuration is valid.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub tracking: TrackingSettings,
    pub artifacts: ArtifactLayout,
    pub analytics: AnalyticsSettings,
    pub server: ServerSettings,
    pub logging: LogSettings,
}

impl Config {
    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analytics.trading_days_per_year == 0 {
            return Err(ConfigError::ValidationError(
                "analytics.trading_days_per_year must be greater than zero".into(),
            ));
        }
        if self.analytics.histogram_bins == 0 {
            return Err(ConfigError::ValidationError(
                "analytics.histogram_bins must be greater than zero".into(),
            ));
        }
        for kind in ArtifactKind::ALL {
            let path = self.artifacts.relative_path(kind);
            let escapes = Path::new(path)
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if path.trim().is_empty() || escapes {
                return Err(ConfigError::ValidationError(format!(
                    "artifact path for {kind} must be a non-empty relative path inside the run, got '{path}'"
                )));
            }
        }
        self.server.socket_addr()?;
        Ok(())
    }
}

/// Where the external tracking tool keeps its run records.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackingSettings {
    /// Root of the file store; holds one directory per experiment.
    pub root_dir: PathBuf,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("qlib/mlruns"),
        }
    }
}

/// Relative locations of each artifact type under a run's `artifacts/` directory.
///
/// These names belong to the research framework and the tracking tool, not to
/// us. `layout_version` records which release of that convention the paths
/// were verified against.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ArtifactLayout {
    pub layout_version: String,
    pub portfolio_report: String,
    pub risk_analysis: String,
    pub indicators: String,
}

impl ArtifactLayout {
    pub fn relative_path(&self, kind: ArtifactKind) -> &str {
        match kind {
            ArtifactKind::PortfolioReport => &self.portfolio_report,
            ArtifactKind::RiskAnalysis => &self.risk_analysis,
            ArtifactKind::Indicators => &self.indicators,
        }
    }
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self {
            layout_version: "qlib-portfolio-analysis-1day/v1".to_string(),
            portfolio_report: "portfolio_analysis/report_normal_1day.csv".to_string(),
            risk_analysis: "portfolio_analysis/port_analysis_1day.csv".to_string(),
            indicators: "portfolio_analysis/indicators_normal_1day.csv".to_string(),
        }
    }
}

/// Parameters for the derived performance metrics.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// Number of trading periods in a year, used to annualize daily statistics.
    pub trading_days_per_year: u32,
    /// Bin count for the excess return distribution chart.
    pub histogram_bins: usize,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            trading_days_per_year: 252,
            histogram_bins: 40,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::ValidationError(format!("invalid server address: {e}")))
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "runscope.log".to_string(),
        }
    }
}
