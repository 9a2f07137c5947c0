//! # Run Analytics
//!
//! Derives performance metrics from the artifacts of a recorded run and
//! assembles the dashboard view.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** this crate has no knowledge of the filesystem or the web
//!   server. It depends only on `core-types`.
//! - **Stateless calculation:** `AnalyticsEngine` takes a `PortfolioReport`
//!   and produces a `PerformanceReport`. Nothing is cached; every view is
//!   computed from the artifacts handed in.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: the calculation entry point.
//! - `PerformanceReport`: curves and risk figures of one run.
//! - `build_run_view` / `RunView`: cards, summary table, charts and notices.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod report;
pub mod risk;

// Re-export the key components to create a clean, public-facing API.
pub use dashboard::{Chart, ChartKind, Notice, NoticeLevel, RunView, build_run_view};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::{ExcessFlavor, PerformanceReport};
pub use risk::{HistogramBin, RiskMetrics};
