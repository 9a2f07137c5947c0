//! # Tracking Store Reader
//!
//! Read-only access to the file store written by the external experiment
//! tracking tool:
//!
//! ```text
//! <root>/<experiment_id>/meta.yaml
//! <root>/<experiment_id>/<run_id>/meta.yaml
//! <root>/<experiment_id>/<run_id>/params/<key>
//! <root>/<experiment_id>/<run_id>/metrics/<key>
//! <root>/<experiment_id>/<run_id>/artifacts/<relative path>
//! ```
//!
//! The crate never writes below the root.

pub mod artifacts;
pub mod error;
pub mod meta;
pub mod store;

pub use error::{ArtifactError, StoreError};
pub use store::TrackingStore;
