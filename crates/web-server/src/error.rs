use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracking_store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Tracking store error: {0}")]
    Store(#[from] StoreError),
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Path problems are answered with a readable message so the page can show a
/// "path not found" state instead of failing.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Store(store_err) => match store_err {
                StoreError::RootNotFound(_)
                | StoreError::ExperimentNotFound(_)
                | StoreError::RunNotFound { .. } => (StatusCode::NOT_FOUND, store_err.to_string()),
                StoreError::RootUnreadable { .. } => {
                    tracing::error!(error = %store_err, "Tracking directory unreadable.");
                    (StatusCode::INTERNAL_SERVER_ERROR, store_err.to_string())
                }
                StoreError::InvalidIdentifier { .. } => {
                    (StatusCode::BAD_REQUEST, store_err.to_string())
                }
                StoreError::Io { .. } => {
                    tracing::error!(error = ?store_err, "Tracking store error.");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An error occurred while reading the tracking store".to_string(),
                    )
                }
            },
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};
    use std::path::PathBuf;

    fn status_of(err: StoreError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn unreadable_root_is_a_server_error() {
        let err = StoreError::RootUnreadable {
            path: PathBuf::from("/srv/mlruns"),
            source: Error::new(ErrorKind::PermissionDenied, "permission denied"),
        };
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn store_errors_map_to_client_statuses() {
        assert_eq!(
            status_of(StoreError::RootNotFound(PathBuf::from("/nowhere"))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(StoreError::InvalidIdentifier {
                kind: "run",
                value: "../1".to_string(),
            }),
            StatusCode::BAD_REQUEST
        );
    }
}
