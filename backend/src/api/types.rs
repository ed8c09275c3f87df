//! REST API types for the dashboard frontend.
//!
//! Successful responses are the [`crate::DashboardPayload`] itself; failures
//! use the body built by [`error_response`].

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{ErrorKind, PipelineError, ServerError};

/// Message the dashboard shows when no dataset has been supplied.
pub const NOT_FOUND_MESSAGE: &str = "Data file not found";

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Correlates the response with server logs
    pub request_id: String,
    pub error: String,
    /// `source_not_found`, `malformed_source`, `degenerate_input` or `internal`
    pub kind: String,
}

/// HTTP status for a pipeline failure.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::SourceNotFound => StatusCode::NOT_FOUND,
        ErrorKind::DegenerateInput => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::MalformedSource => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn kind_name(kind: ErrorKind) -> String {
    match serde_json::to_value(kind) {
        Ok(Value::String(s)) => s,
        _ => format!("{:?}", kind),
    }
}

/// Status and JSON body for a server error.
pub fn error_response(err: &ServerError) -> (StatusCode, Value) {
    let (status, message, kind) = match err {
        ServerError::Pipeline(e) => {
            let kind = e.kind();
            (status_for(kind), pipeline_message(e), kind_name(kind))
        }
        ServerError::Internal(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            msg.clone(),
            "internal".to_string(),
        ),
    };

    let body = ErrorBody {
        request_id: Uuid::new_v4().to_string(),
        error: message,
        kind,
    };
    let value = serde_json::to_value(&body).unwrap_or_else(|_| json!({ "error": body.error }));
    (status, value)
}

fn pipeline_message(err: &PipelineError) -> String {
    match err.kind() {
        ErrorKind::SourceNotFound => NOT_FOUND_MESSAGE.to_string(),
        _ => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AnalyticsError, SourceError};
    use std::path::PathBuf;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = ServerError::Pipeline(PipelineError::Source(SourceError::NotFound {
            path: PathBuf::from("data/raw/supply_chain_data.csv"),
        }));
        let (status, body) = error_response(&err);

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Data file not found");
        assert_eq!(body["kind"], "source_not_found");
        assert!(body["requestId"].as_str().is_some());
    }

    #[test]
    fn test_degenerate_maps_to_422() {
        let err = ServerError::Pipeline(AnalyticsError::ZeroUnitsSold.into());
        let (status, body) = error_response(&err);

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "degenerate_input");
    }

    #[test]
    fn test_malformed_maps_to_500() {
        let err = ServerError::Pipeline(
            SourceError::MissingColumn {
                column: "SKU".into(),
            }
            .into(),
        );
        let (status, body) = error_response(&err);

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["kind"], "malformed_source");
        assert!(body["error"].as_str().unwrap().contains("SKU"));
    }

    #[test]
    fn test_internal_error() {
        let (status, body) = error_response(&ServerError::Internal("worker panicked".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["kind"], "internal");
    }
}
