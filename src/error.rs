use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed nutrition data: {0}")]
    MalformedNutrition(#[from] serde_json::Error),
    #[error("Invalid nutrition record `{key}`: {reason}")]
    InvalidRecord { key: String, reason: String },
    #[error("No labels found in {0:?}")]
    EmptyLabels(PathBuf),
}

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Error decoding image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("Error processing image: {0}")]
    Processing(String),
}

impl PredictError {
    /// Folds every pipeline failure into a processing error, keeping its text as the cause.
    /// Input validation errors pass through untouched.
    pub fn into_processing(self) -> Self {
        match self {
            PredictError::InvalidInput(_) | PredictError::Processing(_) => self,
            other => PredictError::Processing(other.to_string()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            PredictError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PredictError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PredictError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PredictError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub detail: String,
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Prediction failed: {}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }

        (
            status,
            Json(ErrorResponse {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PredictError::InvalidInput("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PredictError::Inference("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            PredictError::Processing("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_into_processing_keeps_cause() {
        let err = PredictError::Inference("session mutex poisoned".into()).into_processing();
        assert_eq!(
            err.to_string(),
            "Error processing image: Inference failed: session mutex poisoned"
        );

        let err = PredictError::InvalidInput("not an image".into()).into_processing();
        assert!(matches!(err, PredictError::InvalidInput(_)));
    }
}
