//! Unified error handling with Sentry integration.
//!
//! Every error leaves the service as JSON `{ "name": ..., "message": ... }`.
//! Domain rejections and validation failures are 422; everything else is a
//! 500 with a generic message, captured to Sentry first.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::FarmError;

/// Application-level error type for the farms API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Farm operation failed.
    #[error(transparent)]
    Farm(#[from] FarmError),

    /// Request body failed validation before reaching the engine.
    #[error("{0}")]
    Validation(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        Self::Farm(FarmError::Repository(err))
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub name: &'static str,
    pub message: String,
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Farm(err) => !err.is_domain(),
            Self::Validation(_) => false,
        }
    }

    fn body(&self) -> ErrorBody {
        if self.is_server_error() {
            // Don't expose internal error details to clients
            return ErrorBody {
                name: "InternalError",
                message: "Internal server error".to_owned(),
            };
        }

        let name = match self {
            Self::Farm(err) => err.kind(),
            Self::Validation(_) => "ValidationError",
        };
        ErrorBody {
            name,
            message: self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.is_server_error() {
            // Capture server errors to Sentry
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            tracing::debug!(error = %self, "Request rejected");
            StatusCode::UNPROCESSABLE_ENTITY
        };

        (status, Json(self.body())).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use farm_report_core::{FarmId, UserId};

    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_domain_errors_are_422_with_name_and_message() {
        let farm = FarmId::generate();
        let (status, body) = render(FarmError::FarmNotFound(farm).into()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["name"], "FarmNotFound");
        assert_eq!(body["message"], format!("Farm with id: {farm} doesn't exist"));
    }

    #[tokio::test]
    async fn test_every_domain_kind_is_422() {
        let user = UserId::generate();
        let farm = FarmId::generate();
        for err in [
            FarmError::CredentialInvalid("Invalid token".to_owned()),
            FarmError::CredentialExpired("Token has expired".to_owned()),
            FarmError::UnknownCaller(user),
            FarmError::NotOwner { caller: user, farm },
            FarmError::NoFarmsFound,
        ] {
            let kind = err.kind();
            let (status, body) = render(err.into()).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(body["name"], kind);
        }
    }

    #[tokio::test]
    async fn test_validation_error() {
        let (status, body) = render(AppError::Validation("name must not be empty".to_owned())).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["name"], "ValidationError");
        assert_eq!(body["message"], "name must not be empty");
    }

    #[tokio::test]
    async fn test_repository_errors_are_opaque_500() {
        let err: AppError = RepositoryError::DataCorruption("bad point".to_owned()).into();
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["name"], "InternalError");
        assert_eq!(body["message"], "Internal server error");
    }
}
