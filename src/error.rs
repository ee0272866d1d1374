use crate::config::ConfigError;
use crate::storage::StorageError;
use crate::telemetry::TelemetryError;
use crate::workflows::admission::{PipelineError, RepositoryError};
use crate::workflows::notifications::NotificationError;
use crate::workflows::registry::RegistryError;
use crate::workflows::targets::{TargetError, TargetExportError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Pipeline(PipelineError),
    Registry(RegistryError),
    Notifications(NotificationError),
    Targets(TargetError),
    Storage(StorageError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Pipeline(PipelineError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Pipeline(PipelineError::NotFound(_))
            | AppError::Pipeline(PipelineError::Repository(RepositoryError::NotFound(_))) => {
                StatusCode::NOT_FOUND
            }
            AppError::Registry(RegistryError::MemberNotFound(_))
            | AppError::Notifications(NotificationError::NotFound(_))
            | AppError::Targets(TargetError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Registry(
                RegistryError::ProfileNotCompleted(_)
                | RegistryError::DecisionNotApproved(_)
                | RegistryError::AlreadyConverted(_)
                | RegistryError::AlreadyOfficial(_)
                | RegistryError::MissingDecisionNumber,
            )
            | AppError::Targets(TargetError::MissingUnit | TargetError::NonPositiveTarget) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Pipeline(PipelineError::Repository(_))
            | AppError::Registry(RegistryError::Storage(_))
            | AppError::Notifications(NotificationError::Storage(_))
            | AppError::Targets(TargetError::Storage(_))
            | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Pipeline(err) => write!(f, "{}", err),
            AppError::Registry(err) => write!(f, "{}", err),
            AppError::Notifications(err) => write!(f, "{}", err),
            AppError::Targets(err) => write!(f, "{}", err),
            AppError::Storage(err) => write!(f, "storage error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Pipeline(err) => Some(err),
            AppError::Registry(err) => Some(err),
            AppError::Notifications(err) => Some(err),
            AppError::Targets(err) => Some(err),
            AppError::Storage(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<PipelineError> for AppError {
    fn from(value: PipelineError) -> Self {
        Self::Pipeline(value)
    }
}

impl From<RegistryError> for AppError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

impl From<NotificationError> for AppError {
    fn from(value: NotificationError) -> Self {
        Self::Notifications(value)
    }
}

impl From<TargetError> for AppError {
    fn from(value: TargetError) -> Self {
        Self::Targets(value)
    }
}

impl From<StorageError> for AppError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<TargetExportError> for AppError {
    fn from(value: TargetExportError) -> Self {
        match value {
            TargetExportError::Targets(err) => Self::Targets(err),
            other => Self::Io(std::io::Error::new(std::io::ErrorKind::Other, other.to_string())),
        }
    }
}
