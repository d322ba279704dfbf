use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::deployment::ProvisioningStep;

pub type Result<T> = std::result::Result<T, ProvisionError>;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Company not found: {0}")]
    NotFound(String),

    #[error("Tenant store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Deployment provider failed during {step}: {message}")]
    ExternalService {
        step: ProvisioningStep,
        message: String,
    },

    #[error("Deployment provider timed out during {step} after {}s", .after.as_secs())]
    Timeout {
        step: ProvisioningStep,
        after: Duration,
    },

    #[error("Failed to record service endpoint: {0}")]
    Persistence(String),
}

impl ProvisionError {
    pub fn external(step: ProvisioningStep, message: impl Into<String>) -> Self {
        Self::ExternalService {
            step,
            message: message.into(),
        }
    }

    /// Stable label used in log fields and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "ConfigError",
            Self::InvalidInput(_) => "InvalidInput",
            Self::NotFound(_) => "NotFound",
            Self::StoreUnavailable(_) => "StoreUnavailable",
            Self::ExternalService { .. } => "ExternalServiceError",
            Self::Timeout { .. } => "Timeout",
            Self::Persistence(_) => "PersistenceError",
        }
    }

    /// The deployment step the error is attributed to, if any.
    pub fn step(&self) -> Option<ProvisioningStep> {
        match self {
            Self::ExternalService { step, .. } | Self::Timeout { step, .. } => Some(*step),
            _ => None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::ExternalService { .. } => StatusCode::BAD_GATEWAY,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::Config(_) | Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProvisionError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
