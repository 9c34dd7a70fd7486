use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rendezvous_domain::common::DomainError;
use rendezvous_workflow::errors::WorkflowError;
use thiserror::Error;

use crate::dto::response::ErrorResponse;

// =============================================================================
// ApiError
// =============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{entity_type} with identifier '{identifier}' not found")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    #[error("Internal server error: {message}")]
    InternalError { message: String },
}

// =============================================================================
// Factory Methods
// =============================================================================

impl ApiError {
    #[must_use]
    pub fn not_found(entity_type: impl Into<String>, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            identifier: identifier.to_string(),
        }
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

// =============================================================================
// Query Methods
// =============================================================================

impl ApiError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::ValidationError { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn error_code(&self) -> String {
        match self {
            Self::NotFound { entity_type, .. } => {
                format!("{}_NOT_FOUND", to_screaming_snake(entity_type))
            }
            Self::ValidationError { .. } => "VALIDATION_ERROR".to_string(),
            Self::Conflict { .. } => "CONFLICT".to_string(),
            Self::InternalError { .. } => "INTERNAL_ERROR".to_string(),
        }
    }
}

/// `SurveyQuestion` -> `SURVEY_QUESTION`.
fn to_screaming_snake(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    for (index, character) in name.chars().enumerate() {
        if character.is_uppercase() && index > 0 {
            result.push('_');
        }
        result.push(character.to_ascii_uppercase());
    }
    result
}

// =============================================================================
// Conversions
// =============================================================================

impl From<WorkflowError> for ApiError {
    fn from(error: WorkflowError) -> Self {
        match error {
            WorkflowError::NotFound {
                entity_type,
                identifier,
            } => Self::NotFound {
                entity_type,
                identifier,
            },
            WorkflowError::Validation(error) => Self::from(error),
            WorkflowError::Conflict { reason } => Self::Conflict { reason },
            error @ (WorkflowError::Repository { .. } | WorkflowError::Cache { .. }) => {
                tracing::error!("Request failed: {}", error);
                Self::internal("the service is temporarily unavailable")
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        if error.is_invalid_transition() || error.is_capacity_exceeded() {
            Self::conflict(error.to_string())
        } else {
            Self::validation(error.to_string())
        }
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = ErrorResponse::new(self.error_code(), self.to_string());

        (status_code, Json(error_response)).into_response()
    }
}

// =============================================================================
// Tests
// =============================================================================
