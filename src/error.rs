//! Error types surfaced to the operator.
//!
//! Errors are classified by what the operator can do about them:
//! - Authentication / Configuration: fix credentials or config.json
//! - LookupMiss / Network: the remote spreadsheet could not be reached or found
//! - MalformedInput: the spreadsheet layout or a form value is wrong
//! - MissingResource / Rendering / Storage: local files, PDF output, SQLite

use std::path::PathBuf;
use thiserror::Error;

use crate::db::DbError;
use crate::evaluation::export::ExportError;
use crate::evaluation::pdf::RenderError;
use crate::evaluation::EvaluationError;
use crate::graph_api::GraphApiError;
use crate::sheet::SheetError;

/// Umbrella error for page-level operations.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Spreadsheet not found: {0}")]
    LookupMiss(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Missing file: {0}")]
    MissingResource(PathBuf),

    #[error("Document rendering failed: {0}")]
    Rendering(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AppError {
    /// Returns true if this error requires the operator to change something
    /// before trying again.
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            AppError::Authentication(_) | AppError::Configuration(_) | AppError::MalformedInput(_)
        )
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AppError::Authentication(_) => {
                "Check tenantId, clientId and clientSecret in ~/.hireflow/config.json"
            }
            AppError::LookupMiss(_) => {
                "Confirm the spreadsheet name and that it is .xlsx or .xlsb in the site library."
            }
            AppError::Network(_) => "Check your internet connection and try again.",
            AppError::MalformedInput(_) => "Check the spreadsheet column layout and date values.",
            AppError::MissingResource(_) => "Verify the path in ~/.hireflow/config.json",
            AppError::Rendering(_) => {
                "The evaluation was saved. Regenerate the PDF from the history."
            }
            AppError::Storage(_) => "Check file permissions and disk space.",
            AppError::Configuration(_) => "Check your configuration in ~/.hireflow/config.json",
        }
    }
}

impl From<GraphApiError> for AppError {
    fn from(err: GraphApiError) -> Self {
        match err {
            GraphApiError::AuthFailed(msg) => AppError::Authentication(msg),
            GraphApiError::SiteNotFound(site) => AppError::LookupMiss(format!("site {}", site)),
            GraphApiError::FileNotFound(query) => {
                AppError::LookupMiss(format!("no file matching '{}'", query))
            }
            GraphApiError::Sheet(e) => AppError::MalformedInput(e.to_string()),
            other => AppError::Network(other.to_string()),
        }
    }
}

impl From<SheetError> for AppError {
    fn from(err: SheetError) -> Self {
        AppError::MalformedInput(err.to_string())
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::Rendering(err.to_string())
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::Rendering(err.to_string())
    }
}

impl From<EvaluationError> for AppError {
    fn from(err: EvaluationError) -> Self {
        match err {
            EvaluationError::Storage(e) => AppError::Storage(e.to_string()),
            other => AppError::MalformedInput(other.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

/// Serializable error representation for `--json` output
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub message: String,
    pub error_type: ErrorType,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorType {
    RequiresUserAction,
    Transient,
}

impl From<&AppError> for ErrorReport {
    fn from(err: &AppError) -> Self {
        let error_type = if err.requires_user_action() {
            ErrorType::RequiresUserAction
        } else {
            ErrorType::Transient
        };

        ErrorReport {
            message: err.to_string(),
            error_type,
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}
