//! Shared type definitions for the database layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),
}

/// A row from the `evaluations` table.
///
/// Rubric answers are stored as the answer text the evaluator picked, so a
/// later change to the canned wording never rewrites history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbEvaluation {
    pub id: String,
    pub evaluator_name: String,
    pub evaluator_role: String,
    pub employee_name: String,
    pub employee_role: String,
    /// `40 dias` / `80 dias`; empty for rows written before the type existed.
    pub evaluation_type: String,
    pub attendance: String,
    pub safety: String,
    pub productivity: String,
    pub teamwork: String,
    pub classification: String,
    pub decision: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// RFC 3339, UTC.
    pub created_at: String,
}
