//! Probationary (40/80-day) evaluation workflow.
//!
//! Modules:
//! - rubric: categories, canned answers, classification, decisions
//! - eligibility: which admitted employees are inside a review window
//! - submit: validate, persist, render
//! - pdf: printable document
//! - export: history as an xlsx workbook or CSV

pub mod eligibility;
pub mod export;
pub mod pdf;
pub mod rubric;
pub mod submit;

use thiserror::Error;

use crate::db::DbError;

pub use eligibility::{scan, EligibleEmployee};
pub use rubric::{Category, Classification, Criterion, EvaluationType, RUBRIC};
pub use submit::{submit, EvaluationForm, SubmissionOutcome};

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("Required field is empty: {0}")]
    MissingField(&'static str),

    #[error("'{answer}' is not an option for {category}")]
    InvalidAnswer {
        category: &'static str,
        answer: String,
    },

    #[error("'{decision}' is not a valid decision for a {evaluation_type} review")]
    InvalidDecision {
        evaluation_type: &'static str,
        decision: String,
    },

    #[error("Unknown evaluation type: {0}")]
    UnknownType(String),

    #[error("Unknown classification: {0}")]
    UnknownClassification(String),

    #[error(transparent)]
    Storage(#[from] DbError),
}
