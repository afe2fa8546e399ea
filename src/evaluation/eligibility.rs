//! Who is due a probationary review today.
//!
//! Works on the raw sheet rather than the filtered hiring records: every
//! admitted person is reviewed regardless of role or status.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use super::rubric::EvaluationType;
use crate::db::{DbError, EvaluationStore};
use crate::dates::{days_between, format_br, parse_cell};
use crate::sheet::Table;

pub const NAME_COLUMN: usize = 0;
pub const ROLE_COLUMN: usize = 1;
/// Admission-document date.
pub const ADMISSION_COLUMN: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibleEmployee {
    pub name: String,
    pub role: String,
    #[serde(skip)]
    pub admitted_at: NaiveDateTime,
    /// `dd/mm/yyyy`
    pub admission_date: String,
    pub days_since_admission: i64,
    pub evaluation_type: EvaluationType,
    pub already_evaluated: bool,
}

/// Bucket for a day count, if it falls inside a review window.
pub fn classify(days_since_admission: i64) -> Option<EvaluationType> {
    EvaluationType::ALL
        .into_iter()
        .find(|t| t.window().contains(&days_since_admission))
}

/// Rows whose admission date puts them inside a review window on `today`.
/// Rows without a parseable admission date are skipped. Days are counted
/// between calendar dates; a time of day on the admission cell is ignored.
pub fn scan(table: &Table, today: NaiveDate) -> Vec<EligibleEmployee> {
    if table.column_count() <= ADMISSION_COLUMN {
        log::warn!(
            "Eligibility scan needs at least {} columns, sheet has {}",
            ADMISSION_COLUMN + 1,
            table.column_count()
        );
        return Vec::new();
    }

    let today = today.and_time(NaiveTime::MIN);
    let mut eligible = Vec::new();

    for row in 0..table.row_count() {
        let Some(admitted_at) = parse_cell(table.cell(row, ADMISSION_COLUMN)) else {
            continue;
        };
        let admission_day = admitted_at.date().and_time(NaiveTime::MIN);
        let Some(days) = days_between(Some(admission_day), Some(today)) else {
            continue;
        };
        let Some(evaluation_type) = classify(days) else {
            continue;
        };

        eligible.push(EligibleEmployee {
            name: table.cell(row, NAME_COLUMN).as_text().unwrap_or_default(),
            role: table.cell(row, ROLE_COLUMN).as_text().unwrap_or_default(),
            admitted_at,
            admission_date: format_br(Some(admitted_at)),
            days_since_admission: days,
            evaluation_type,
            already_evaluated: false,
        });
    }

    log::debug!("{} employees inside a review window", eligible.len());
    eligible
}

/// Fill in `already_evaluated` from the store.
pub fn mark_evaluated(
    eligible: &mut [EligibleEmployee],
    store: &EvaluationStore,
) -> Result<(), DbError> {
    for employee in eligible.iter_mut() {
        employee.already_evaluated =
            store.already_evaluated(&employee.name, employee.evaluation_type.label())?;
    }
    Ok(())
}

/// Split into (40-day, 80-day) lists.
pub fn split_by_type(
    eligible: Vec<EligibleEmployee>,
) -> (Vec<EligibleEmployee>, Vec<EligibleEmployee>) {
    eligible
        .into_iter()
        .partition(|e| e.evaluation_type == EvaluationType::FortyDays)
}
