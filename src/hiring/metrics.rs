//! Per-candidate mobilization metrics (pure math, no I/O).

use chrono::NaiveDateTime;
use serde::Serialize;

use super::{HiringRecord, ALERT_THRESHOLD_DAYS};
use crate::dates::{days_between, later_of, latest};

/// Derived, non-persisted values for one candidate. All gaps are whole days
/// and `None` when either side is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MobilizationMetrics {
    /// Latest milestone after the job opening.
    pub last_date: Option<NaiveDateTime>,
    /// `last_date - opening`; negative when the sheet has the opening late.
    pub total_mobilization: Option<i64>,
    pub opening_to_docs: Option<i64>,
    pub admission_to_last: Option<i64>,
    pub docs_to_medical: Option<i64>,
    pub medical_to_admission: Option<i64>,
    /// Later of safety training and admission docs.
    pub adjusted_safety_training: Option<NaiveDateTime>,
    /// `|adjusted_safety_training - admission_docs|`.
    pub admission_to_safety_training: Option<i64>,
    pub safety_training_to_vendor_inclusion: Option<i64>,
    pub vendor_inclusion_to_approval: Option<i64>,
    pub vendor_approval_to_orientation: Option<i64>,
    /// Later of partner integration and safety orientation.
    pub adjusted_integration: Option<NaiveDateTime>,
    /// `|adjusted_integration - safety_orientation|`.
    pub orientation_to_integration: Option<i64>,
    /// `YYYY-MM` of the opening date.
    pub opening_month: Option<String>,
    pub alert_30_days: bool,
}

/// A reshaped record with its metrics attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedRecord {
    #[serde(flatten)]
    pub record: HiringRecord,
    pub metrics: MobilizationMetrics,
}

/// Compute every metric for a single record.
pub fn compute(record: &HiringRecord) -> MobilizationMetrics {
    let m = &record.milestones;

    let last_date = latest(m.after_opening());
    let total_mobilization = days_between(m.opening, last_date);

    let adjusted_safety_training = later_of(m.safety_training, m.admission_docs);
    let adjusted_integration = later_of(m.partner_integration, m.safety_orientation);

    MobilizationMetrics {
        last_date,
        total_mobilization,
        opening_to_docs: days_between(m.opening, m.docs_received),
        admission_to_last: days_between(m.admission_docs, last_date),
        docs_to_medical: days_between(m.docs_received, m.medical_clearance),
        medical_to_admission: days_between(m.medical_clearance, m.admission_docs),
        adjusted_safety_training,
        admission_to_safety_training: days_between(m.admission_docs, adjusted_safety_training)
            .map(i64::abs),
        safety_training_to_vendor_inclusion: days_between(
            adjusted_safety_training,
            m.vendor_inclusion,
        ),
        vendor_inclusion_to_approval: days_between(m.vendor_inclusion, m.vendor_approval),
        vendor_approval_to_orientation: days_between(m.vendor_approval, m.safety_orientation),
        adjusted_integration,
        orientation_to_integration: days_between(m.safety_orientation, adjusted_integration)
            .map(i64::abs),
        opening_month: m.opening.map(|d| d.format("%Y-%m").to_string()),
        alert_30_days: total_mobilization.is_some_and(|days| days > ALERT_THRESHOLD_DAYS),
    }
}

/// Attach metrics to every record, preserving order.
pub fn derive_metrics(records: Vec<HiringRecord>) -> Vec<ProcessedRecord> {
    records
        .into_iter()
        .map(|record| {
            let metrics = compute(&record);
            ProcessedRecord { record, metrics }
        })
        .collect()
}
