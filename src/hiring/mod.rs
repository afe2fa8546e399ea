//! Mobilization tracking for new field hires.
//!
//! Pipeline: positional reshape of the hiring spreadsheet → role and status
//! filtering → per-row date metrics → dashboard aggregation.

pub mod dashboard;
pub mod metrics;
pub mod reshape;

use chrono::NaiveDateTime;
use serde::Serialize;

pub use metrics::{derive_metrics, MobilizationMetrics, ProcessedRecord};
pub use reshape::{filter_records, process, reshape, ColumnMismatch};

/// Roles tracked by the dashboard; everything else is dropped.
pub const TRACKED_ROLES: &[&str] = &[
    "AJUDANTE DE SERVIÇOS GERAIS",
    "ELETRICISTA",
    "O.P DE RETROESCAVADEIRA",
    "OP. DE MOTOSSERA",
    "MOTORISTA OPERADOR DE MUNCK",
];

/// Status / clearance value marking a candidate that was not hired.
pub const NOT_HIRED: &str = "NÃO CONTRATADO";

/// Alert threshold for total mobilization time, in days.
pub const ALERT_THRESHOLD_DAYS: i64 = 30;

/// The nine onboarding milestones, in spreadsheet order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestones {
    pub opening: Option<NaiveDateTime>,
    pub docs_received: Option<NaiveDateTime>,
    /// Medical clearance (ASO).
    pub medical_clearance: Option<NaiveDateTime>,
    pub admission_docs: Option<NaiveDateTime>,
    /// Safety training (NRs) completion.
    pub safety_training: Option<NaiveDateTime>,
    pub vendor_inclusion: Option<NaiveDateTime>,
    pub vendor_approval: Option<NaiveDateTime>,
    /// Safety orientation (POP).
    pub safety_orientation: Option<NaiveDateTime>,
    pub partner_integration: Option<NaiveDateTime>,
}

impl Milestones {
    /// Every milestone after the job opening.
    pub fn after_opening(&self) -> [Option<NaiveDateTime>; 8] {
        [
            self.docs_received,
            self.medical_clearance,
            self.admission_docs,
            self.safety_training,
            self.vendor_inclusion,
            self.vendor_approval,
            self.safety_orientation,
            self.partner_integration,
        ]
    }
}

/// One candidate row of the hiring spreadsheet after reshaping.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HiringRecord {
    pub name: Option<String>,
    pub role: Option<String>,
    pub regional: Option<String>,
    pub city: Option<String>,
    pub milestones: Milestones,
    pub status: Option<String>,
    pub field_clearance: Option<String>,
}
