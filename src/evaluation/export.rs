//! Evaluation history as a downloadable workbook (`.xlsx`) or CSV.

use std::path::Path;

use crate::db::DbEvaluation;
use crate::sheet::{write_workbook, Cell, SheetError, Table};

pub const EXPORT_HEADERS: [&str; 14] = [
    "ID",
    "Data",
    "Tipo",
    "Colaborador",
    "Função",
    "Avaliador",
    "Cargo do Avaliador",
    "Assiduidade e Pontualidade",
    "Segurança do Trabalho",
    "Qualidade e Produtividade",
    "Trabalho em Equipe e Conduta",
    "Classificação",
    "Decisão",
    "Observações",
];

const SHEET_NAME: &str = "Avaliações";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    /// `.csv` (any case) exports CSV; everything else gets a workbook.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Xlsx,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV flush: {0}")]
    Flush(String),
    #[error("Workbook: {0}")]
    Workbook(#[from] SheetError),
}

fn row_values(e: &DbEvaluation) -> [&str; 14] {
    [
        &e.id,
        &e.created_at,
        &e.evaluation_type,
        &e.employee_name,
        &e.employee_role,
        &e.evaluator_name,
        &e.evaluator_role,
        &e.attendance,
        &e.safety,
        &e.productivity,
        &e.teamwork,
        &e.classification,
        &e.decision,
        e.comments.as_deref().unwrap_or(""),
    ]
}

/// One header row, then one row per evaluation in the given order.
pub fn evaluations_csv(evaluations: &[DbEvaluation]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADERS)?;
    for evaluation in evaluations {
        writer.write_record(row_values(evaluation))?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.to_string()))
}

/// Same layout as the CSV, as a single-sheet workbook.
pub fn evaluations_xlsx(evaluations: &[DbEvaluation]) -> Result<Vec<u8>, ExportError> {
    let headers = EXPORT_HEADERS.iter().map(|h| h.to_string()).collect();
    let rows = evaluations
        .iter()
        .map(|e| {
            row_values(e)
                .iter()
                .map(|v| {
                    if v.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(v.to_string())
                    }
                })
                .collect()
        })
        .collect();
    Ok(write_workbook(&Table::new(headers, rows), SHEET_NAME)?)
}

pub fn render_export(
    evaluations: &[DbEvaluation],
    format: ExportFormat,
) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Xlsx => evaluations_xlsx(evaluations),
        ExportFormat::Csv => evaluations_csv(evaluations),
    }
}
