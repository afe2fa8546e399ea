// Evaluation service
// Eligibility lists, form submission, history, PDF regeneration and export.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::db::{DbEvaluation, EvaluationStore};
use crate::error::{AppError, ErrorReport};
use crate::evaluation::eligibility::{mark_evaluated, scan, split_by_type};
use crate::evaluation::export::{render_export, ExportFormat};
use crate::evaluation::pdf::write_evaluation_pdf;
use crate::evaluation::submit::{pdf_file_name, submit, EvaluationForm, SubmissionOutcome};
use crate::evaluation::EligibleEmployee;
use crate::sheet::Table;
use crate::types::Config;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityData {
    pub today: NaiveDate,
    pub forty_days: Vec<EligibleEmployee>,
    pub eighty_days: Vec<EligibleEmployee>,
}

/// Result type for the "due for review" page
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EligibilityResult {
    Success { data: EligibilityData },
    Empty { message: String },
    Error { message: String, report: ErrorReport },
}

/// Result type for evaluation history
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HistoryResult {
    Success { data: Vec<DbEvaluation> },
    Empty { message: String },
    Error { message: String, report: ErrorReport },
}

/// Result type for a form submission
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SubmissionResult {
    Success { data: SubmissionOutcome },
    Error { message: String, report: ErrorReport },
}

fn error_parts(err: AppError) -> (String, ErrorReport) {
    let report = ErrorReport::from(&err);
    (err.to_string(), report)
}

fn logo_path(config: &Config) -> Option<&Path> {
    let trimmed = config.logo_path.trim();
    (!trimmed.is_empty()).then(|| Path::new(trimmed))
}

/// Who is due a review on `today`, with already-evaluated flags.
pub fn eligibility_from_table(table: &Table, store: &EvaluationStore, today: NaiveDate) -> EligibilityResult {
    let mut found = scan(table, today);
    if found.is_empty() {
        return EligibilityResult::Empty {
            message: "Nenhum colaborador na janela de 40 ou 80 dias hoje.".to_string(),
        };
    }
    if let Err(e) = mark_evaluated(&mut found, store) {
        log::error!("Could not check existing evaluations: {}", e);
        let (message, report) = error_parts(e.into());
        return EligibilityResult::Error { message, report };
    }
    let (forty_days, eighty_days) = split_by_type(found);
    EligibilityResult::Success {
        data: EligibilityData {
            today,
            forty_days,
            eighty_days,
        },
    }
}

pub async fn get_eligibility(
    config: &Config,
    store: &EvaluationStore,
    today: NaiveDate,
    force: bool,
) -> EligibilityResult {
    match crate::source::load_evaluation_table(config, force).await {
        Ok(table) => eligibility_from_table(&table, store, today),
        Err(e) => {
            let (message, report) = error_parts(e);
            EligibilityResult::Error { message, report }
        }
    }
}

pub fn submit_evaluation(
    config: &Config,
    store: &EvaluationStore,
    form: EvaluationForm,
    out_dir: &Path,
    now: DateTime<Utc>,
) -> SubmissionResult {
    match submit(store, form, logo_path(config), out_dir, now) {
        Ok(data) => SubmissionResult::Success { data },
        Err(e) => {
            log::warn!("Evaluation not saved: {}", e);
            let (message, report) = error_parts(e.into());
            SubmissionResult::Error { message, report }
        }
    }
}

/// Stored evaluations, newest first; only one employee's when `employee` is set.
pub fn get_history(store: &EvaluationStore, employee: Option<&str>) -> HistoryResult {
    let rows = match employee {
        Some(name) => store.list_evaluations_for(name),
        None => store.list_evaluations(),
    };
    match rows {
        Ok(rows) if rows.is_empty() => HistoryResult::Empty {
            message: "Nenhuma avaliação registrada.".to_string(),
        },
        Ok(data) => HistoryResult::Success { data },
        Err(e) => {
            log::error!("Failed to read evaluation history: {}", e);
            let (message, report) = error_parts(e.into());
            HistoryResult::Error { message, report }
        }
    }
}

/// Render a stored evaluation again. Returns the written path.
pub fn regenerate_pdf(
    config: &Config,
    store: &EvaluationStore,
    id: &str,
    out_dir: &Path,
) -> Result<PathBuf, AppError> {
    let evaluation = store
        .get_evaluation(id)?
        .ok_or_else(|| AppError::MalformedInput(format!("No evaluation with id {}", id)))?;
    let path = out_dir.join(pdf_file_name(&evaluation));
    write_evaluation_pdf(&evaluation, logo_path(config), &path)?;
    Ok(path)
}

/// Write the whole history to `path`: CSV for a `.csv` path, otherwise an
/// `.xlsx` workbook. Returns the number of evaluations.
pub fn export_history(store: &EvaluationStore, path: &Path) -> Result<usize, AppError> {
    let rows = store.list_evaluations()?;
    let bytes = render_export(&rows, ExportFormat::from_path(path))?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, bytes)?;
    log::info!("Exported {} evaluations to {}", rows.len(), path.display());
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{sample_evaluation, test_store};
    use crate::sheet::test_support::{headers, text_row};

    fn config(logo: &str) -> Config {
        serde_json::from_value(serde_json::json!({
            "azure": { "tenantId": "t", "clientId": "c", "clientSecret": "s" },
            "logoPath": logo
        }))
        .unwrap()
    }

    #[test]
    fn test_eligibility_page() {
        let store = test_store();
        store
            .insert_evaluation(&sample_evaluation("e1", "Ana Souza", "40 dias", "2025-06-29T10:00:00+00:00"))
            .unwrap();
        let table = Table::new(
            headers(8),
            vec![
                text_row(&["Ana Souza", "ELETRICISTA", "", "", "", "", "", "21/05/2025"]),
                text_row(&["Davi Rocha", "MOTORISTA", "", "", "", "", "", "11/04/2025"]),
            ],
        );
        let today = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();

        match eligibility_from_table(&table, &store, today) {
            EligibilityResult::Success { data } => {
                assert_eq!(data.forty_days.len(), 1);
                assert!(data.forty_days[0].already_evaluated);
                assert_eq!(data.eighty_days.len(), 1);
                assert_eq!(data.eighty_days[0].days_since_admission, 80);
                assert!(!data.eighty_days[0].already_evaluated);
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_eligibility_empty() {
        let store = test_store();
        let table = Table::new(headers(8), vec![]);
        let today = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        assert!(matches!(
            eligibility_from_table(&table, &store, today),
            EligibilityResult::Empty { .. }
        ));
    }

    #[test]
    fn test_history_and_export() {
        let store = test_store();
        assert!(matches!(get_history(&store, None), HistoryResult::Empty { .. }));

        store
            .insert_evaluation(&sample_evaluation("e1", "Ana Souza", "40 dias", "2025-06-29T10:00:00+00:00"))
            .unwrap();
        match get_history(&store, Some("Ana Souza")) {
            HistoryResult::Success { data } => assert_eq!(data[0].id, "e1"),
            other => panic!("expected success, got {:?}", other),
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export").join("avaliacoes.csv");
        assert_eq!(export_history(&store, &path).unwrap(), 1);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);

        let workbook = dir.path().join("avaliacoes.xlsx");
        assert_eq!(export_history(&store, &workbook).unwrap(), 1);
        let table = crate::sheet::parse_workbook(std::fs::read(&workbook).unwrap()).unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.cell(0, 0).as_text().as_deref(), Some("e1"));
    }

    #[test]
    fn test_regenerate_pdf_with_missing_logo() {
        let store = test_store();
        store
            .insert_evaluation(&sample_evaluation("e1", "Ana Souza", "40 dias", "2025-06-29T10:00:00+00:00"))
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir.path().join("logo.png").to_string_lossy());

        let path = regenerate_pdf(&cfg, &store, "e1", dir.path()).expect("pdf");
        assert!(path.exists());

        let err = regenerate_pdf(&cfg, &store, "nope", dir.path()).unwrap_err();
        assert!(matches!(err, AppError::MalformedInput(_)));
    }

    #[test]
    fn test_invalid_submission_is_error_page() {
        let store = test_store();
        let dir = tempfile::tempdir().unwrap();
        let form: EvaluationForm = serde_json::from_value(serde_json::json!({
            "evaluatorName": "",
            "evaluatorRole": "Supervisora",
            "employeeName": "Ana Souza",
            "employeeRole": "ELETRICISTA",
            "evaluationType": "40 dias",
            "attendance": "x", "safety": "x", "productivity": "x", "teamwork": "x",
            "classification": "Bom",
            "decision": "Desligamento"
        }))
        .unwrap();

        match submit_evaluation(&config("logo.png"), &store, form, dir.path(), Utc::now()) {
            SubmissionResult::Error { report, .. } => {
                assert_eq!(report.error_type, crate::error::ErrorType::RequiresUserAction)
            }
            other => panic!("expected error, got {:?}", other),
        }
        assert!(store.list_evaluations().unwrap().is_empty());
    }
}
