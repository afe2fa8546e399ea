//! Form submission: validate, save, then render.
//!
//! The save commits first. A render failure afterwards is reported on the
//! outcome as a warning and leaves the stored record untouched.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pdf::write_evaluation_pdf;
use super::rubric::{Category, Classification, Criterion, EvaluationType};
use super::EvaluationError;
use crate::db::{DbEvaluation, EvaluationStore};
use crate::helpers::file_stem;

/// What the evaluator filled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationForm {
    pub evaluator_name: String,
    pub evaluator_role: String,
    pub employee_name: String,
    pub employee_role: String,
    pub evaluation_type: EvaluationType,
    pub attendance: String,
    pub safety: String,
    pub productivity: String,
    pub teamwork: String,
    pub classification: Classification,
    pub decision: String,
    #[serde(default)]
    pub comments: Option<String>,
}

impl EvaluationForm {
    fn answers(&self) -> [(Category, &str); 4] {
        [
            (Category::Attendance, self.attendance.as_str()),
            (Category::Safety, self.safety.as_str()),
            (Category::Productivity, self.productivity.as_str()),
            (Category::Teamwork, self.teamwork.as_str()),
        ]
    }

    pub fn validate(&self) -> Result<(), EvaluationError> {
        let required = [
            ("evaluatorName", &self.evaluator_name),
            ("evaluatorRole", &self.evaluator_role),
            ("employeeName", &self.employee_name),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(EvaluationError::MissingField(*field));
        }

        for (category, answer) in self.answers() {
            let criterion = Criterion::for_category(category);
            if criterion.rank(answer).is_none() {
                return Err(EvaluationError::InvalidAnswer {
                    category: criterion.title,
                    answer: answer.to_string(),
                });
            }
        }

        let decision = self.decision.trim();
        if !self.evaluation_type.decisions().iter().any(|d| *d == decision) {
            return Err(EvaluationError::InvalidDecision {
                evaluation_type: self.evaluation_type.label(),
                decision: self.decision.clone(),
            });
        }
        Ok(())
    }

    /// Row to insert, stamped with a fresh id.
    pub fn into_record(self, now: DateTime<Utc>) -> DbEvaluation {
        DbEvaluation {
            id: uuid::Uuid::new_v4().to_string(),
            evaluator_name: self.evaluator_name.trim().to_string(),
            evaluator_role: self.evaluator_role.trim().to_string(),
            employee_name: self.employee_name.trim().to_string(),
            employee_role: self.employee_role.trim().to_string(),
            evaluation_type: self.evaluation_type.label().to_string(),
            attendance: self.attendance.trim().to_string(),
            safety: self.safety.trim().to_string(),
            productivity: self.productivity.trim().to_string(),
            teamwork: self.teamwork.trim().to_string(),
            classification: self.classification.label().to_string(),
            decision: self.decision.trim().to_string(),
            comments: self
                .comments
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            created_at: now.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub evaluation: DbEvaluation,
    /// Set when the store already had a review of this type for the employee.
    pub duplicate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// `Avaliacao_40_dias_Ana_Souza_<id prefix>.pdf`
pub fn pdf_file_name(evaluation: &DbEvaluation) -> String {
    let short_id: String = evaluation.id.chars().take(8).collect();
    format!(
        "{}.pdf",
        file_stem(&[
            "Avaliacao",
            evaluation.evaluation_type.as_str(),
            evaluation.employee_name.as_str(),
            short_id.as_str(),
        ])
    )
}

/// Validate and persist `form`, then render its PDF into `out_dir`.
pub fn submit(
    store: &EvaluationStore,
    form: EvaluationForm,
    logo: Option<&Path>,
    out_dir: &Path,
    now: DateTime<Utc>,
) -> Result<SubmissionOutcome, EvaluationError> {
    form.validate()?;

    let duplicate = store.already_evaluated(form.employee_name.trim(), form.evaluation_type.label())?;
    if duplicate {
        log::warn!(
            "{} already has a {} evaluation; saving another",
            form.employee_name.trim(),
            form.evaluation_type.label()
        );
    }

    let evaluation = form.into_record(now);
    store.insert_evaluation(&evaluation)?;
    log::info!(
        "Saved {} evaluation {} for {}",
        evaluation.evaluation_type,
        evaluation.id,
        evaluation.employee_name
    );

    let path = out_dir.join(pdf_file_name(&evaluation));
    let (pdf_path, warning) = match write_evaluation_pdf(&evaluation, logo, &path) {
        Ok(()) => (Some(path), None),
        Err(e) => {
            log::error!("Evaluation {} saved but PDF failed: {}", evaluation.id, e);
            (None, Some(format!("Avaliação salva, mas o PDF falhou: {}", e)))
        }
    };

    Ok(SubmissionOutcome {
        evaluation,
        duplicate,
        pdf_path,
        warning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_store;
    use crate::evaluation::rubric::RUBRIC;

    fn form() -> EvaluationForm {
        EvaluationForm {
            evaluator_name: "Marta Lima".into(),
            evaluator_role: "Supervisora de Campo".into(),
            employee_name: " Ana Souza ".into(),
            employee_role: "ELETRICISTA".into(),
            evaluation_type: EvaluationType::FortyDays,
            attendance: RUBRIC[0].choices[0].into(),
            safety: RUBRIC[1].choices[1].into(),
            productivity: RUBRIC[2].choices[0].into(),
            teamwork: RUBRIC[3].choices[0].into(),
            classification: Classification::Excelente,
            decision: "Aprovado para continuidade".into(),
            comments: Some("  ".into()),
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-02T13:45:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_validation_rejects_blank_names() {
        let mut f = form();
        f.evaluator_name = "   ".into();
        assert!(matches!(f.validate(), Err(EvaluationError::MissingField("evaluatorName"))));
    }

    #[test]
    fn test_validation_rejects_foreign_answer() {
        let mut f = form();
        f.safety = RUBRIC[0].choices[0].into();
        match f.validate() {
            Err(EvaluationError::InvalidAnswer { category, .. }) => {
                assert_eq!(category, "Segurança do Trabalho")
            }
            other => panic!("expected InvalidAnswer, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_checks_decision_against_type() {
        let mut f = form();
        f.evaluation_type = EvaluationType::EightyDays;
        assert!(matches!(f.validate(), Err(EvaluationError::InvalidDecision { .. })));
        f.decision = "Aprovado para efetivação".into();
        assert!(f.validate().is_ok());
    }

    #[test]
    fn test_submit_saves_and_renders() {
        let store = test_store();
        let out = tempfile::tempdir().unwrap();

        let outcome = submit(&store, form(), None, out.path(), now()).expect("submit");
        assert!(!outcome.duplicate);
        assert!(outcome.warning.is_none());
        let pdf = outcome.pdf_path.expect("pdf written");
        assert!(pdf.exists());
        assert!(pdf
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("Avaliacao_40_dias_Ana_Souza_"));

        let saved = store.get_evaluation(&outcome.evaluation.id).unwrap().unwrap();
        assert_eq!(saved.employee_name, "Ana Souza");
        assert_eq!(saved.evaluation_type, "40 dias");
        assert_eq!(saved.classification, "Excelente");
        assert_eq!(saved.comments, None);
        assert_eq!(saved.created_at, "2025-06-02T13:45:00+00:00");
        assert!(store.already_evaluated("Ana Souza", "40 dias").unwrap());
    }

    #[test]
    fn test_render_failure_keeps_record() {
        let store = test_store();
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the output directory should be.
        let blocked = dir.path().join("not-a-dir");
        std::fs::write(&blocked, b"x").unwrap();

        let outcome = submit(&store, form(), None, &blocked, now()).expect("submit");
        assert!(outcome.pdf_path.is_none());
        assert!(outcome.warning.is_some());
        assert_eq!(store.list_evaluations().unwrap().len(), 1);
    }

    #[test]
    fn test_second_submission_is_flagged_duplicate() {
        let store = test_store();
        let out = tempfile::tempdir().unwrap();
        submit(&store, form(), None, out.path(), now()).unwrap();
        let again = submit(&store, form(), None, out.path(), now()).unwrap();
        assert!(again.duplicate);
        assert_eq!(store.list_evaluations_for("Ana Souza").unwrap().len(), 2);
    }
}
