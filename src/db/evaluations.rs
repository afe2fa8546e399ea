use rusqlite::{params, Row};

use super::*;

const EVALUATION_COLUMNS: &str = "id, evaluator_name, evaluator_role, employee_name, employee_role,
     evaluation_type, attendance, safety, productivity, teamwork,
     classification, decision, comments, created_at";

impl EvaluationDb {
    // =========================================================================
    // Evaluations
    // =========================================================================

    pub fn insert_evaluation(&self, evaluation: &DbEvaluation) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO evaluations (
                id, evaluator_name, evaluator_role, employee_name, employee_role,
                evaluation_type, attendance, safety, productivity, teamwork,
                classification, decision, comments, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                evaluation.id,
                evaluation.evaluator_name,
                evaluation.evaluator_role,
                evaluation.employee_name,
                evaluation.employee_role,
                evaluation.evaluation_type,
                evaluation.attendance,
                evaluation.safety,
                evaluation.productivity,
                evaluation.teamwork,
                evaluation.classification,
                evaluation.decision,
                evaluation.comments,
                evaluation.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_evaluation(&self, id: &str) -> Result<Option<DbEvaluation>, DbError> {
        let sql = format!("SELECT {} FROM evaluations WHERE id = ?1", EVALUATION_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query_map(params![id], Self::map_evaluation_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// All evaluations, newest first.
    pub fn list_evaluations(&self) -> Result<Vec<DbEvaluation>, DbError> {
        let sql = format!(
            "SELECT {} FROM evaluations ORDER BY created_at DESC, rowid DESC",
            EVALUATION_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::map_evaluation_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Evaluations of one employee (exact name), newest first.
    pub fn list_evaluations_for(&self, employee: &str) -> Result<Vec<DbEvaluation>, DbError> {
        let sql = format!(
            "SELECT {} FROM evaluations WHERE employee_name = ?1
             ORDER BY created_at DESC, rowid DESC",
            EVALUATION_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![employee], Self::map_evaluation_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Whether any evaluation exists for this employee and type.
    pub fn already_evaluated(&self, employee: &str, evaluation_type: &str) -> Result<bool, DbError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM evaluations WHERE employee_name = ?1 AND evaluation_type = ?2
             )",
            params![employee, evaluation_type],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn map_evaluation_row(row: &Row) -> rusqlite::Result<DbEvaluation> {
        Ok(DbEvaluation {
            id: row.get(0)?,
            evaluator_name: row.get(1)?,
            evaluator_role: row.get(2)?,
            employee_name: row.get(3)?,
            employee_role: row.get(4)?,
            evaluation_type: row.get(5)?,
            attendance: row.get(6)?,
            safety: row.get(7)?,
            productivity: row.get(8)?,
            teamwork: row.get(9)?,
            classification: row.get(10)?,
            decision: row.get(11)?,
            comments: row.get(12)?,
            created_at: row.get(13)?,
        })
    }
}
