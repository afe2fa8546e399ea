//! SQLite store for probationary evaluations.
//!
//! The database lives at `~/.hireflow/evaluations.db` unless `databasePath`
//! says otherwise. Rows are append-only: a submitted form is inserted once and
//! read back for history, export and PDF regeneration.
//!
//! Callers go through [`EvaluationStore`], which opens a connection for each
//! operation and drops it afterwards.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

pub mod evaluations;
pub mod types;
pub use types::*;

pub struct EvaluationDb {
    conn: Connection,
}

impl EvaluationDb {
    /// Borrow the underlying connection for ad-hoc queries.
    pub fn conn_ref(&self) -> &Connection {
        &self.conn
    }

    /// Open (or create) the database at `path` and bring the schema up to date.
    pub fn open_at(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        crate::migrations::run_migrations(&conn).map_err(DbError::Migration)?;

        Ok(Self { conn })
    }
}

/// Path-only handle; each call opens, uses and closes its own connection.
#[derive(Debug, Clone)]
pub struct EvaluationStore {
    path: PathBuf,
}

impl EvaluationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_db<T>(&self, f: impl FnOnce(&EvaluationDb) -> Result<T, DbError>) -> Result<T, DbError> {
        let db = EvaluationDb::open_at(&self.path)?;
        f(&db)
    }

    pub fn insert_evaluation(&self, evaluation: &DbEvaluation) -> Result<(), DbError> {
        self.with_db(|db| db.insert_evaluation(evaluation))
    }

    pub fn get_evaluation(&self, id: &str) -> Result<Option<DbEvaluation>, DbError> {
        self.with_db(|db| db.get_evaluation(id))
    }

    pub fn list_evaluations(&self) -> Result<Vec<DbEvaluation>, DbError> {
        self.with_db(|db| db.list_evaluations())
    }

    pub fn list_evaluations_for(&self, employee: &str) -> Result<Vec<DbEvaluation>, DbError> {
        self.with_db(|db| db.list_evaluations_for(employee))
    }

    pub fn already_evaluated(&self, employee: &str, evaluation_type: &str) -> Result<bool, DbError> {
        self.with_db(|db| db.already_evaluated(employee, evaluation_type))
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;

    /// A store backed by a fresh file in a leaked temp dir.
    pub fn test_store() -> EvaluationStore {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("test.db");
        std::mem::forget(dir);
        EvaluationStore::new(path)
    }

    pub fn sample_evaluation(id: &str, employee: &str, kind: &str, created_at: &str) -> DbEvaluation {
        DbEvaluation {
            id: id.to_string(),
            evaluator_name: "Marta Lima".to_string(),
            evaluator_role: "Supervisora de Campo".to_string(),
            employee_name: employee.to_string(),
            employee_role: "ELETRICISTA".to_string(),
            evaluation_type: kind.to_string(),
            attendance: "Sempre pontual e assíduo".to_string(),
            safety: "Cumpre integralmente as normas de segurança".to_string(),
            productivity: "Atende às expectativas".to_string(),
            teamwork: "Colaborativo e respeitoso".to_string(),
            classification: "Bom".to_string(),
            decision: "Aprovado para continuidade".to_string(),
            comments: None,
            created_at: created_at.to_string(),
        }
    }
}
