//! Schema migration framework.
//!
//! Numbered SQL migrations are embedded at compile time via `include_str!`.
//! Each migration runs exactly once, tracked by the `schema_version` table.
//!
//! Databases created before the framework existed had their schema patched
//! in place (the `evaluation_type` column was added on demand). The bootstrap
//! step recognises such a file, marks the baseline as applied, and marks the
//! column migration as applied too when the column is already there.

use rusqlite::Connection;

struct Migration {
    version: i32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: include_str!("migrations/001_baseline.sql"),
    },
    Migration {
        version: 2,
        sql: include_str!("migrations/002_evaluation_type.sql"),
    },
    Migration {
        version: 3,
        sql: include_str!("migrations/003_comments_and_lookup.sql"),
    },
];

/// Create the `schema_version` table if it doesn't exist.
fn ensure_schema_version_table(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .map_err(|e| format!("Failed to create schema_version table: {}", e))
}

/// Return the highest applied migration version, or 0 if none.
fn current_version(conn: &Connection) -> Result<i32, String> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| format!("Failed to read schema version: {}", e))
}

fn table_exists(conn: &Connection, table: &str) -> bool {
    conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")
        .and_then(|mut stmt| stmt.exists([table]))
        .unwrap_or(false)
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    conn.prepare("SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2")
        .and_then(|mut stmt| stmt.exists([table, column]))
        .unwrap_or(false)
}

fn mark_applied(conn: &Connection, version: i32) -> Result<(), String> {
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [version],
    )
    .map_err(|e| format!("Failed to bootstrap schema version: {}", e))?;
    Ok(())
}

/// Detect a pre-framework database and mark what it already has as applied.
fn bootstrap_existing_db(conn: &Connection) -> Result<bool, String> {
    let version = current_version(conn)?;
    if version > 0 {
        return Ok(false);
    }

    if !table_exists(conn, "evaluations") {
        return Ok(false);
    }

    mark_applied(conn, 1)?;
    log::info!("Migration bootstrap: marked v1 (baseline) as applied for existing database");

    if column_exists(conn, "evaluations", "evaluation_type") {
        mark_applied(conn, 2)?;
        log::info!("Migration bootstrap: evaluation_type already present, marked v2 as applied");
    }

    Ok(true)
}

/// Back up the database before applying migrations.
///
/// Uses SQLite's online backup API to create a hot copy at
/// `<db_path>.pre-migration.bak`. Only called when there are pending migrations
/// against a database that already had a schema.
fn backup_before_migration(conn: &Connection) -> Result<(), String> {
    let db_path: String = conn
        .query_row("PRAGMA database_list", [], |row| row.get(2))
        .map_err(|e| format!("Failed to get database path: {}", e))?;

    if db_path.is_empty() || db_path == ":memory:" {
        return Ok(());
    }

    let backup_path = format!("{}.pre-migration.bak", db_path);
    let mut backup_conn = rusqlite::Connection::open(&backup_path)
        .map_err(|e| format!("Failed to open backup file: {}", e))?;

    let backup = rusqlite::backup::Backup::new(conn, &mut backup_conn)
        .map_err(|e| format!("Failed to initialize pre-migration backup: {}", e))?;

    backup
        .step(-1)
        .map_err(|e| format!("Pre-migration backup failed: {}", e))?;

    log::info!("Pre-migration backup created at {}", backup_path);
    Ok(())
}

/// Run all pending migrations.
///
/// Returns the number of migrations applied (0 if already up-to-date).
///
/// Forward-compat guard: if the database has a higher version than the highest
/// known migration, returns an error telling the user to update.
pub fn run_migrations(conn: &Connection) -> Result<usize, String> {
    ensure_schema_version_table(conn)?;
    bootstrap_existing_db(conn)?;

    let current = current_version(conn)?;
    let max_known = MIGRATIONS.last().map(|m| m.version).unwrap_or(0);

    if current > max_known {
        return Err(format!(
            "Database schema version ({}) is newer than this version of hireflow supports ({}). \
             Please update hireflow to the latest version.",
            current, max_known
        ));
    }

    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();

    if pending.is_empty() {
        return Ok(0);
    }

    if current > 0 {
        backup_before_migration(conn)?;
    }

    for migration in &pending {
        conn.execute_batch(migration.sql)
            .map_err(|e| format!("Migration v{} failed: {}", migration.version, e))?;

        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [migration.version],
        )
        .map_err(|e| format!("Failed to record migration v{}: {}", migration.version, e))?;

        log::info!("Applied migration v{}", migration.version);
    }

    Ok(pending.len())
}
