//! Positional column mapping and row filtering.
//!
//! The hiring spreadsheet has no stable header text, so the first fifteen
//! columns are taken by position. Extra columns are ignored.
//!
//! Role, status and clearance keep their raw cell text: the allow-list and
//! the not-hired check are exact matches, surrounding spaces included.

use thiserror::Error;

use super::{HiringRecord, Milestones, NOT_HIRED, TRACKED_ROLES};
use crate::dates::parse_cell;
use crate::helpers::normalize_key;
use crate::sheet::Table;

/// Semantic labels of the first fifteen columns, in order.
pub const EXPECTED_COLUMNS: [&str; 15] = [
    "Nome",
    "Função",
    "Regional",
    "Cidade",
    "Data Abertura",
    "Data Doc Recebida",
    "Data ASO",
    "Data Doc Admissao",
    "Data Final NRs",
    "Data Inclusao Bernhoeft",
    "Data Aprovacao Bernhoeft",
    "Data POP Seguranca",
    "Data Integracao Equatorial",
    "Status Atual",
    "Liberado Campo",
];

/// The table is too narrow to map. Carries the table back untouched.
#[derive(Debug, Error)]
#[error("Wrong number of columns. Expected: {expected}, found: {found}")]
pub struct ColumnMismatch {
    pub expected: usize,
    pub found: usize,
    table: Table,
}

impl ColumnMismatch {
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }
}

/// Map the first fifteen columns to hiring records.
///
/// Date columns are parsed day-first; anything unparseable becomes `None`.
pub fn reshape(table: Table) -> Result<Vec<HiringRecord>, ColumnMismatch> {
    let expected = EXPECTED_COLUMNS.len();
    let found = table.column_count();
    if found < expected {
        log::error!(
            "Hiring sheet has {} columns, expected at least {}",
            found,
            expected
        );
        return Err(ColumnMismatch {
            expected,
            found,
            table,
        });
    }

    warn_on_unexpected_headers(&table);

    let records = (0..table.row_count())
        .map(|r| {
            let text = |i: usize| table.cell(r, i).as_text();
            let raw = |i: usize| table.cell(r, i).raw_text();
            let date = |i: usize| parse_cell(table.cell(r, i));
            HiringRecord {
                name: text(0),
                role: raw(1),
                regional: text(2),
                city: text(3),
                milestones: Milestones {
                    opening: date(4),
                    docs_received: date(5),
                    medical_clearance: date(6),
                    admission_docs: date(7),
                    safety_training: date(8),
                    vendor_inclusion: date(9),
                    vendor_approval: date(10),
                    safety_orientation: date(11),
                    partner_integration: date(12),
                },
                status: raw(13),
                field_clearance: raw(14),
            }
        })
        .collect();

    Ok(records)
}

/// Positional mapping stays the contract; a header that does not resemble
/// its label is only worth a warning.
fn warn_on_unexpected_headers(table: &Table) {
    for (i, label) in EXPECTED_COLUMNS.iter().enumerate() {
        let header = normalize_key(&table.headers[i]);
        let expected = normalize_key(label);
        if !header.is_empty() && !expected.starts_with(&header) && !header.starts_with(&expected) {
            log::warn!(
                "Column {} header '{}' does not look like '{}'; mapping by position anyway",
                i + 1,
                table.headers[i],
                label
            );
        }
    }
}

/// Keep tracked roles, then drop candidates marked not hired in either the
/// status or the field-clearance column. Missing values are kept.
pub fn filter_records(records: Vec<HiringRecord>) -> Vec<HiringRecord> {
    let before = records.len();
    let kept: Vec<HiringRecord> = records
        .into_iter()
        .filter(|r| {
            r.role
                .as_deref()
                .is_some_and(|role| TRACKED_ROLES.contains(&role))
        })
        .filter(|r| r.status.as_deref() != Some(NOT_HIRED))
        .filter(|r| r.field_clearance.as_deref() != Some(NOT_HIRED))
        .collect();
    log::debug!("Filtered hiring rows: {} of {} kept", kept.len(), before);
    kept
}

/// Reshape and filter in one step.
pub fn process(table: Table) -> Result<Vec<HiringRecord>, ColumnMismatch> {
    reshape(table).map(filter_records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::ymd;
    use crate::sheet::test_support::{headers, text_row};
    use crate::sheet::Cell;

    fn full_row(name: &str, role: &str, status: &str, clearance: &str) -> Vec<Cell> {
        text_row(&[
            name,
            role,
            "NORTE",
            "BELÉM",
            "01/02/2025",
            "05/02/2025",
            "10/02/2025",
            "12/02/2025",
            "20/02/2025",
            "",
            "",
            "",
            "",
            status,
            clearance,
        ])
    }

    fn table(rows: Vec<Vec<Cell>>) -> Table {
        let hdrs = EXPECTED_COLUMNS.iter().map(|s| s.to_string()).collect();
        Table::new(hdrs, rows)
    }

    #[test]
    fn test_fourteen_columns_reports_and_returns_table() {
        let original = Table::new(headers(14), vec![text_row(&["Ana", "ELETRICISTA"])]);
        let err = reshape(original.clone()).unwrap_err();
        assert_eq!(err.expected, 15);
        assert_eq!(err.found, 14);
        assert!(err.to_string().contains("Expected: 15, found: 14"));
        assert_eq!(err.into_table(), original);
    }

    #[test]
    fn test_unpadded_short_row_reads_as_empty() {
        let hdrs = EXPECTED_COLUMNS.iter().map(|s| s.to_string()).collect();
        let table = Table {
            headers: hdrs,
            rows: vec![vec![Cell::Text("Ana".into())]],
        };
        let records = reshape(table).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("Ana"));
        assert_eq!(records[0].role, None);
        assert_eq!(records[0].milestones.opening, None);
        assert_eq!(records[0].field_clearance, None);
    }

    #[test]
    fn test_filters_match_raw_text_exactly() {
        let rows = vec![
            full_row("Ana", "ELETRICISTA ", "", ""),
            full_row("Bia", "ELETRICISTA", " NÃO CONTRATADO", ""),
            full_row("Caio", "ELETRICISTA", "", "NÃO CONTRATADO "),
        ];
        let kept = process(table(rows)).unwrap();
        let names: Vec<_> = kept.iter().filter_map(|r| r.name.as_deref()).collect();
        assert_eq!(names, vec!["Bia", "Caio"]);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let mut row = full_row("Ana", "ELETRICISTA", "ATIVO", "SIM");
        row.push(Cell::Text("observação".into()));
        let mut hdrs: Vec<String> = EXPECTED_COLUMNS.iter().map(|s| s.to_string()).collect();
        hdrs.push("Obs".into());
        let records = reshape(Table::new(hdrs, vec![row])).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].field_clearance.as_deref(), Some("SIM"));
    }

    #[test]
    fn test_dates_are_parsed_day_first() {
        let records = reshape(table(vec![full_row("Ana", "ELETRICISTA", "", "")])).unwrap();
        let m = &records[0].milestones;
        assert_eq!(m.opening, Some(ymd(2025, 2, 1)));
        assert_eq!(m.safety_training, Some(ymd(2025, 2, 20)));
        assert_eq!(m.vendor_inclusion, None);
    }

    #[test]
    fn test_unparseable_date_becomes_none() {
        let mut row = full_row("Ana", "ELETRICISTA", "", "");
        row[6] = Cell::Text("AGUARDANDO".into());
        let records = reshape(table(vec![row])).unwrap();
        assert_eq!(records[0].milestones.medical_clearance, None);
    }

    #[test]
    fn test_untracked_roles_are_dropped() {
        let rows = vec![
            full_row("Ana", "ELETRICISTA", "", ""),
            full_row("Bia", "ENGENHEIRO", "", ""),
            full_row("Caio", "", "", ""),
            full_row("Duda", "eletricista", "", ""),
        ];
        let kept = process(table(rows)).unwrap();
        let names: Vec<_> = kept.iter().filter_map(|r| r.name.as_deref()).collect();
        assert_eq!(names, vec!["Ana"]);
    }

    #[test]
    fn test_not_hired_status_or_clearance_dropped() {
        let rows = vec![
            full_row("Ana", "ELETRICISTA", "ATIVO", "SIM"),
            full_row("Bia", "ELETRICISTA", NOT_HIRED, "SIM"),
            full_row("Caio", "OP. DE MOTOSSERA", "ATIVO", NOT_HIRED),
            full_row("Duda", "OP. DE MOTOSSERA", "", ""),
        ];
        let kept = process(table(rows)).unwrap();
        let names: Vec<_> = kept.iter().filter_map(|r| r.name.as_deref()).collect();
        assert_eq!(names, vec!["Ana", "Duda"]);
        assert!(kept.iter().all(|r| r.status.as_deref() != Some(NOT_HIRED)
            && r.field_clearance.as_deref() != Some(NOT_HIRED)));
    }
}
