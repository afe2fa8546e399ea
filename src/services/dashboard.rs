// Dashboard service
// Fetch → reshape → filter → metrics → aggregate, with every failure turned
// into a page message instead of an Err.

use crate::error::{AppError, ErrorReport};
use crate::hiring::dashboard::{self as view, DashboardFilters, DashboardView, EmployeeDetail};
use crate::hiring::{derive_metrics, process, ProcessedRecord};
use crate::sheet::Table;
use crate::types::Config;

const NO_DATA_MESSAGE: &str = "Nenhum dado encontrado para as funções especificadas.";

/// Result type for the mobilization dashboard
#[derive(Debug, serde::Serialize)]
#[allow(clippy::large_enum_variant)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DashboardResult {
    Success {
        data: DashboardView,
    },
    Empty {
        message: String,
    },
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        report: Option<ErrorReport>,
        /// Header row of a sheet that could not be mapped.
        #[serde(rename = "rawHeaders", skip_serializing_if = "Vec::is_empty")]
        raw_headers: Vec<String>,
    },
}

/// Result type for a single employee's details
#[derive(Debug, serde::Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EmployeeResult {
    Success { data: EmployeeDetail },
    NotFound { message: String },
    Error { message: String },
}

impl DashboardResult {
    fn from_app_error(err: &AppError) -> Self {
        DashboardResult::Error {
            message: err.to_string(),
            report: Some(ErrorReport::from(err)),
            raw_headers: Vec::new(),
        }
    }
}

/// Table → processed records, or the error page for an unmappable sheet.
fn processed_records(table: Table) -> Result<Vec<ProcessedRecord>, DashboardResult> {
    match process(table) {
        Ok(records) => Ok(derive_metrics(records)),
        Err(mismatch) => {
            let message = mismatch.to_string();
            Err(DashboardResult::Error {
                report: Some(ErrorReport::from(&AppError::MalformedInput(message.clone()))),
                message,
                raw_headers: mismatch.into_table().headers,
            })
        }
    }
}

/// Assemble the dashboard page from an already-fetched table.
pub fn dashboard_from_table(table: Table, filters: &DashboardFilters) -> DashboardResult {
    let records = match processed_records(table) {
        Ok(records) => records,
        Err(page) => return page,
    };
    if records.is_empty() {
        log::warn!("No hiring rows left after filtering");
        return DashboardResult::Empty {
            message: NO_DATA_MESSAGE.to_string(),
        };
    }
    DashboardResult::Success {
        data: view::build(&records, filters),
    }
}

/// Assemble the employee page from an already-fetched table.
pub fn employee_from_table(table: Table, filters: &DashboardFilters, name: &str) -> EmployeeResult {
    let records = match processed_records(table) {
        Ok(records) => records,
        Err(DashboardResult::Error { message, .. }) => return EmployeeResult::Error { message },
        Err(_) => return EmployeeResult::Error {
            message: NO_DATA_MESSAGE.to_string(),
        },
    };
    match view::employee_detail(&records, filters, name) {
        Some(data) => EmployeeResult::Success { data },
        None => EmployeeResult::NotFound {
            message: format!("Colaborador '{}' não encontrado com os filtros atuais.", name),
        },
    }
}

/// Load the dashboard, fetching the spreadsheet through the 5-minute memo.
pub async fn get_dashboard(config: &Config, filters: &DashboardFilters, force: bool) -> DashboardResult {
    match crate::source::load_hiring_table(config, force).await {
        Ok(table) => dashboard_from_table(table, filters),
        Err(e) => DashboardResult::from_app_error(&e),
    }
}

pub async fn get_employee(
    config: &Config,
    filters: &DashboardFilters,
    name: &str,
    force: bool,
) -> EmployeeResult {
    match crate::source::load_hiring_table(config, force).await {
        Ok(table) => employee_from_table(table, filters, name),
        Err(e) => EmployeeResult::Error {
            message: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::test_support::{headers, text_row};

    fn row(name: &str, role: &str, regional: &str, status: &str) -> Vec<crate::sheet::Cell> {
        text_row(&[
            name,
            role,
            regional,
            "BELÉM",
            "01/02/2025",
            "05/02/2025",
            "10/02/2025",
            "12/02/2025",
            "20/02/2025",
            "22/02/2025",
            "25/02/2025",
            "01/03/2025",
            "10/03/2025",
            status,
            "SIM",
        ])
    }

    #[test]
    fn test_dashboard_success() {
        let table = Table::new(
            headers(15),
            vec![
                row("Ana Souza", "ELETRICISTA", "NORTE", "ATIVO"),
                row("Bruno Alves", "PEDREIRO", "NORTE", "ATIVO"),
                row("Carla Dias", "ELETRICISTA", "SUL", "NÃO CONTRATADO"),
            ],
        );
        match dashboard_from_table(table, &DashboardFilters::default()) {
            DashboardResult::Success { data } => {
                assert_eq!(data.kpis.headcount, 1);
                assert_eq!(data.rows[0].name, "Ana Souza");
                // 01/02 → 10/03 is 37 days
                assert_eq!(data.rows[0].total_days, Some(37));
                assert_eq!(data.alert_count, 1);
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_nothing_tracked_is_empty_page() {
        let table = Table::new(headers(15), vec![row("Bruno Alves", "PEDREIRO", "NORTE", "ATIVO")]);
        let page = dashboard_from_table(table, &DashboardFilters::default());
        assert!(matches!(page, DashboardResult::Empty { .. }));
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["status"], "empty");
    }

    #[test]
    fn test_narrow_sheet_is_error_page() {
        let table = Table::new(headers(14), vec![text_row(&["Ana"])]);
        match dashboard_from_table(table, &DashboardFilters::default()) {
            DashboardResult::Error {
                message,
                raw_headers,
                report,
            } => {
                assert!(message.contains("Expected: 15, found: 14"));
                assert_eq!(raw_headers.len(), 14);
                assert!(report.is_some());
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[test]
    fn test_employee_lookup() {
        let table = Table::new(headers(15), vec![row("Ana Souza", "ELETRICISTA", "NORTE", "ATIVO")]);
        assert!(matches!(
            employee_from_table(table.clone(), &DashboardFilters::default(), "Ana Souza"),
            EmployeeResult::Success { .. }
        ));
        assert!(matches!(
            employee_from_table(table, &DashboardFilters::default(), "Zé"),
            EmployeeResult::NotFound { .. }
        ));
    }
}
