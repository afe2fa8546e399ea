//! Dashboard aggregation over processed hiring records.
//!
//! Filters cascade regional → city → role. KPIs, the alert banner, the stage
//! table and the detail table use the filtered rows; the regional, city and
//! monthly charts use the whole processed set.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::metrics::{MobilizationMetrics, ProcessedRecord};
use super::TRACKED_ROLES;
use crate::dates::format_br;

/// Label for "no filter" in every selector.
pub const ALL: &str = "Todas";

/// Cities shown in the city ranking.
const TOP_CITIES: usize = 10;

/// Operator selections. `None` (or `Todas`) means no filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardFilters {
    pub regional: Option<String>,
    pub city: Option<String>,
    pub role: Option<String>,
}

impl DashboardFilters {
    fn selected(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|v| *v != ALL)
    }
}

/// Choices offered by each selector, `Todas` first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub regionals: Vec<String>,
    pub cities: Vec<String>,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub mean_total_days: Option<f64>,
    pub mean_opening_to_docs: Option<f64>,
    pub mean_admission_to_last: Option<f64>,
    pub headcount: usize,
}

/// One bar / point of a chart series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMean {
    pub label: String,
    pub mean_days: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageMean {
    pub stage: String,
    /// Rounded to one decimal.
    pub mean_days: Option<f64>,
}

/// Row of the per-candidate status table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRow {
    pub name: String,
    pub role: String,
    pub regional: String,
    pub city: String,
    /// `dd/mm/yyyy`.
    pub opening_date: String,
    pub total_days: Option<i64>,
    pub status: String,
    pub alert: bool,
}

/// Everything the mobilization dashboard shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub options: FilterOptions,
    pub alert_count: usize,
    pub kpis: Kpis,
    pub by_regional: Vec<GroupMean>,
    pub top_cities: Vec<GroupMean>,
    pub monthly_trend: Vec<GroupMean>,
    pub stages: Vec<StageMean>,
    pub rows: Vec<DetailRow>,
}

/// Full profile of one candidate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDetail {
    pub name: String,
    pub role: String,
    pub regional: String,
    pub city: String,
    pub status: String,
    pub total_days: Option<i64>,
    pub opening_to_docs: Option<i64>,
    pub admission_to_last: Option<i64>,
    pub alert: bool,
}

/// Mean of the present values; `None` when there are none.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<i64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0i64, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum as f64 / count as f64)
    }
}

fn round1(value: Option<f64>) -> Option<f64> {
    value.map(|v| (v * 10.0).round() / 10.0)
}

fn distinct_sorted<'a, I>(values: I) -> Vec<String>
where
    I: Iterator<Item = Option<&'a String>>,
{
    values
        .flatten()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn with_all(mut values: Vec<String>) -> Vec<String> {
    values.insert(0, ALL.to_string());
    values
}

/// Apply the cascading filters and return the matching rows plus the
/// selector options as they would be offered at each step.
pub fn apply_filters<'a>(
    records: &'a [ProcessedRecord],
    filters: &DashboardFilters,
) -> (Vec<&'a ProcessedRecord>, FilterOptions) {
    let regionals = with_all(distinct_sorted(
        records.iter().map(|r| r.record.regional.as_ref()),
    ));

    let mut filtered: Vec<&ProcessedRecord> = records.iter().collect();
    if let Some(regional) = DashboardFilters::selected(&filters.regional) {
        filtered.retain(|r| r.record.regional.as_deref() == Some(regional));
    }

    let cities = with_all(distinct_sorted(
        filtered.iter().map(|r| r.record.city.as_ref()),
    ));
    if let Some(city) = DashboardFilters::selected(&filters.city) {
        filtered.retain(|r| r.record.city.as_deref() == Some(city));
    }

    let roles = with_all(TRACKED_ROLES.iter().map(|r| r.to_string()).collect());
    if let Some(role) = DashboardFilters::selected(&filters.role) {
        filtered.retain(|r| r.record.role.as_deref() == Some(role));
    }

    (
        filtered,
        FilterOptions {
            regionals,
            cities,
            roles,
        },
    )
}

/// Mean total mobilization per group key, rows with no key skipped.
fn group_means<F>(records: &[ProcessedRecord], key: F) -> BTreeMap<String, Option<f64>>
where
    F: Fn(&ProcessedRecord) -> Option<String>,
{
    let mut groups: BTreeMap<String, Vec<Option<i64>>> = BTreeMap::new();
    for record in records {
        if let Some(k) = key(record) {
            groups
                .entry(k)
                .or_default()
                .push(record.metrics.total_mobilization);
        }
    }
    groups
        .into_iter()
        .map(|(k, values)| (k, mean(values)))
        .collect()
}

/// Descending by mean; groups without a mean go last.
fn ranked(groups: BTreeMap<String, Option<f64>>) -> Vec<GroupMean> {
    let mut out: Vec<GroupMean> = groups
        .into_iter()
        .map(|(label, mean_days)| GroupMean { label, mean_days })
        .collect();
    out.sort_by(|a, b| match (a.mean_days, b.mean_days) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    out
}

type StageFn = fn(&MobilizationMetrics) -> Option<i64>;

/// Stage table rows: label and the metric it averages.
const STAGES: [(&str, StageFn); 8] = [
    ("Abertura → Doc. Recebida", |m| m.opening_to_docs),
    ("Doc. Recebida → ASO", |m| m.docs_to_medical),
    ("ASO → Doc. Admissão", |m| m.medical_to_admission),
    ("Doc. Admissão → NRs", |m| m.admission_to_safety_training),
    ("NRs → Inclusão Bernhoeft", |m| m.safety_training_to_vendor_inclusion),
    ("Inclusão → Aprovação Bernhoeft", |m| m.vendor_inclusion_to_approval),
    ("Aprovação Bernhoeft → POP", |m| m.vendor_approval_to_orientation),
    ("POP → Integração", |m| m.orientation_to_integration),
];

fn detail_row(r: &ProcessedRecord) -> DetailRow {
    DetailRow {
        name: r.record.name.clone().unwrap_or_default(),
        role: r.record.role.clone().unwrap_or_default(),
        regional: r.record.regional.clone().unwrap_or_default(),
        city: r.record.city.clone().unwrap_or_default(),
        opening_date: format_br(r.record.milestones.opening),
        total_days: r.metrics.total_mobilization,
        status: r.record.status.clone().unwrap_or_default(),
        alert: r.metrics.alert_30_days,
    }
}

/// Build the dashboard for the given selections.
pub fn build(records: &[ProcessedRecord], filters: &DashboardFilters) -> DashboardView {
    let (filtered, options) = apply_filters(records, filters);

    let kpis = Kpis {
        mean_total_days: mean(filtered.iter().map(|r| r.metrics.total_mobilization)),
        mean_opening_to_docs: mean(filtered.iter().map(|r| r.metrics.opening_to_docs)),
        mean_admission_to_last: mean(filtered.iter().map(|r| r.metrics.admission_to_last)),
        headcount: filtered.len(),
    };

    let by_regional = ranked(group_means(records, |r| r.record.regional.clone()));
    let mut top_cities = ranked(group_means(records, |r| r.record.city.clone()));
    top_cities.truncate(TOP_CITIES);

    let monthly_trend = group_means(records, |r| r.metrics.opening_month.clone())
        .into_iter()
        .map(|(label, mean_days)| GroupMean { label, mean_days })
        .collect();

    let stages = STAGES
        .iter()
        .map(|(label, metric)| StageMean {
            stage: label.to_string(),
            mean_days: round1(mean(filtered.iter().map(|r| metric(&r.metrics)))),
        })
        .collect();

    DashboardView {
        options,
        alert_count: filtered.iter().filter(|r| r.metrics.alert_30_days).count(),
        kpis,
        by_regional,
        top_cities,
        monthly_trend,
        stages,
        rows: filtered.iter().map(|r| detail_row(r)).collect(),
    }
}

/// First filtered record with the given name.
pub fn employee_detail(
    records: &[ProcessedRecord],
    filters: &DashboardFilters,
    name: &str,
) -> Option<EmployeeDetail> {
    let (filtered, _) = apply_filters(records, filters);
    let r = filtered
        .into_iter()
        .find(|r| r.record.name.as_deref() == Some(name))?;
    Some(EmployeeDetail {
        name: name.to_string(),
        role: r.record.role.clone().unwrap_or_default(),
        regional: r.record.regional.clone().unwrap_or_default(),
        city: r.record.city.clone().unwrap_or_default(),
        status: r.record.status.clone().unwrap_or_default(),
        total_days: r.metrics.total_mobilization,
        opening_to_docs: r.metrics.opening_to_docs,
        admission_to_last: r.metrics.admission_to_last,
        alert: r.metrics.alert_30_days,
    })
}
