//! hireflow CLI.
//!
//! Every page command prints a readable summary, or the tagged page result
//! as JSON with `--json`. Config is read from `~/.hireflow/config.json`
//! unless `--config` / `HIREFLOW_CONFIG` points elsewhere.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::{Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use hireflow_lib::db::EvaluationStore;
use hireflow_lib::evaluation::{EvaluationForm, EvaluationType, RUBRIC};
use hireflow_lib::hiring::dashboard::DashboardFilters;
use hireflow_lib::services::dashboard::{get_dashboard, get_employee, DashboardResult, EmployeeResult};
use hireflow_lib::services::evaluations::{
    export_history, get_eligibility, get_history, regenerate_pdf, submit_evaluation,
    EligibilityResult, HistoryResult, SubmissionResult,
};
use hireflow_lib::state::load_config;
use hireflow_lib::types::Config;

/// Mobilization dashboard and 40/80-day evaluations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.hireflow/config.json)
    #[arg(long, global = true, env = "HIREFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Print the page result as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Ignore the cached spreadsheet and fetch again
    #[arg(long, global = true)]
    refresh: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Regional ("Todas" for all)
    #[arg(long)]
    regional: Option<String>,
    /// City ("Todas" for all)
    #[arg(long)]
    city: Option<String>,
    /// Role ("Todas" for all)
    #[arg(long)]
    role: Option<String>,
}

impl From<FilterArgs> for DashboardFilters {
    fn from(args: FilterArgs) -> Self {
        DashboardFilters {
            regional: args.regional,
            city: args.city,
            role: args.role,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mobilization KPIs, charts and detail table
    Dashboard {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Details for one person on the dashboard
    Employee {
        name: String,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Employees inside the 40- or 80-day review window
    Eligible {
        /// Evaluate as of this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Print the evaluation form options
    Rubric,
    /// Submit an evaluation from a JSON form
    Evaluate {
        /// Form file (camelCase keys)
        #[arg(long)]
        form: PathBuf,
        /// Where to write the PDF
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Stored evaluations, newest first
    History {
        #[arg(long)]
        employee: Option<String>,
    },
    /// Re-render the PDF of a stored evaluation
    Pdf {
        id: String,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Export all evaluations (.xlsx, or CSV when the path ends in .csv)
    Export { path: PathBuf },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn days(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1} dias", v))
        .unwrap_or_else(|| "-".to_string())
}

fn print_dashboard(page: &DashboardResult) {
    match page {
        DashboardResult::Success { data } => {
            if data.alert_count > 0 {
                println!(
                    "⚠ {} colaboradores com mobilização acima de 30 dias",
                    data.alert_count
                );
            }
            println!("Colaboradores: {}", data.kpis.headcount);
            println!("Tempo médio de mobilização: {}", days(data.kpis.mean_total_days));
            println!("Abertura → Doc. recebida: {}", days(data.kpis.mean_opening_to_docs));
            println!("Doc. admissão → última etapa: {}", days(data.kpis.mean_admission_to_last));

            println!("\nPor regional:");
            for g in &data.by_regional {
                println!("  {:<30} {}", g.label, days(g.mean_days));
            }
            println!("\nTop cidades:");
            for g in &data.top_cities {
                println!("  {:<30} {}", g.label, days(g.mean_days));
            }
            println!("\nTendência mensal:");
            for g in &data.monthly_trend {
                println!("  {:<10} {}", g.label, days(g.mean_days));
            }
            println!("\nEtapas:");
            for s in &data.stages {
                println!("  {:<35} {}", s.stage, days(s.mean_days));
            }
            println!("\nDetalhes:");
            for r in &data.rows {
                println!(
                    "  {}{} | {} | {} / {} | abertura {} | {} dias | {}",
                    if r.alert { "⚠ " } else { "" },
                    r.name,
                    r.role,
                    r.regional,
                    r.city,
                    r.opening_date,
                    r.total_days.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
                    r.status
                );
            }
        }
        DashboardResult::Empty { message } => println!("{}", message),
        DashboardResult::Error { message, report, .. } => {
            eprintln!("Erro: {}", message);
            if let Some(report) = report {
                eprintln!("{}", report.recovery_suggestion);
            }
        }
    }
}

fn print_eligibility(page: &EligibilityResult) {
    match page {
        EligibilityResult::Success { data } => {
            for (title, list) in [
                ("Avaliação de 40 dias", &data.forty_days),
                ("Avaliação de 80 dias", &data.eighty_days),
            ] {
                println!("{} ({}):", title, list.len());
                for e in list {
                    println!(
                        "  {} | {} | admissão {} | {} dias{}",
                        e.name,
                        e.role,
                        e.admission_date,
                        e.days_since_admission,
                        if e.already_evaluated { " | já avaliado" } else { "" }
                    );
                }
            }
        }
        EligibilityResult::Empty { message } => println!("{}", message),
        EligibilityResult::Error { message, report } => {
            eprintln!("Erro: {}", message);
            eprintln!("{}", report.recovery_suggestion);
        }
    }
}

fn print_rubric() {
    for criterion in RUBRIC.iter() {
        println!("{}", criterion.title);
        for (i, choice) in criterion.choices.iter().enumerate() {
            println!("  [{}] {}", 4 - i, choice);
        }
    }
    println!("Classificação: Excelente, Bom, Regular, Insatisfatório");
    for kind in EvaluationType::ALL {
        println!("Decisões ({}): {}", kind.label(), kind.decisions().join(", "));
    }
}

fn open_store(config: &Config) -> anyhow::Result<EvaluationStore> {
    let path = config
        .database_path()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to resolve database path")?;
    Ok(EvaluationStore::new(path))
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    if let Command::Rubric = cli.command {
        if cli.json {
            print_json(&RUBRIC)?;
        } else {
            print_rubric();
        }
        return Ok(true);
    }

    let config = load_config(cli.config.as_deref()).map_err(|e| anyhow::anyhow!(e))?;

    match cli.command {
        Command::Rubric => Ok(true),
        Command::Dashboard { filters } => {
            let page = get_dashboard(&config, &filters.into(), cli.refresh).await;
            if cli.json {
                print_json(&page)?;
            } else {
                print_dashboard(&page);
            }
            Ok(!matches!(page, DashboardResult::Error { .. }))
        }
        Command::Employee { name, filters } => {
            let page = get_employee(&config, &filters.into(), &name, cli.refresh).await;
            if cli.json {
                print_json(&page)?;
            } else {
                match &page {
                    EmployeeResult::Success { data } => {
                        println!("{} ({})", data.name, data.role);
                        println!("Regional/Cidade: {} / {}", data.regional, data.city);
                        println!("Status: {}", data.status);
                        println!("Tempo total: {}", days(data.total_days.map(|d| d as f64)));
                        println!("Abertura → Doc. recebida: {}", days(data.opening_to_docs.map(|d| d as f64)));
                        println!("Doc. admissão → última etapa: {}", days(data.admission_to_last.map(|d| d as f64)));
                        if data.alert {
                            println!("⚠ Mobilização acima de 30 dias");
                        }
                    }
                    EmployeeResult::NotFound { message } => println!("{}", message),
                    EmployeeResult::Error { message } => eprintln!("Erro: {}", message),
                }
            }
            Ok(!matches!(page, EmployeeResult::Error { .. }))
        }
        Command::Eligible { today } => {
            let store = open_store(&config)?;
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            let page = get_eligibility(&config, &store, today, cli.refresh).await;
            if cli.json {
                print_json(&page)?;
            } else {
                print_eligibility(&page);
            }
            Ok(!matches!(page, EligibilityResult::Error { .. }))
        }
        Command::Evaluate { form, out } => {
            let raw = std::fs::read_to_string(&form)
                .with_context(|| format!("Failed to read form {}", form.display()))?;
            let form: EvaluationForm = serde_json::from_str(&raw).context("Invalid form JSON")?;
            let store = open_store(&config)?;
            let page = submit_evaluation(&config, &store, form, &out, Utc::now());
            if cli.json {
                print_json(&page)?;
            } else {
                match &page {
                    SubmissionResult::Success { data } => {
                        println!("Avaliação salva: {}", data.evaluation.id);
                        if data.duplicate {
                            println!("Atenção: colaborador já possuía avaliação deste tipo.");
                        }
                        if let Some(path) = &data.pdf_path {
                            println!("PDF: {}", path.display());
                        }
                        if let Some(warning) = &data.warning {
                            eprintln!("{}", warning);
                        }
                    }
                    SubmissionResult::Error { message, report } => {
                        eprintln!("Erro: {}", message);
                        eprintln!("{}", report.recovery_suggestion);
                    }
                }
            }
            Ok(!matches!(page, SubmissionResult::Error { .. }))
        }
        Command::History { employee } => {
            let store = open_store(&config)?;
            let page = get_history(&store, employee.as_deref());
            if cli.json {
                print_json(&page)?;
            } else {
                match &page {
                    HistoryResult::Success { data } => {
                        for e in data {
                            println!(
                                "{} | {} | {} | {} | {} | {} | {}",
                                e.created_at,
                                e.evaluation_type,
                                e.employee_name,
                                e.evaluator_name,
                                e.classification,
                                e.decision,
                                e.id
                            );
                        }
                    }
                    HistoryResult::Empty { message } => println!("{}", message),
                    HistoryResult::Error { message, .. } => eprintln!("Erro: {}", message),
                }
            }
            Ok(!matches!(page, HistoryResult::Error { .. }))
        }
        Command::Pdf { id, out } => {
            let store = open_store(&config)?;
            let path = regenerate_pdf(&config, &store, &id, &out)?;
            println!("{}", path.display());
            Ok(true)
        }
        Command::Export { path } => {
            let store = open_store(&config)?;
            let count = export_history(&store, &path)?;
            println!("{} avaliações exportadas para {}", count, path.display());
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    hireflow_lib::init_logging(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("Erro: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
