//! hireflow: mobilization dashboard and probationary evaluations for field
//! hiring, backed by the hiring spreadsheet in the company file store.

pub mod dates;
pub mod db;
pub mod error;
pub mod evaluation;
pub mod graph_api;
pub mod helpers;
pub mod hiring;
mod migrations;
pub mod services;
pub mod sheet;
pub mod source;
pub mod state;
pub mod types;

/// Initialise `env_logger` from `RUST_LOG`, defaulting to `info`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp_secs()
        .try_init();
}
