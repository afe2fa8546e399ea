//! Configuration types.
//!
//! Loaded from `~/.hireflow/config.json`. Keys are camelCase; everything
//! except the Azure credentials and the logo path has a default.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Cache window for the dashboard spreadsheet fetch.
pub const DASHBOARD_CACHE_TTL_SECS: u64 = 300;
/// Cache window for the evaluation spreadsheet fetch.
pub const EVALUATION_CACHE_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub azure: AzureConfig,
    /// Logo drawn in the evaluation PDF header.
    #[serde(default)]
    pub logo_path: String,
    #[serde(default)]
    pub sharepoint: SharepointConfig,
    /// Evaluation store. Defaults to `~/.hireflow/evaluations.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
    /// Fetched spreadsheets kept between runs. Defaults to `~/.hireflow/cache`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<String>,
    #[serde(default = "default_authority_url")]
    pub authority_url: String,
    #[serde(default = "default_graph_url")]
    pub graph_url: String,
}

/// App registration used for the client-credential grant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureConfig {
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
}

/// Where the hiring spreadsheet lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharepointConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_site_path")]
    pub site_path: String,
    #[serde(default = "default_search_query")]
    pub search_query: String,
    /// Spreadsheet used by the evaluation workflow; same file unless set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_search_query: Option<String>,
}

impl Default for SharepointConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            site_path: default_site_path(),
            search_query: default_search_query(),
            evaluation_search_query: None,
        }
    }
}

impl SharepointConfig {
    pub fn evaluation_query(&self) -> &str {
        self.evaluation_search_query
            .as_deref()
            .unwrap_or(&self.search_query)
    }
}

impl Config {
    /// Resolve the evaluation database path.
    pub fn database_path(&self) -> Result<PathBuf, String> {
        match &self.database_path {
            Some(p) if !p.trim().is_empty() => Ok(PathBuf::from(p)),
            _ => {
                let home = dirs::home_dir().ok_or("Could not find home directory")?;
                Ok(home.join(".hireflow").join("evaluations.db"))
            }
        }
    }

    /// Resolve the spreadsheet cache directory.
    pub fn cache_dir(&self) -> Result<PathBuf, String> {
        match &self.cache_dir {
            Some(p) if !p.trim().is_empty() => Ok(PathBuf::from(p)),
            _ => {
                let home = dirs::home_dir().ok_or("Could not find home directory")?;
                Ok(home.join(".hireflow").join("cache"))
            }
        }
    }
}

fn default_host() -> String {
    "rezendeenergia.sharepoint.com".to_string()
}

fn default_site_path() -> String {
    "/sites/Intranet".to_string()
}

fn default_search_query() -> String {
    "CONTROLE CONTRATAÇÃO".to_string()
}

fn default_authority_url() -> String {
    "https://login.microsoftonline.com".to_string()
}

fn default_graph_url() -> String {
    "https://graph.microsoft.com/v1.0".to_string()
}
