//! Microsoft Graph client for the hiring spreadsheet.
//!
//! Direct HTTP via reqwest: an app-only token from the client-credential
//! grant, then site lookup, drive search and file download.
//!
//! Modules:
//! - auth: client-credential token exchange
//! - drive: site resolution, search, download, parse

pub mod auth;
pub mod drive;

use serde::Deserialize;

use crate::sheet::SheetError;
use crate::types::Config;

/// App-only scope requested for every token.
pub const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

// ============================================================================
// Error type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GraphApiError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Token request rejected: {0}")]
    AuthFailed(String),
    #[error("Site not found: {0}")]
    SiteNotFound(String),
    #[error("No spreadsheet matching '{0}'")]
    FileNotFound(String),
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Spreadsheet: {0}")]
    Sheet(#[from] SheetError),
}

// ============================================================================
// Client
// ============================================================================

/// App registration credentials.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

/// Token endpoint response (only the fields used).
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Everything needed to talk to Graph; cheap to clone.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    authority_url: String,
    graph_url: String,
    credentials: ClientCredentials,
}

impl GraphClient {
    pub fn new(authority_url: &str, graph_url: &str, credentials: ClientCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            authority_url: authority_url.trim_end_matches('/').to_string(),
            graph_url: graph_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.authority_url,
            &config.graph_url,
            ClientCredentials {
                tenant_id: config.azure.tenant_id.clone(),
                client_id: config.azure.client_id.clone(),
                client_secret: config.azure.client_secret.clone(),
            },
        )
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn graph_url(&self) -> &str {
        &self.graph_url
    }
}

/// Turn a non-2xx response into an `ApiError` carrying the body text.
pub(crate) async fn ensure_success(
    resp: reqwest::Response,
) -> Result<reqwest::Response, GraphApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(GraphApiError::ApiError {
        status: status.as_u16(),
        message,
    })
}
