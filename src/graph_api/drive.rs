//! Site library search and spreadsheet download.

use serde::Deserialize;

use super::{ensure_success, GraphApiError, GraphClient};
use crate::sheet::{parse_workbook, Table};

/// Extensions accepted as the hiring spreadsheet.
const SPREADSHEET_EXTENSIONS: &[&str] = &[".xlsx", ".xlsb"];

#[derive(Debug, Deserialize)]
struct SiteResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<DriveItem>,
}

/// A search hit in the site drive.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Where to look and what to look for.
#[derive(Debug, Clone)]
pub struct SpreadsheetLocation {
    pub host: String,
    pub site_path: String,
    pub query: String,
}

/// First item whose name contains the query and has a spreadsheet extension.
pub fn pick_spreadsheet<'a>(items: &'a [DriveItem], query: &str) -> Option<&'a DriveItem> {
    items.iter().find(|item| {
        item.name.contains(query)
            && SPREADSHEET_EXTENSIONS
                .iter()
                .any(|ext| item.name.ends_with(ext))
    })
}

impl GraphClient {
    /// Resolve `host:/site/path` to a Graph site id.
    pub async fn resolve_site(
        &self,
        token: &str,
        host: &str,
        site_path: &str,
    ) -> Result<String, GraphApiError> {
        let url = format!("{}/sites/{}:{}", self.graph_url(), host, site_path);
        let resp = self.http().get(&url).bearer_auth(token).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(GraphApiError::SiteNotFound(format!("{}:{}", host, site_path)));
        }
        let site: SiteResponse = ensure_success(resp).await?.json().await?;
        Ok(site.id)
    }

    /// Full-text search of the site's default drive.
    pub async fn search_drive(
        &self,
        token: &str,
        site_id: &str,
        query: &str,
    ) -> Result<Vec<DriveItem>, GraphApiError> {
        let mut url = url::Url::parse(&format!(
            "{}/sites/{}/drive/root",
            self.graph_url(),
            site_id
        ))
        .map_err(|e| GraphApiError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| GraphApiError::InvalidUrl(self.graph_url().to_string()))?
            .push(&format!("search(q='{}')", query.replace('\'', "''")));

        let resp = self.http().get(url).bearer_auth(token).send().await?;
        let found: SearchResponse = ensure_success(resp).await?.json().await?;
        Ok(found.value)
    }

    /// Download a drive item's content.
    pub async fn download_item(
        &self,
        token: &str,
        site_id: &str,
        item_id: &str,
    ) -> Result<Vec<u8>, GraphApiError> {
        let url = format!(
            "{}/sites/{}/drive/items/{}/content",
            self.graph_url(),
            site_id,
            item_id
        );
        let resp = self.http().get(&url).bearer_auth(token).send().await?;
        let bytes = ensure_success(resp).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Token → site → search → download → parse.
    pub async fn fetch_spreadsheet(
        &self,
        location: &SpreadsheetLocation,
    ) -> Result<Table, GraphApiError> {
        let token = self.acquire_token().await?;
        let site_id = self
            .resolve_site(&token, &location.host, &location.site_path)
            .await?;

        let items = self.search_drive(&token, &site_id, &location.query).await?;
        let item = pick_spreadsheet(&items, &location.query)
            .ok_or_else(|| GraphApiError::FileNotFound(location.query.clone()))?;
        log::info!("Downloading spreadsheet '{}'", item.name);

        let bytes = self.download_item(&token, &site_id, &item.id).await?;
        let table = parse_workbook(bytes)?;
        log::info!(
            "Loaded '{}': {} rows, {} columns",
            item.name,
            table.row_count(),
            table.column_count()
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_api::ClientCredentials;
    use wiremock::matchers::{header, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn item(id: &str, name: &str) -> DriveItem {
        DriveItem {
            id: id.into(),
            name: name.into(),
        }
    }

    fn client(server: &MockServer) -> GraphClient {
        GraphClient::new(
            &server.uri(),
            &format!("{}/v1.0", server.uri()),
            ClientCredentials {
                tenant_id: "tenant-1".into(),
                client_id: "app-1".into(),
                client_secret: "s3cret".into(),
            },
        )
    }

    fn location() -> SpreadsheetLocation {
        SpreadsheetLocation {
            host: "contoso.sharepoint.com".into(),
            site_path: "/sites/Intranet".into(),
            query: "CONTROLE CONTRATAÇÃO".into(),
        }
    }

    async fn mount_token_and_site(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok", "expires_in": 3599
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1.0/sites/contoso.sharepoint.com:/sites/Intranet"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "site-42" })),
            )
            .mount(server)
            .await;
    }

    #[test]
    fn test_pick_spreadsheet_needs_name_and_extension() {
        let items = vec![
            item("1", "CONTROLE CONTRATAÇÃO.pdf"),
            item("2", "Cópia de CONTROLE CONTRATAÇÃO 2025.xlsb"),
            item("3", "CONTROLE CONTRATAÇÃO.xlsx"),
        ];
        let picked = pick_spreadsheet(&items, "CONTROLE CONTRATAÇÃO").unwrap();
        assert_eq!(picked.id, "2");
        assert!(pick_spreadsheet(&items[..1], "CONTROLE CONTRATAÇÃO").is_none());
        assert!(pick_spreadsheet(&items, "ADMISSÕES").is_none());
    }

    #[tokio::test]
    async fn test_search_miss_is_file_not_found() {
        let server = MockServer::start().await;
        mount_token_and_site(&server).await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/v1\.0/sites/site-42/drive/root/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [ { "id": "9", "name": "Relatório.docx" } ]
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_spreadsheet(&location())
            .await
            .unwrap_err();
        assert!(matches!(err, GraphApiError::FileNotFound(ref q) if q == "CONTROLE CONTRATAÇÃO"));
    }

    #[tokio::test]
    async fn test_unknown_site() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_spreadsheet(&location())
            .await
            .unwrap_err();
        assert!(matches!(err, GraphApiError::SiteNotFound(_)));
    }

    #[tokio::test]
    async fn test_download_failure_surfaces_status() {
        let server = MockServer::start().await;
        mount_token_and_site(&server).await;
        Mock::given(method("GET"))
            .and(path_regex(r"/drive/root/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [ { "id": "77", "name": "CONTROLE CONTRATAÇÃO.xlsx" } ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1.0/sites/site-42/drive/items/77/content"))
            .respond_with(ResponseTemplate::new(403).set_body_string("accessDenied"))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_spreadsheet(&location())
            .await
            .unwrap_err();
        match err {
            GraphApiError::ApiError { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "accessDenied");
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_downloaded_garbage_is_sheet_error() {
        let server = MockServer::start().await;
        mount_token_and_site(&server).await;
        Mock::given(method("GET"))
            .and(path_regex(r"/drive/root/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [ { "id": "77", "name": "CONTROLE CONTRATAÇÃO.xlsx" } ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1.0/sites/site-42/drive/items/77/content"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"plain text".to_vec()))
            .mount(&server)
            .await;

        let err = client(&server)
            .fetch_spreadsheet(&location())
            .await
            .unwrap_err();
        assert!(matches!(err, GraphApiError::Sheet(_)));
    }
}
