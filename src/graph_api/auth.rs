//! Client-credential token exchange.

use super::{GraphApiError, GraphClient, TokenResponse, GRAPH_SCOPE};

impl GraphClient {
    /// Exchange the app credentials for a bearer token.
    pub async fn acquire_token(&self) -> Result<String, GraphApiError> {
        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_url, self.credentials.tenant_id
        );

        let resp = self
            .http
            .post(&url)
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("scope", GRAPH_SCOPE),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body_text = resp.text().await.unwrap_or_default();
        let body: TokenResponse = match serde_json::from_str(&body_text) {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(GraphApiError::AuthFailed(format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    body_text
                )))
            }
            Err(e) => return Err(GraphApiError::Json(e)),
        };

        match body.access_token {
            Some(token) if status.is_success() && !token.is_empty() => {
                log::debug!(
                    "Acquired Graph token (expires in {}s)",
                    body.expires_in.unwrap_or(0)
                );
                Ok(token)
            }
            _ => Err(GraphApiError::AuthFailed(
                body.error_description
                    .or(body.error)
                    .unwrap_or_else(|| format!("HTTP {}: no access_token", status.as_u16())),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_api::ClientCredentials;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

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

    #[tokio::test]
    async fn test_token_exchange_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token_type": "Bearer",
                "expires_in": 3599,
                "access_token": "eyJ0eXAi"
            })))
            .mount(&server)
            .await;

        let token = client(&server).acquire_token().await.expect("token");
        assert_eq!(token, "eyJ0eXAi");
    }

    #[tokio::test]
    async fn test_token_exchange_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "invalid_client",
                "error_description": "AADSTS7000215: Invalid client secret provided."
            })))
            .mount(&server)
            .await;

        let err = client(&server).acquire_token().await.unwrap_err();
        match err {
            GraphApiError::AuthFailed(msg) => assert!(msg.contains("AADSTS7000215")),
            other => panic!("expected AuthFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_token_exchange_non_json_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = client(&server).acquire_token().await.unwrap_err();
        assert!(matches!(err, GraphApiError::AuthFailed(ref m) if m.contains("503")));
    }
}
