//! HTTP implementation of the destination client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Body, Client, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use migrator_core::config::destination::DestinationConfig;
use migrator_core::error::{AppError, ErrorKind};
use migrator_core::result::AppResult;
use migrator_core::traits::destination::DestinationClient;
use migrator_core::types::{DestinationLocation, NewAsset, NewCategory, NewFolder, UploadedAsset};

/// Response body of category and folder creation.
#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: String,
}

/// Destination client talking to the asset service REST API.
#[derive(Debug, Clone)]
pub struct HttpDestinationClient {
    client: Client,
    origin: Url,
    workspace_id: Option<String>,
}

impl HttpDestinationClient {
    /// Build a client from the destination configuration.
    pub fn new(config: &DestinationConfig) -> AppResult<Self> {
        let origin = Url::parse(config.service_origin.trim_end_matches('/')).map_err(|e| {
            AppError::configuration(format!(
                "Invalid service origin {}: {e}",
                config.service_origin
            ))
        })?;

        let mut headers = HeaderMap::new();
        let mut token = HeaderValue::from_str(&config.access_token).map_err(|_| {
            AppError::configuration("Access token contains invalid header characters")
        })?;
        token.set_sensitive(true);
        headers.insert(AUTHORIZATION, token);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            client,
            origin,
            workspace_id: config.workspace_id.clone(),
        })
    }

    /// Build an endpoint URL with the workspace and extra query parameters.
    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> AppResult<Url> {
        let mut url = Url::parse(&format!("{}/{path}", self.origin.as_str().trim_end_matches('/')))
            .map_err(|e| AppError::internal(format!("Invalid endpoint {path}: {e}")))?;

        {
            let mut query = url.query_pairs_mut();
            if let Some(workspace_id) = &self.workspace_id {
                query.append_pair("workspaceId", workspace_id);
            }
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        Ok(url)
    }

    /// Decode a successful JSON response or turn the failure into an error.
    async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let response = ensure_success(response).await?;
        let url = response.url().clone();
        response.json::<T>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Unexpected response from {url}"),
                e,
            )
        })
    }
}

fn request_error(url: &Url, err: reqwest::Error) -> AppError {
    AppError::with_source(
        ErrorKind::ExternalService,
        format!("Request to {url} failed: {err}"),
        err,
    )
}

async fn ensure_success(response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::external_service(format!(
        "Request to {url} failed with status {status}. {}",
        body.trim()
    )))
}

#[async_trait]
impl DestinationClient for HttpDestinationClient {
    async fn verify_connection(&self) -> AppResult<()> {
        let url = self.endpoint("categories", &[])?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Connection,
                    format!("Failed to connect to the destination service at {}.", self.origin),
                    e,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::connection(format!(
                "Failed to connect to the destination service at {}. Status code: {status}. {}",
                self.origin,
                body.trim()
            )));
        }
        Ok(())
    }

    async fn create_category(&self, category: NewCategory) -> AppResult<String> {
        let url = self.endpoint("categories", &[])?;
        let body = json!({
            "name": category.name,
            "extensions": category.allowed_extensions,
        });

        let response = self
            .client
            .post(url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error(&url, e))?;

        let created: CreatedResponse = Self::decode(response).await?;
        debug!(name = %category.name, id = %created.id, "Created destination category");
        Ok(created.id)
    }

    async fn create_folder(&self, folder: NewFolder) -> AppResult<String> {
        let url = self.endpoint("folders", &[])?;
        let body = match &folder.location {
            DestinationLocation::CategoryId(id) => json!({ "name": folder.name, "categoryId": id }),
            DestinationLocation::FolderId(id) => json!({ "name": folder.name, "parentId": id }),
        };

        let response = self
            .client
            .post(url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error(&url, e))?;

        let created: CreatedResponse = Self::decode(response).await?;
        debug!(name = %folder.name, id = %created.id, "Created destination folder");
        Ok(created.id)
    }

    async fn upload_asset(&self, asset: NewAsset) -> AppResult<UploadedAsset> {
        let location = match &asset.location {
            DestinationLocation::CategoryId(id) => ("categoryId", id.as_str()),
            DestinationLocation::FolderId(id) => ("folderId", id.as_str()),
        };
        let url = self.endpoint("assets", &[location, ("fileName", asset.name.as_str())])?;

        let response = self
            .client
            .post(url.clone())
            .body(Body::wrap_stream(asset.stream))
            .send()
            .await
            .map_err(|e| request_error(&url, e))?;

        let uploaded: UploadedAsset = Self::decode(response).await?;
        debug!(name = %asset.name, id = %uploaded.id, "Uploaded destination asset");
        Ok(uploaded)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use bytes::Bytes;
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use migrator_core::traits::storage::ByteStream;

    use super::*;

    fn config(origin: &str, workspace_id: Option<&str>) -> DestinationConfig {
        DestinationConfig {
            service_origin: origin.to_string(),
            access_token: "test-token".to_string(),
            workspace_id: workspace_id.map(str::to_string),
            timeout_seconds: 5,
        }
    }

    fn body_stream(content: &'static str) -> ByteStream {
        Box::pin(futures::stream::iter(vec![Ok(Bytes::from(content))]))
    }

    #[tokio::test]
    async fn test_verify_connection() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/categories")
                    .header("authorization", "test-token");
                then.status(200).json_body(serde_json::json!({ "items": [] }));
            })
            .await;

        let client = HttpDestinationClient::new(&config(&server.base_url(), None)).unwrap();
        client.verify_connection().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_verify_connection_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/categories");
                then.status(401).body("invalid token");
            })
            .await;

        let client = HttpDestinationClient::new(&config(&server.base_url(), None)).unwrap();
        let err = client.verify_connection().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Connection);
        assert!(err.message.contains("401"));
        assert!(err.message.contains("invalid token"));
    }

    #[tokio::test]
    async fn test_create_category_in_workspace() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/categories")
                    .query_param("workspaceId", "ws-12345678901234567")
                    .json_body(serde_json::json!({ "name": "Images", "extensions": ["jpg", "png"] }));
                then.status(201).json_body(serde_json::json!({ "id": "cat-1" }));
            })
            .await;

        let client = HttpDestinationClient::new(&config(
            &server.base_url(),
            Some("ws-12345678901234567"),
        ))
        .unwrap();
        let id = client
            .create_category(NewCategory {
                name: "Images".to_string(),
                allowed_extensions: BTreeSet::from(["png".to_string(), "jpg".to_string()]),
            })
            .await
            .unwrap();

        assert_eq!(id, "cat-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_folder_under_parent() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/folders")
                    .json_body(serde_json::json!({ "name": "Summer", "parentId": "folder-1" }));
                then.status(201).json_body(serde_json::json!({ "id": "folder-2" }));
            })
            .await;

        let client = HttpDestinationClient::new(&config(&server.base_url(), None)).unwrap();
        let id = client
            .create_folder(NewFolder {
                name: "Summer".to_string(),
                location: DestinationLocation::FolderId("folder-1".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(id, "folder-2");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_asset() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/assets")
                    .query_param("categoryId", "cat-1")
                    .query_param("fileName", "logo.png")
                    .body("image-bytes");
                then.status(201).json_body(serde_json::json!({
                    "id": "asset-1",
                    "url": "https://assets.example.com/asset-1/logo.png"
                }));
            })
            .await;

        let client = HttpDestinationClient::new(&config(&server.base_url(), None)).unwrap();
        let uploaded = client
            .upload_asset(NewAsset {
                name: "logo.png".to_string(),
                location: DestinationLocation::CategoryId("cat-1".to_string()),
                stream: body_stream("image-bytes"),
            })
            .await
            .unwrap();

        assert_eq!(uploaded.id, "asset-1");
        assert_eq!(uploaded.url, "https://assets.example.com/asset-1/logo.png");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_external_service_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/folders");
                then.status(409).body("folder exists");
            })
            .await;

        let client = HttpDestinationClient::new(&config(&server.base_url(), None)).unwrap();
        let err = client
            .create_folder(NewFolder {
                name: "Docs".to_string(),
                location: DestinationLocation::CategoryId("cat-1".to_string()),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::ExternalService);
        assert!(err.message.contains("409"));
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        let mut cfg = config("https://assets.example.com", None);
        cfg.access_token = "bad\ntoken".to_string();
        let err = HttpDestinationClient::new(&cfg).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
