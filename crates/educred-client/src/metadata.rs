//! Typed client for the metadata store endpoints.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/v1/metadata/documents` | Store a JSON document |
//! | POST   | `/v1/metadata/files` | Store raw bytes |
//! | GET    | `/v1/metadata/{id}` | Fetch a document |
//! | GET    | `/v1/metadata/{id}/file` | Fetch raw bytes |
//!
//! Stores are content-addressed, so repeating one is harmless and all four
//! calls retry on transport failure.

use educred_core::ContentId;
use educred_store::StoredObject;
use reqwest::StatusCode;

use crate::error::ClientError;
use crate::http::{endpoint_url, ensure_success, read_json, read_optional_json, transport_error, API_PREFIX};
use crate::retry::retry_send;

/// Client for the metadata store API.
#[derive(Debug, Clone)]
pub struct MetadataClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl MetadataClient {
    pub(crate) fn new(http: reqwest::Client, base_url: url::Url) -> Self {
        Self { http, base_url }
    }

    /// Store a JSON document. The server canonicalizes it before hashing.
    ///
    /// Calls `POST {base_url}/v1/metadata/documents`.
    pub async fn store_document(
        &self,
        document: &serde_json::Value,
    ) -> Result<StoredObject, ClientError> {
        let endpoint = "POST /v1/metadata/documents";
        let url = endpoint_url(&self.base_url, &format!("{API_PREFIX}/metadata/documents"));

        let resp = retry_send(|| self.http.post(&url).json(document).send())
            .await
            .map_err(transport_error(endpoint))?;
        read_json(endpoint, resp).await
    }

    /// Store opaque bytes.
    ///
    /// Calls `POST {base_url}/v1/metadata/files`.
    pub async fn store_file(&self, bytes: Vec<u8>) -> Result<StoredObject, ClientError> {
        let endpoint = "POST /v1/metadata/files";
        let url = endpoint_url(&self.base_url, &format!("{API_PREFIX}/metadata/files"));

        let resp = retry_send(|| {
            self.http
                .post(&url)
                .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                .body(bytes.clone())
                .send()
        })
        .await
        .map_err(transport_error(endpoint))?;
        read_json(endpoint, resp).await
    }

    /// Fetch a document, or `None` if nothing is stored under `id`.
    ///
    /// Calls `GET {base_url}/v1/metadata/{id}`.
    pub async fn fetch_document(
        &self,
        id: &ContentId,
    ) -> Result<Option<serde_json::Value>, ClientError> {
        let endpoint = format!("GET /v1/metadata/{id}");
        let url = endpoint_url(&self.base_url, &format!("{API_PREFIX}/metadata/{id}"));

        let resp = retry_send(|| self.http.get(&url).send())
            .await
            .map_err(transport_error(&endpoint))?;
        read_optional_json(&endpoint, resp).await
    }

    /// Fetch raw bytes, or `None` if nothing is stored under `id`.
    ///
    /// Calls `GET {base_url}/v1/metadata/{id}/file`.
    pub async fn fetch_file(&self, id: &ContentId) -> Result<Option<Vec<u8>>, ClientError> {
        let endpoint = format!("GET /v1/metadata/{id}/file");
        let url = endpoint_url(&self.base_url, &format!("{API_PREFIX}/metadata/{id}/file"));

        let resp = retry_send(|| self.http.get(&url).send())
            .await
            .map_err(transport_error(&endpoint))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = ensure_success(&endpoint, resp).await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|source| ClientError::Deserialization {
                endpoint: endpoint.clone(),
                source,
            })?;
        Ok(Some(bytes.to_vec()))
    }
}
