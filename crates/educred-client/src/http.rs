//! Response handling shared by the sub-clients.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ClientError;

/// API version path segment.
pub(crate) const API_PREFIX: &str = "v1";

/// Join `path` onto the base URL, tolerating a base with or without a
/// trailing slash.
pub(crate) fn endpoint_url(base: &Url, path: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub(crate) fn transport_error(endpoint: &str) -> impl FnOnce(reqwest::Error) -> ClientError + '_ {
    move |source| ClientError::Http {
        endpoint: endpoint.to_string(),
        source,
    }
}

/// Pass a 2xx response through; turn anything else into `ApiError`.
pub(crate) async fn ensure_success(endpoint: &str, resp: Response) -> Result<Response, ClientError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::ApiError {
        endpoint: endpoint.to_string(),
        status,
        body,
    })
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    endpoint: &str,
    resp: Response,
) -> Result<T, ClientError> {
    ensure_success(endpoint, resp)
        .await?
        .json()
        .await
        .map_err(|source| ClientError::Deserialization {
            endpoint: endpoint.to_string(),
            source,
        })
}

/// Like [`read_json`], but a 404 is `Ok(None)`.
pub(crate) async fn read_optional_json<T: DeserializeOwned>(
    endpoint: &str,
    resp: Response,
) -> Result<Option<T>, ClientError> {
    if resp.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    read_json(endpoint, resp).await.map(Some)
}
