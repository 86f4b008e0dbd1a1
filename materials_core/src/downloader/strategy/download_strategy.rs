use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::Deserialize;

use crate::config::EndpointContract;
use crate::types::types::{DownloadError, DownloadResult, MaterialId};

/// One way of talking to the materials endpoint.
///
/// Implementations return `Ok` only with a success variant of
/// `DownloadResult`; every failure goes through `DownloadError` so the
/// caller can tell a rejection from a transport problem.
#[async_trait]
pub trait DownloadStrategy: Send + Sync {
    fn contract(&self) -> EndpointContract;

    async fn fetch(&self, id: &MaterialId) -> Result<DownloadResult, DownloadError>;
}

/// Error body the backend sends alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

/// `<endpoint>?id=<id>`, with the id percent-encoded and any existing query
/// parameters on the endpoint kept.
pub fn material_url(endpoint: &Url, id: &MaterialId) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut().append_pair("id", id.as_str());
    url
}

/// Plain GET, no headers and no body.
pub(crate) async fn send_get(
    client: &Client,
    endpoint: &Url,
    id: &MaterialId,
) -> Result<Response, DownloadError> {
    let url = material_url(endpoint, id);
    log::debug!("[request] GET {}", url);
    let response = client.get(url).send().await?;
    log::debug!("[request] id={} status={}", id, response.status());
    Ok(response)
}

/// Best-effort extraction of the backend's `error` field, for logging only.
pub(crate) fn rejection_detail(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| "-".to_string())
}
