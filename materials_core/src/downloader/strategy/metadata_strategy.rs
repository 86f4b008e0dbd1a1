use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::config::EndpointContract;
use crate::downloader::strategy::download_strategy::{rejection_detail, send_get, DownloadStrategy};
use crate::types::types::{DownloadError, DownloadResult, MaterialId, MaterialMetadata};

/// Endpoint answers with a JSON description of the material.
pub struct MetadataStrategy {
    client: Arc<Client>,
    endpoint: Url,
}

impl MetadataStrategy {
    pub fn new(client: Arc<Client>, endpoint: Url) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl DownloadStrategy for MetadataStrategy {
    fn contract(&self) -> EndpointContract {
        EndpointContract::Metadata
    }

    /// Non-2xx is a rejection whatever the body holds; a 2xx body that isn't
    /// the expected JSON is a `Decode` error.
    async fn fetch(&self, id: &MaterialId) -> Result<DownloadResult, DownloadError> {
        let response = send_get(&self.client, &self.endpoint, id).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            log::warn!(
                "[request] id={} rejected  status={}  error={}",
                id,
                status.as_u16(),
                rejection_detail(&body),
            );
            return Err(DownloadError::Http { status: status.as_u16() });
        }

        let body = response.bytes().await?;
        let metadata: MaterialMetadata = serde_json::from_slice(&body)?;
        log::info!("[request] id={} metadata name=\"{}\" size={}", id, metadata.name, metadata.size);
        Ok(DownloadResult::Metadata(metadata))
    }
}
