use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::config::EndpointContract;
use crate::downloader::strategy::download_strategy::{rejection_detail, send_get, DownloadStrategy};
use crate::types::types::{BinaryPayload, DownloadError, DownloadResult, MaterialId};

/// Endpoint answers with the file itself. Content-Type is not inspected.
pub struct BinaryStrategy {
    client: Arc<Client>,
    endpoint: Url,
}

impl BinaryStrategy {
    pub fn new(client: Arc<Client>, endpoint: Url) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl DownloadStrategy for BinaryStrategy {
    fn contract(&self) -> EndpointContract {
        EndpointContract::Binary
    }

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

        let bytes = response.bytes().await?;
        log::info!("[request] id={} received {} bytes", id, bytes.len());
        Ok(DownloadResult::BinaryPayload(BinaryPayload::for_material(id, bytes.to_vec())))
    }
}
