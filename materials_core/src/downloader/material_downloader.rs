use std::sync::Arc;

use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::config::{DownloaderConfig, EndpointContract, CONNECT_TIMEOUT};
use crate::downloader::strategy::binary_strategy::BinaryStrategy;
use crate::downloader::strategy::download_strategy::DownloadStrategy;
use crate::downloader::strategy::metadata_strategy::MetadataStrategy;
use crate::types::types::{DownloadError, DownloadResult, MaterialId};

/// Turns a material id into a delivered artifact or a reported failure.
///
/// Stateless between calls: no cache, no retry. Concurrent calls share only
/// the HTTP connection pool.
pub struct MaterialDownloader {
    strategy: Arc<dyn DownloadStrategy>,
}

impl MaterialDownloader {
    /// Builds the HTTP client and the strategy matching `config.contract`.
    pub fn new(config: &DownloaderConfig) -> Result<Self, DownloadError> {
        let client = Arc::new(
            Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .timeout(config.timeout)
                .build()?,
        );
        let endpoint = config.endpoint.clone();
        let strategy: Arc<dyn DownloadStrategy> = match config.contract {
            EndpointContract::Metadata => Arc::new(MetadataStrategy::new(client, endpoint)),
            EndpointContract::Binary => Arc::new(BinaryStrategy::new(client, endpoint)),
        };
        log::debug!(
            "[downloader] endpoint={} contract={} timeout={:?}",
            config.endpoint,
            config.contract,
            config.timeout,
        );
        Ok(Self::with_strategy(strategy))
    }

    pub fn with_strategy(strategy: Arc<dyn DownloadStrategy>) -> Self {
        Self { strategy }
    }

    pub fn contract(&self) -> EndpointContract {
        self.strategy.contract()
    }

    /// Never fails: every error is folded into `DownloadResult::Failure`.
    pub async fn request_material(&self, id: &str) -> DownloadResult {
        self.request_material_with_cancel(id, &CancellationToken::new())
            .await
    }

    /// Like `request_material`, but gives up as soon as `cancel` fires.
    pub async fn request_material_with_cancel(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> DownloadResult {
        match self.try_request(id, cancel).await {
            Ok(result) => result,
            Err(e) => {
                let reason = e.failure_reason();
                log::warn!("[request] id={} failed ({:?}): {}", id, reason, e);
                DownloadResult::failure(reason)
            }
        }
    }

    /// The fallible core of a request, for callers that need to tell a
    /// cancellation apart from a real failure.
    pub async fn try_request(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<DownloadResult, DownloadError> {
        let id = MaterialId::new(id)?;
        if cancel.is_cancelled() {
            return Err(DownloadError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log::info!("[request] id={} cancelled", id);
                Err(DownloadError::Cancelled)
            }
            result = self.strategy.fetch(&id) => result,
        }
    }
}
