use async_trait::async_trait;

use super::notice::Notice;
use crate::types::types::DownloadRequest;

/// Anything that surfaces request outcomes to the visitor.
///
/// Lifecycle for one request:
/// - `on_start` once, before the network call.
/// - exactly one of `on_notice` (success or failure) afterwards, unless the
///   request was cancelled, in which case nothing further is delivered.
#[async_trait]
pub trait MaterialObserver: Send + Sync + 'static {
    async fn on_start(&self, _request: &DownloadRequest) {}

    async fn on_notice(&self, request: &DownloadRequest, notice: &Notice);
}
