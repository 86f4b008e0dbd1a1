use async_trait::async_trait;

use super::notice::Notice;
use super::observer::MaterialObserver;
use crate::types::types::DownloadRequest;

/// Writes every notice to the `log` facade.
pub struct LogObserver;

#[async_trait]
impl MaterialObserver for LogObserver {
    async fn on_start(&self, request: &DownloadRequest) {
        log::info!(
            "[materials] {} requesting id={} (\"{}\")",
            request.request_id,
            request.id,
            request.display_name,
        );
    }

    async fn on_notice(&self, request: &DownloadRequest, notice: &Notice) {
        match notice {
            Notice::Failure(reason) => log::warn!(
                "[materials] {} id={} failed ({:?}): {}",
                request.request_id,
                request.id,
                reason,
                notice,
            ),
            _ => log::info!(
                "[materials] {} id={} done: {}",
                request.request_id,
                request.id,
                notice.to_string().replace('\n', " "),
            ),
        }
    }
}
