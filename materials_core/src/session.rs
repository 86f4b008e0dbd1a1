use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::delivery::file_delivery::FileDelivery;
use crate::downloader::material_downloader::MaterialDownloader;
use crate::notify::notice::Notice;
use crate::notify::notifier::MaterialNotifier;
use crate::notify::observer::MaterialObserver;
use crate::types::types::{
    DownloadError, DownloadRequest, DownloadResult, FailureReason, MaterialMetadata,
    SavedMaterial,
};

/// How a button click ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Metadata(MaterialMetadata),
    Saved(SavedMaterial),
    Failed(FailureReason),
    /// Settled after its token fired; observers were not told.
    Cancelled,
}

impl SessionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SessionOutcome::Metadata(_) | SessionOutcome::Saved(_))
    }
}

/// Request → deliver → notify, for one click at a time.
///
/// Holds no per-request state, so one session can serve any number of
/// concurrent clicks.
pub struct MaterialSession {
    downloader: Arc<MaterialDownloader>,
    delivery: FileDelivery,
    notifier: MaterialNotifier,
}

impl MaterialSession {
    pub fn new(downloader: Arc<MaterialDownloader>, delivery: FileDelivery) -> Self {
        Self {
            downloader,
            delivery,
            notifier: MaterialNotifier::new(),
        }
    }

    /// Register an observer. Must be called before `run()`.
    pub fn add_observer(&mut self, observer: Box<dyn MaterialObserver>) {
        self.notifier.add_observer(observer);
    }

    pub fn downloader(&self) -> &MaterialDownloader {
        &self.downloader
    }

    pub async fn run(&self, request: &DownloadRequest, cancel: &CancellationToken) -> SessionOutcome {
        self.notifier.started(request).await;

        let outcome = match self.downloader.try_request(request.id.as_str(), cancel).await {
            Ok(DownloadResult::Metadata(meta)) => SessionOutcome::Metadata(meta),
            Ok(DownloadResult::BinaryPayload(payload)) => {
                if cancel.is_cancelled() {
                    SessionOutcome::Cancelled
                } else {
                    match self.delivery.deliver(&payload).await {
                        Ok(saved) => SessionOutcome::Saved(saved),
                        Err(e) => {
                            log::error!("[deliver] id={} could not be saved: {}", request.id, e);
                            SessionOutcome::Failed(FailureReason::NetworkError)
                        }
                    }
                }
            }
            Ok(DownloadResult::Failure { reason }) => SessionOutcome::Failed(reason),
            Err(DownloadError::Cancelled) => SessionOutcome::Cancelled,
            Err(e) => {
                log::warn!("[request] id={} failed: {}", request.id, e);
                SessionOutcome::Failed(e.failure_reason())
            }
        };

        let notice = match &outcome {
            SessionOutcome::Metadata(meta) => Some(Notice::Metadata(meta.clone())),
            SessionOutcome::Saved(saved) => Some(Notice::Saved {
                display_name: request.display_name.clone(),
                path: saved.path.clone(),
            }),
            SessionOutcome::Failed(reason) => Some(Notice::Failure(*reason)),
            SessionOutcome::Cancelled => None,
        };
        if let Some(notice) = notice {
            self.notifier.notify(request, &notice).await;
        }

        outcome
    }
}
