use super::notice::Notice;
use super::observer::MaterialObserver;
use crate::types::types::DownloadRequest;

/// Fans notices out to every registered observer, in registration order.
#[derive(Default)]
pub struct MaterialNotifier {
    observers: Vec<Box<dyn MaterialObserver>>,
}

impl MaterialNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observer(&mut self, observer: Box<dyn MaterialObserver>) {
        self.observers.push(observer);
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub async fn started(&self, request: &DownloadRequest) {
        for observer in &self.observers {
            observer.on_start(request).await;
        }
    }

    pub async fn notify(&self, request: &DownloadRequest, notice: &Notice) {
        for observer in &self.observers {
            observer.on_notice(request, notice).await;
        }
    }
}
