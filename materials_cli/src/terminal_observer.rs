use async_trait::async_trait;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use materials_core::notify::notice::Notice;
use materials_core::notify::observer::MaterialObserver;
use materials_core::types::types::DownloadRequest;

/// Shows a spinner per in-flight request and prints the notice when it
/// settles.
///
/// All spinners live under one `MultiProgress` so concurrent requests
/// render cleanly.
pub struct TerminalObserver {
    multi: MultiProgress,
    /// request_id → spinner
    spinners: Mutex<HashMap<String, ProgressBar>>,
}

impl TerminalObserver {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            spinners: Mutex::new(HashMap::new()),
        }
    }

    fn take_spinner(&self, request: &DownloadRequest) -> Option<ProgressBar> {
        self.spinners
            .lock()
            .ok()
            .and_then(|mut spinners| spinners.remove(&request.request_id.to_string()))
    }
}

#[async_trait]
impl MaterialObserver for TerminalObserver {
    async fn on_start(&self, request: &DownloadRequest) {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(style);
        pb.set_message(format!("{} [{}]", request.display_name, request.id));
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut spinners) = self.spinners.lock() {
            spinners.insert(request.request_id.to_string(), pb);
        }
    }

    async fn on_notice(&self, request: &DownloadRequest, notice: &Notice) {
        if let Some(pb) = self.take_spinner(request) {
            pb.finish_and_clear();
        }
        let line = match notice {
            Notice::Failure(_) => format!("✗ [{}] {}", request.id, notice),
            _ => format!("{}", notice),
        };
        // Suspend so the other spinners are redrawn below the line.
        self.multi.suspend(|| println!("{}", line));
    }
}
