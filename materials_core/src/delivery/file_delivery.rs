use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::DownloaderConfig;
use crate::delivery::path_sanitizer::{default_download_dir, safe_output_path};
use crate::types::types::{BinaryPayload, DownloadError, SavedMaterial};

/// How many times a concurrent save may take our chosen name before we give up.
const MAX_PERSIST_ATTEMPTS: usize = 16;

/// Bytes parked in a hidden temp file next to their final destination.
///
/// The temp file is removed when the guard drops unless `persist_unique` moved it
/// into place, so it is released exactly once on every path.
pub struct StagedPayload {
    file: NamedTempFile,
    len: u64,
}

impl StagedPayload {
    pub fn stage(dir: &Path, bytes: &[u8]) -> Result<Self, DownloadError> {
        let mut file = tempfile::Builder::new()
            .prefix(".material-")
            .suffix(".part")
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.as_file().sync_all()?;
        Ok(Self {
            file,
            len: bytes.len() as u64,
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Moves the staged file to a free name derived from `suggested`. Never
    /// overwrites; on failure the temp file rides along in the error and is
    /// removed when it drops.
    ///
    /// The free name is picked again whenever another save claims it between
    /// the lookup and the rename.
    pub fn persist_unique(
        self,
        dir: &Path,
        suggested: &str,
    ) -> Result<SavedMaterial, DownloadError> {
        let len = self.len;
        let mut file = self.file;
        let mut attempt = 1;
        loop {
            let target = safe_output_path(dir, suggested);
            match file.persist_noclobber(&target) {
                Ok(_) => {
                    return Ok(SavedMaterial {
                        path: target,
                        bytes_written: len,
                    })
                }
                Err(e)
                    if e.error.kind() == ErrorKind::AlreadyExists
                        && attempt < MAX_PERSIST_ATTEMPTS =>
                {
                    log::debug!("[deliver] {:?} taken, picking another name", target);
                    file = e.file;
                    attempt += 1;
                }
                Err(e) => return Err(DownloadError::Disk(e.error)),
            }
        }
    }
}

/// Saves binary payloads into the user's download directory.
#[derive(Debug, Clone)]
pub struct FileDelivery {
    dir: PathBuf,
}

impl FileDelivery {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn from_config(config: &DownloaderConfig) -> Self {
        Self::new(config.download_dir.clone().unwrap_or_else(default_download_dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn deliver(&self, payload: &BinaryPayload) -> Result<SavedMaterial, DownloadError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let dir = self.dir.clone();
        let suggested = payload.suggested_filename.clone();
        let bytes = payload.bytes.clone();

        let saved = tokio::task::spawn_blocking(move || {
            let staged = StagedPayload::stage(&dir, &bytes)?;
            log::debug!("[deliver] staged {} bytes at {:?}", bytes.len(), staged.path());
            staged.persist_unique(&dir, &suggested)
        })
        .await
        .map_err(|e| DownloadError::Disk(std::io::Error::other(e.to_string())))??;

        log::info!("[deliver] saved {:?} ({} bytes)", saved.path, saved.bytes_written);
        Ok(saved)
    }
}
