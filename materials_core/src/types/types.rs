use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Shown when the endpoint answered but rejected the request.
pub const HTTP_ERROR_MESSAGE: &str = "Ошибка при скачивании материала";

/// Shown when the request could not be completed at all.
pub const NETWORK_ERROR_MESSAGE: &str = "Произошла ошибка. Попробуйте позже.";

/// A material identifier such as `"articulation"`.
///
/// Only non-emptiness is checked here; whether the id exists is the
/// backend's call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MaterialId(String);

impl MaterialId {
    pub fn new(id: impl Into<String>) -> Result<Self, DownloadError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DownloadError::InvalidId);
        }
        Ok(Self(id))
    }

    pub(crate) fn from_static(id: &'static str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MaterialId {
    type Error = DownloadError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        MaterialId::new(value)
    }
}

impl From<MaterialId> for String {
    fn from(id: MaterialId) -> Self {
        id.0
    }
}

/// One click on a material button. Lives only until the request settles.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub request_id: Uuid,
    pub id: MaterialId,
    pub display_name: String,
}

impl DownloadRequest {
    pub fn new(id: MaterialId, display_name: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            id,
            display_name: display_name.into(),
        }
    }
}

/// JSON body returned by the endpoint under the metadata contract.
///
/// Only `name`, `size` and `message` are required; the remaining fields are
/// filled in by the reference backend and kept when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialMetadata {
    pub name: String,
    pub size: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl MaterialMetadata {
    pub fn new(
        name: impl Into<String>,
        size: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            size: size.into(),
            message: message.into(),
            id: None,
            filename: None,
            description: None,
            download_url: None,
        }
    }
}

/// Raw file body returned under the binary contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryPayload {
    pub bytes: Vec<u8>,
    pub suggested_filename: String,
}

impl BinaryPayload {
    /// Filenames are always derived from the id, never from response headers.
    pub fn for_material(id: &MaterialId, bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            suggested_filename: format!("{}.pdf", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    HttpError,
    NetworkError,
}

impl FailureReason {
    pub fn user_message(&self) -> &'static str {
        match self {
            FailureReason::HttpError => HTTP_ERROR_MESSAGE,
            FailureReason::NetworkError => NETWORK_ERROR_MESSAGE,
        }
    }
}

/// Outcome of a single `request_material` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadResult {
    Metadata(MaterialMetadata),
    BinaryPayload(BinaryPayload),
    Failure { reason: FailureReason },
}

impl DownloadResult {
    pub fn failure(reason: FailureReason) -> Self {
        DownloadResult::Failure { reason }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, DownloadResult::Failure { .. })
    }
}

/// Where a delivered binary payload ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedMaterial {
    pub path: PathBuf,
    pub bytes_written: u64,
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("endpoint rejected the request with status {status}")]
    Http { status: u16 },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request was cancelled")]
    Cancelled,

    #[error("disk error: {0}")]
    Disk(#[from] std::io::Error),

    #[error("material id must not be empty")]
    InvalidId,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DownloadError {
    /// Collapse the internal taxonomy onto the two user-visible failures.
    pub fn failure_reason(&self) -> FailureReason {
        match self {
            DownloadError::Http { .. } => FailureReason::HttpError,
            _ => FailureReason::NetworkError,
        }
    }
}
