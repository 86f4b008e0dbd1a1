use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::types::types::DownloadError;

/// Default total timeout for one material request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connect timeout applied to every request.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub const ENDPOINT_ENV: &str = "MATERIALS_ENDPOINT";
pub const CONTRACT_ENV: &str = "MATERIALS_CONTRACT";
pub const DOWNLOAD_DIR_ENV: &str = "MATERIALS_DOWNLOAD_DIR";
pub const TIMEOUT_ENV: &str = "MATERIALS_TIMEOUT_SECS";

/// Endpoint the page was deployed against.
pub const DEFAULT_ENDPOINT: &str =
    "https://functions.poehali.dev/4a75476f-857b-4505-813c-ced5409e0204";

/// Which response shape the deployed endpoint speaks.
///
/// A deployment uses exactly one of these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointContract {
    /// JSON `{name, size, message}` describing the material.
    #[default]
    Metadata,
    /// The PDF itself as the response body.
    Binary,
}

impl FromStr for EndpointContract {
    type Err = DownloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metadata" | "json" => Ok(EndpointContract::Metadata),
            "binary" | "pdf" => Ok(EndpointContract::Binary),
            other => Err(DownloadError::Config(format!("unknown contract {:?}", other))),
        }
    }
}

impl fmt::Display for EndpointContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointContract::Metadata => f.write_str("metadata"),
            EndpointContract::Binary => f.write_str("binary"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    pub endpoint: Url,
    pub contract: EndpointContract,
    pub timeout: Duration,
    /// `None` resolves to the platform download directory at delivery time.
    pub download_dir: Option<PathBuf>,
}

impl DownloaderConfig {
    pub fn builder(endpoint: &str) -> DownloaderConfigBuilder {
        DownloaderConfigBuilder::new(endpoint)
    }

    /// Reads `MATERIALS_*` variables, falling back to defaults for any that
    /// are unset.
    pub fn from_env() -> Result<Self, DownloadError> {
        let endpoint =
            std::env::var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let mut builder = DownloaderConfigBuilder::new(&endpoint);

        if let Ok(contract) = std::env::var(CONTRACT_ENV) {
            builder = builder.with_contract(contract.parse()?);
        }
        if let Ok(secs) = std::env::var(TIMEOUT_ENV) {
            builder = builder.with_timeout(parse_timeout_secs(&secs)?);
        }
        if let Ok(dir) = std::env::var(DOWNLOAD_DIR_ENV) {
            builder = builder.with_download_dir(PathBuf::from(dir));
        }

        builder.build()
    }
}

/// Parses a `MATERIALS_TIMEOUT_SECS` value.
pub fn parse_timeout_secs(value: &str) -> Result<Duration, DownloadError> {
    value
        .trim()
        .parse()
        .map(Duration::from_secs)
        .map_err(|_| DownloadError::Config(format!("{} must be a number of seconds", TIMEOUT_ENV)))
}

pub struct DownloaderConfigBuilder {
    endpoint: String,
    contract: EndpointContract,
    timeout: Duration,
    download_dir: Option<PathBuf>,
}

impl DownloaderConfigBuilder {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            contract: EndpointContract::default(),
            timeout: DEFAULT_TIMEOUT,
            download_dir: None,
        }
    }

    pub fn with_contract(mut self, contract: EndpointContract) -> Self {
        self.contract = contract;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_download_dir(mut self, dir: PathBuf) -> Self {
        self.download_dir = Some(dir);
        self
    }

    pub fn build(self) -> Result<DownloaderConfig, DownloadError> {
        let endpoint = Url::parse(&self.endpoint)
            .map_err(|e| DownloadError::Config(format!("endpoint {:?}: {}", self.endpoint, e)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(DownloadError::Config(format!(
                "endpoint must be http or https, got {:?}",
                endpoint.scheme()
            )));
        }
        if self.timeout.is_zero() {
            return Err(DownloadError::Config("timeout must be positive".into()));
        }
        Ok(DownloaderConfig {
            endpoint,
            contract: self.contract,
            timeout: self.timeout,
            download_dir: self.download_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_parses_aliases() {
        assert_eq!("metadata".parse::<EndpointContract>().unwrap(), EndpointContract::Metadata);
        assert_eq!("JSON".parse::<EndpointContract>().unwrap(), EndpointContract::Metadata);
        assert_eq!(" binary ".parse::<EndpointContract>().unwrap(), EndpointContract::Binary);
        assert!("xml".parse::<EndpointContract>().is_err());
    }

    #[test]
    fn builder_defaults() {
        let config = DownloaderConfig::builder("http://localhost:8080/").build().unwrap();
        assert_eq!(config.contract, EndpointContract::Metadata);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.download_dir.is_none());
    }

    #[test]
    fn rejects_bad_endpoints() {
        assert!(DownloaderConfig::builder("not a url").build().is_err());
        assert!(DownloaderConfig::builder("ftp://example.com/").build().is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let result = DownloaderConfig::builder("http://localhost/")
            .with_timeout(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(DownloadError::Config(_))));
    }

    #[test]
    fn default_endpoint_is_valid() {
        assert!(DownloaderConfig::builder(DEFAULT_ENDPOINT).build().is_ok());
    }

    #[test]
    fn timeout_secs_parse() {
        assert_eq!(parse_timeout_secs(" 12 ").unwrap(), Duration::from_secs(12));
        assert!(matches!(parse_timeout_secs("soon"), Err(DownloadError::Config(_))));
    }
}
