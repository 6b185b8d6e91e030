//! Where the two remote documents come from, and the two-stage fetch that
//! turns them into parsed pipeline inputs.
//!
//! The topology is fetched first; the attribute table is requested only once
//! the topology has arrived and parsed. Either fetch failing, by transport
//! error or non-success status, makes the whole map unavailable.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use enrichment::{PipelineError, SourceKind, SourcesReady};
use formats::{parse_country_features, parse_country_records, TopologyFeature, COUNTRIES_OBJECT};
use tracing::info;

#[derive(Debug)]
pub struct SourceError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {source}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A single JSON document fetched once at startup.
///
/// Methods return boxed futures for dyn-compatibility.
pub trait DataSource: Send + Sync {
    /// Human-readable location for logs.
    fn location(&self) -> String;

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<u8>, SourceError>>;
}

pub struct FilesystemSource {
    path: PathBuf,
}

impl FilesystemSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DataSource for FilesystemSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<u8>, SourceError>> {
        Box::pin(async move {
            tokio::fs::read(&self.path)
                .await
                .map_err(|e| SourceError::with_source("Failed to read source file", e))
        })
    }
}

pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

impl DataSource for HttpSource {
    fn location(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<u8>, SourceError>> {
        Box::pin(async move {
            let resp = self
                .client
                .get(&self.url)
                .send()
                .await
                .map_err(|e| SourceError::with_source("HTTP request failed", e))?;

            if !resp.status().is_success() {
                return Err(SourceError::new(format!("HTTP error: {}", resp.status())));
            }

            let bytes = resp
                .bytes()
                .await
                .map_err(|e| SourceError::with_source("Failed to read response body", e))?;
            Ok(bytes.to_vec())
        })
    }
}

/// Fixed payload, or a fixed failure.
pub struct MemorySource {
    payload: Result<Vec<u8>, String>,
}

impl MemorySource {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: Ok(payload.into()),
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            payload: Err(reason.into()),
        }
    }
}

impl DataSource for MemorySource {
    fn location(&self) -> String {
        "memory".to_string()
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<u8>, SourceError>> {
        let result = self.payload.clone().map_err(SourceError::new);
        Box::pin(async move { result })
    }
}

/// `http://` and `https://` locations are fetched over the network, anything
/// else is read from disk.
pub fn source_for(location: &str, client: &reqwest::Client) -> Box<dyn DataSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpSource::new(location, client.clone()))
    } else {
        Box::new(FilesystemSource::new(location))
    }
}

/// First stage: the topology arrived and parsed.
#[derive(Debug)]
pub struct TopologyStage {
    pub features: Vec<TopologyFeature>,
}

impl TopologyStage {
    pub async fn fetch(source: &dyn DataSource) -> Result<Self, PipelineError> {
        let bytes = fetch_document(source, SourceKind::Topology).await?;
        let payload = String::from_utf8_lossy(&bytes);
        let features = parse_country_features(&payload, COUNTRIES_OBJECT)?;
        info!(features = features.len(), source = %source.location(), "topology loaded");
        Ok(Self { features })
    }

    /// Second stage: the attribute table, requested only after the topology.
    pub async fn fetch_attributes(
        self,
        source: &dyn DataSource,
    ) -> Result<SourcesReady, PipelineError> {
        let bytes = fetch_document(source, SourceKind::Attributes).await?;
        let payload = String::from_utf8_lossy(&bytes);
        let attributes = parse_country_records(&payload)?;
        info!(records = attributes.len(), source = %source.location(), "country attributes loaded");
        Ok(SourcesReady {
            topology: self.features,
            attributes,
        })
    }
}

pub async fn fetch_sources(
    topology: &dyn DataSource,
    attributes: &dyn DataSource,
) -> Result<SourcesReady, PipelineError> {
    TopologyStage::fetch(topology)
        .await?
        .fetch_attributes(attributes)
        .await
}

async fn fetch_document(source: &dyn DataSource, kind: SourceKind) -> Result<Vec<u8>, PipelineError> {
    source
        .fetch()
        .await
        .map_err(|err| PipelineError::SourceUnavailable {
            source: kind,
            reason: format!("{}: {err}", source.location()),
        })
}
