/*!
 * Payload retrieval and record extraction
 *
 * The directory payload is fetched once per session with a single GET. The
 * body may be a bare array, an object with a `doctors` array, or an object
 * holding some other array; [`Payload::decode`] names which one it found or
 * why none was usable.
 */

use std::path::Path;
use serde_json::Value;
use tracing::info;

use crate::error::{ExtractionFailure, PayloadSource};
use crate::{DirectoryError, Result};

#[cfg(feature = "fetch")]
use std::time::Duration;
#[cfg(feature = "fetch")]
use tracing::debug;
#[cfg(feature = "fetch")]
use crate::config::DirectoryConfig;

/// Recognized payload shapes, each carrying its record sequence
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The body is itself the record sequence
    Bare(Vec<Value>),
    /// The body is an object with a `doctors` sequence
    Doctors(Vec<Value>),
    /// The body is an object; records come from its first sequence field
    FirstSequence {
        field: String,
        records: Vec<Value>,
    },
}

impl Payload {
    /// Classify a parsed body
    ///
    /// An empty sequence is still a recognized shape here; emptiness is
    /// rejected by [`Payload::into_records`].
    pub fn decode(body: Value) -> std::result::Result<Self, ExtractionFailure> {
        match body {
            Value::Array(records) => Ok(Payload::Bare(records)),
            Value::Object(mut fields) => {
                if matches!(fields.get("doctors"), Some(Value::Array(_))) {
                    if let Some(Value::Array(records)) = fields.remove("doctors") {
                        return Ok(Payload::Doctors(records));
                    }
                }
                // field order follows the body (serde_json preserve_order)
                fields
                    .into_iter()
                    .find_map(|(field, value)| match value {
                        Value::Array(records) => Some(Payload::FirstSequence { field, records }),
                        _ => None,
                    })
                    .ok_or(ExtractionFailure::UnrecognizedShape("object without any array field"))
            }
            Value::Null => Err(ExtractionFailure::UnrecognizedShape("null body")),
            _ => Err(ExtractionFailure::UnrecognizedShape("scalar body")),
        }
    }

    pub fn source(&self) -> PayloadSource {
        match self {
            Payload::Bare(_) => PayloadSource::Bare,
            Payload::Doctors(_) => PayloadSource::Doctors,
            Payload::FirstSequence { field, .. } => PayloadSource::Field(field.clone()),
        }
    }

    pub fn records(&self) -> &[Value] {
        match self {
            Payload::Bare(records) | Payload::Doctors(records) => records,
            Payload::FirstSequence { records, .. } => records,
        }
    }

    /// Take the record sequence, failing if it is empty
    pub fn into_records(self) -> std::result::Result<Vec<Value>, ExtractionFailure> {
        if self.records().is_empty() {
            return Err(ExtractionFailure::Empty { source: self.source() });
        }
        match self {
            Payload::Bare(records) | Payload::Doctors(records) => Ok(records),
            Payload::FirstSequence { records, .. } => Ok(records),
        }
    }
}

/// Extract the non-empty record sequence from a parsed body
pub fn extract_records(body: Value) -> Result<Vec<Value>> {
    let payload = Payload::decode(body).map_err(DirectoryError::extraction)?;
    let source = payload.source();
    let records = payload.into_records().map_err(DirectoryError::extraction)?;
    info!(count = records.len(), %source, "extracted provider records");
    Ok(records)
}

/// Parse a raw response body and extract its records
pub fn extract_from_bytes(body: &[u8]) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| DirectoryError::extraction(ExtractionFailure::InvalidJson(e.to_string())))?;
    extract_records(value)
}

/// Read a payload from a local JSON file and extract its records
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Value>> {
    let path = path.as_ref();
    info!(path = %path.display(), "loading provider payload from file");
    let bytes = std::fs::read(path).map_err(|e| DirectoryError::io_at(e, path))?;
    extract_from_bytes(&bytes)
}

/// One-shot HTTP client for the directory payload
#[cfg(feature = "fetch")]
pub struct DirectoryClient {
    endpoint_url: String,
    client: reqwest::Client,
}

#[cfg(feature = "fetch")]
impl DirectoryClient {
    /// Create a client from configuration
    pub fn new(config: &DirectoryConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        let client = builder.build().map_err(|e| DirectoryError::Custom {
            message: format!("Failed to create HTTP client: {}", e),
            suggestion: Some("Check your network configuration".to_string()),
        })?;

        Ok(Self {
            endpoint_url: config.endpoint_url.clone(),
            client,
        })
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Fetch the payload and extract its raw records
    ///
    /// No retries: a non-success status is a [`DirectoryError::Network`], an
    /// unusable body a [`DirectoryError::Extraction`].
    pub async fn load(&self) -> Result<Vec<Value>> {
        let url = self.endpoint_url.as_str();
        info!(%url, "fetching provider directory");

        let response = self.client.get(url).send().await
            .map_err(|e| DirectoryError::transport(format!("Failed to connect: {}", e), url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::http_status(status.as_u16(), url));
        }

        let body = response.bytes().await
            .map_err(|e| DirectoryError::transport(format!("Failed to read response body: {}", e), url))?;
        debug!(bytes = body.len(), "received response body");

        extract_from_bytes(&body)
    }
}

// Stub so callers get a clear error when the client is compiled out
#[cfg(not(feature = "fetch"))]
pub struct DirectoryClient;

#[cfg(not(feature = "fetch"))]
impl DirectoryClient {
    pub fn new(_config: &crate::config::DirectoryConfig) -> Result<Self> {
        Ok(Self)
    }

    pub async fn load(&self) -> Result<Vec<Value>> {
        Err(DirectoryError::feature_required("fetch"))
    }
}
