//! Readings sources.
//!
//! This module provides the [`ReadingsSource`] trait that abstracts over the
//! HTTP endpoint and in-memory sources used for testing, and the
//! [`HttpSource`] client for the `GET /api/lectura` endpoint.
//!
//! # Example
//!
//! ```no_run
//! use airwatch_core::{HttpSource, ReadingsSource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = HttpSource::new("http://localhost:5000/api/lectura")?;
//! let readings = source.fetch().await?;
//! println!("Fetched {} readings", readings.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use airwatch_types::{ParseError, Reading, WireReading};

use crate::config::DEFAULT_REQUEST_TIMEOUT;
use crate::error::{Error, Result};

/// Anything that can be asked for the current list of readings.
///
/// Each call is an independent query; implementations keep no paging state.
#[async_trait]
pub trait ReadingsSource: Send + Sync {
    /// Fetch all readings the source currently serves.
    async fn fetch(&self) -> Result<Vec<Reading>>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// HTTP client for a readings endpoint.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    /// Create a source with the default request timeout.
    ///
    /// # Arguments
    ///
    /// * `url` - Full URL of the readings endpoint (e.g., "http://localhost:5000/api/lectura")
    pub fn new(url: &str) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a source with a custom request timeout.
    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::Request)?;
        Self::with_client(url, client)
    }

    /// Create a source with a custom reqwest Client.
    pub fn with_client(url: &str, client: Client) -> Result<Self> {
        let url = validate_url(url)?;
        Ok(Self { client, url })
    }

    /// The endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ReadingsSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<Reading>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::NotReachable {
                url: self.url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or_else(|| status.to_string());

            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: serde_json::Value = response.json().await.map_err(Error::Request)?;
        let batch = decode_readings(body)?;
        if batch.rejected > 0 {
            warn!(
                "Dropped {} malformed record(s) from {}",
                batch.rejected, self.url
            );
        }
        debug!("Fetched {} reading(s) from {}", batch.readings.len(), self.url);
        Ok(batch.readings)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Readings decoded from one response body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedBatch {
    /// Records that parsed, in source order.
    pub readings: Vec<Reading>,
    /// Records that were dropped as malformed.
    pub rejected: usize,
}

/// Decode a response body into readings.
///
/// The body must be a JSON array. Each element that lacks a numeric `valor`
/// or a parseable `fecha` is dropped and counted; the rest are kept in order.
pub fn decode_readings(body: serde_json::Value) -> Result<DecodedBatch> {
    let serde_json::Value::Array(items) = body else {
        return Err(Error::InvalidResponse(format!(
            "expected a JSON array of readings, got {}",
            json_kind(&body)
        )));
    };

    let mut batch = DecodedBatch::default();
    for (index, item) in items.into_iter().enumerate() {
        match decode_record(item) {
            Ok(reading) => batch.readings.push(reading),
            Err(e) => {
                debug!("Skipping record {}: {}", index, e);
                batch.rejected += 1;
            }
        }
    }
    Ok(batch)
}

/// Decode one element of the response array.
fn decode_record(item: serde_json::Value) -> std::result::Result<Reading, ParseError> {
    let wire: WireReading =
        serde_json::from_value(item).map_err(|e| ParseError::InvalidRecord(e.to_string()))?;
    Reading::try_from(wire)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

fn validate_url(url: &str) -> Result<String> {
    let url = url.trim().to_string();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(Error::InvalidUrl(format!(
            "URL must start with http:// or https://, got: {}",
            url
        )));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_creation() {
        let source = HttpSource::new("http://localhost:5000/api/lectura").unwrap();
        assert_eq!(source.url(), "http://localhost:5000/api/lectura");
        assert_eq!(source.describe(), "http://localhost:5000/api/lectura");
    }

    #[test]
    fn test_source_invalid_url() {
        let result = HttpSource::new("localhost:5000/api/lectura");
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_decode_valid_body() {
        let body = json!([
            {"valor": 410.5, "fecha": "2025-01-01T12:00:05"},
            {"valor": 300, "fecha": "2025-01-01T12:00:00.250000"}
        ]);
        let batch = decode_readings(body).unwrap();
        assert_eq!(batch.rejected, 0);
        assert_eq!(batch.readings.len(), 2);
        assert_eq!(batch.readings[0].value, 410.5);
        assert_eq!(batch.readings[1].value, 300.0);
    }

    #[test]
    fn test_decode_drops_malformed_records() {
        let body = json!([
            {"valor": 410.5, "fecha": "2025-01-01T12:00:05"},
            {"valor": "high", "fecha": "2025-01-01T12:00:04"},
            {"valor": 200, "fecha": "sometime"},
            {"fecha": "2025-01-01T12:00:03"},
            42,
            {"valor": 100, "fecha": "2025-01-01T12:00:02"}
        ]);
        let batch = decode_readings(body).unwrap();
        assert_eq!(batch.rejected, 4);
        let values: Vec<f64> = batch.readings.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![410.5, 100.0]);
    }

    #[test]
    fn test_decode_record_errors() {
        let err = decode_record(json!({"valor": "high", "fecha": "2025-01-01T12:00:04"}))
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidRecord(_)));

        let err = decode_record(json!({"valor": 200, "fecha": "sometime"})).unwrap_err();
        assert!(matches!(err, ParseError::InvalidTimestamp { ref value, .. } if value == "sometime"));
    }

    #[test]
    fn test_decode_empty_array() {
        let batch = decode_readings(json!([])).unwrap();
        assert!(batch.readings.is_empty());
        assert_eq!(batch.rejected, 0);
    }

    #[test]
    fn test_decode_rejects_non_array() {
        let err = decode_readings(json!({"error": "boom"})).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
        assert!(err.to_string().contains("an object"));
    }
}
