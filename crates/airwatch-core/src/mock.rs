//! In-memory readings source for testing.
//!
//! [`MockSource`] serves a configurable list of readings without a network,
//! with injectable failures and latency.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use airwatch_types::Reading;

use crate::error::{Error, Result};
use crate::source::ReadingsSource;

/// A readings source backed by memory.
///
/// # Example
///
/// ```
/// use airwatch_core::{MockSource, ReadingsSource};
/// use airwatch_types::Reading;
/// use time::OffsetDateTime;
///
/// # async fn example() -> airwatch_core::Result<()> {
/// let source = MockSource::new();
/// source.push(Reading::new(420.0, OffsetDateTime::now_utc())).await;
///
/// let readings = source.fetch().await?;
/// assert_eq!(readings.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct MockSource {
    readings: RwLock<Vec<Reading>>,
    should_fail: AtomicBool,
    fail_message: RwLock<String>,
    latency_ms: AtomicU64,
    fetch_count: AtomicU32,
    remaining_failures: AtomicU32,
}

impl fmt::Debug for MockSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockSource")
            .field("should_fail", &self.should_fail.load(Ordering::Relaxed))
            .field("fetch_count", &self.fetch_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::with_readings(Vec::new())
    }

    /// Create a source serving `readings`.
    pub fn with_readings(readings: Vec<Reading>) -> Self {
        Self {
            readings: RwLock::new(readings),
            should_fail: AtomicBool::new(false),
            fail_message: RwLock::new("Mock failure".to_string()),
            latency_ms: AtomicU64::new(0),
            fetch_count: AtomicU32::new(0),
            remaining_failures: AtomicU32::new(0),
        }
    }

    /// Replace the served readings.
    pub async fn set_readings(&self, readings: Vec<Reading>) {
        *self.readings.write().await = readings;
    }

    /// Append a reading.
    pub async fn push(&self, reading: Reading) {
        self.readings.write().await.push(reading);
    }

    /// Serve nothing.
    pub async fn clear(&self) {
        self.readings.write().await.clear();
    }

    /// Make every fetch fail until reset.
    pub async fn set_should_fail(&self, fail: bool, message: Option<&str>) {
        self.should_fail.store(fail, Ordering::Relaxed);
        if let Some(msg) = message {
            *self.fail_message.write().await = msg.to_string();
        }
    }

    /// Make the next `count` fetches fail, then succeed again.
    pub fn fail_next(&self, count: u32) {
        self.remaining_failures.store(count, Ordering::Relaxed);
    }

    /// Delay every fetch by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Number of fetches attempted so far, including failed ones.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }

    async fn check_should_fail(&self) -> Result<()> {
        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        // Transient failures take precedence
        if self.remaining_failures.load(Ordering::Relaxed) > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(Error::Unavailable(self.fail_message.read().await.clone()));
        }

        if self.should_fail.load(Ordering::Relaxed) {
            Err(Error::Unavailable(self.fail_message.read().await.clone()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ReadingsSource for MockSource {
    async fn fetch(&self) -> Result<Vec<Reading>> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        self.check_should_fail().await?;
        Ok(self.readings.read().await.clone())
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

/// Builder for MockSource.
#[derive(Debug, Default)]
pub struct MockSourceBuilder {
    readings: Vec<Reading>,
    should_fail: bool,
    fail_message: Option<String>,
    latency: Duration,
}

impl MockSourceBuilder {
    /// Create a builder with no readings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reading.
    #[must_use]
    pub fn reading(mut self, reading: Reading) -> Self {
        self.readings.push(reading);
        self
    }

    /// Add several readings.
    #[must_use]
    pub fn readings(mut self, readings: impl IntoIterator<Item = Reading>) -> Self {
        self.readings.extend(readings);
        self
    }

    /// Fail every fetch with `message`.
    #[must_use]
    pub fn failing(mut self, message: &str) -> Self {
        self.should_fail = true;
        self.fail_message = Some(message.to_string());
        self
    }

    /// Delay every fetch.
    #[must_use]
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Build the MockSource.
    pub fn build(self) -> MockSource {
        let mut source = MockSource::with_readings(self.readings);
        source.should_fail.store(self.should_fail, Ordering::Relaxed);
        if let Some(msg) = self.fail_message {
            source.fail_message = RwLock::new(msg);
        }
        source.set_latency(self.latency);
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn reading(value: f64) -> Reading {
        Reading::new(value, OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap())
    }

    #[tokio::test]
    async fn test_serves_readings() {
        let source = MockSource::with_readings(vec![reading(1.0), reading(2.0)]);
        let fetched = source.fetch().await.unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_mutation() {
        let source = MockSource::new();
        assert!(source.fetch().await.unwrap().is_empty());

        source.push(reading(3.0)).await;
        assert_eq!(source.fetch().await.unwrap().len(), 1);

        source.set_readings(vec![reading(1.0), reading(2.0)]).await;
        assert_eq!(source.fetch().await.unwrap().len(), 2);

        source.clear().await;
        assert!(source.fetch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_should_fail() {
        let source = MockSource::new();
        source.set_should_fail(true, Some("db down")).await;

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, Error::Unavailable(ref msg) if msg == "db down"));
        assert!(err.is_transport());

        source.set_should_fail(false, None).await;
        assert!(source.fetch().await.is_ok());
    }

    #[tokio::test]
    async fn test_fail_next() {
        let source = MockSource::with_readings(vec![reading(1.0)]);
        source.fail_next(2);

        assert!(source.fetch().await.is_err());
        assert!(source.fetch().await.is_err());
        assert!(source.fetch().await.is_ok());
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency() {
        let source = MockSourceBuilder::new()
            .reading(reading(1.0))
            .latency(Duration::from_millis(500))
            .build();

        let start = tokio::time::Instant::now();
        source.fetch().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_builder_failing() {
        let source = MockSourceBuilder::new()
            .readings([reading(1.0), reading(2.0)])
            .failing("offline")
            .build();
        let err = source.fetch().await.unwrap_err();
        assert_eq!(err.to_string(), "Source unavailable: offline");
    }
}
