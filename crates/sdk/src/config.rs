//! Client configuration with builder pattern.
//!
//! Endpoint, membership id and tuning knobs for a subscription. Values
//! are plain data passed in by the caller; loading them from files or
//! the environment is the application's concern.

use std::time::Duration;

use snafu::ensure;

use crate::error::{ConfigSnafu, Result};

/// Default dial timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default delivery-channel capacity (records buffered ahead of the
/// consumer before the reader blocks).
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Configuration for an [`EventClient`](crate::EventClient).
#[derive(Debug, Clone)]
pub struct EventClientConfig {
    pub(crate) endpoint: String,
    pub(crate) msp_id: String,
    pub(crate) connect_timeout: Duration,
    pub(crate) channel_capacity: usize,
}

impl EventClientConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> EventClientConfigBuilder {
        EventClientConfigBuilder::default()
    }

    /// Returns the peer endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the membership id asserted in the creator identity.
    #[must_use]
    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    /// Returns the dial timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the delivery-channel capacity.
    #[must_use]
    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }
}

/// Builder for [`EventClientConfig`].
#[derive(Debug, Default)]
pub struct EventClientConfigBuilder {
    endpoint: Option<String>,
    msp_id: Option<String>,
    connect_timeout: Option<Duration>,
    channel_capacity: Option<usize>,
}

impl EventClientConfigBuilder {
    /// Sets the peer endpoint URL (e.g. `http://peer0.example.com:7053`).
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the local membership id (mspId).
    #[must_use]
    pub fn msp_id(mut self, msp_id: impl Into<String>) -> Self {
        self.msp_id = Some(msp_id.into());
        self
    }

    /// Sets the dial timeout. Default 5 seconds.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the delivery-channel capacity. Default 256.
    ///
    /// The channel is bounded: when the consumer lags by more than this
    /// many records the stream reader blocks (backpressure). Records are
    /// never dropped.
    #[must_use]
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Some(capacity);
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Config`](crate::SdkError) when the endpoint or
    /// msp id is missing/empty, or the channel capacity is zero.
    pub fn build(self) -> Result<EventClientConfig> {
        let endpoint = self.endpoint.unwrap_or_default();
        ensure!(!endpoint.is_empty(), ConfigSnafu { message: "endpoint is required" });

        let msp_id = self.msp_id.unwrap_or_default();
        ensure!(!msp_id.is_empty(), ConfigSnafu { message: "msp_id is required" });

        let channel_capacity = self.channel_capacity.unwrap_or(DEFAULT_CHANNEL_CAPACITY);
        ensure!(
            channel_capacity > 0,
            ConfigSnafu { message: "channel_capacity must be at least 1" }
        );

        Ok(EventClientConfig {
            endpoint,
            msp_id,
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            channel_capacity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_defaults() {
        let config = EventClientConfig::builder()
            .endpoint("http://localhost:7053")
            .msp_id("Org1MSP")
            .build()
            .expect("valid config");

        assert_eq!(config.endpoint(), "http://localhost:7053");
        assert_eq!(config.msp_id(), "Org1MSP");
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.channel_capacity(), 256);
    }

    #[test]
    fn custom_values_are_kept() {
        let config = EventClientConfig::builder()
            .endpoint("http://peer:7053")
            .msp_id("Org2MSP")
            .connect_timeout(Duration::from_millis(250))
            .channel_capacity(8)
            .build()
            .expect("valid config");

        assert_eq!(config.connect_timeout(), Duration::from_millis(250));
        assert_eq!(config.channel_capacity(), 8);
    }

    #[test]
    fn missing_endpoint_is_rejected() {
        let err = EventClientConfig::builder().msp_id("Org1MSP").build().unwrap_err();
        assert!(err.to_string().contains("endpoint"));
    }

    #[test]
    fn missing_msp_id_is_rejected() {
        let err =
            EventClientConfig::builder().endpoint("http://peer:7053").build().unwrap_err();
        assert!(err.to_string().contains("msp_id"));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = EventClientConfig::builder()
            .endpoint("http://peer:7053")
            .msp_id("Org1MSP")
            .channel_capacity(0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("channel_capacity"));
    }
}
