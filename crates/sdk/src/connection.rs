//! Peer transport lifecycle: dial, size limits, teardown.

use std::time::Duration;

use tonic::transport::{Channel, Endpoint};

use crate::config::EventClientConfig;
use crate::error::{ConnectionSnafu, Result, TimeoutSnafu};

/// Maximum inbound/outbound gRPC message size.
///
/// Committed blocks can carry many large transactions, so the tonic
/// default of 4 MiB is far too small. 100 MiB matches what peers accept.
pub const GRPC_MAX_MESSAGE_SIZE: usize = 100 * 1024 * 1024;

/// HTTP/2 keep-alive interval for idle connections.
const HTTP2_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// HTTP/2 keep-alive timeout.
const HTTP2_KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(10);

/// TCP keepalive interval.
const TCP_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(60);

/// One dialed connection to a peer's event port.
///
/// The wrapped tonic [`Channel`] shares its HTTP/2 connection across
/// clones; teardown happens when the last clone is dropped, which makes
/// close idempotent and safe after partial failure.
#[derive(Debug, Clone)]
pub struct PeerConnection {
    channel: Channel,
}

impl PeerConnection {
    /// Dials the peer, honoring the configured connect timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Connection`](crate::SdkError) when the
    /// endpoint URL cannot be parsed, [`SdkError::Timeout`] when the
    /// dial exceeds the deadline, and [`SdkError::Transport`] when the
    /// connection attempt itself fails.
    pub async fn open(config: &EventClientConfig) -> Result<Self> {
        let endpoint = Endpoint::try_from(config.endpoint.clone())
            .map_err(|e| {
                ConnectionSnafu {
                    message: format!("invalid endpoint '{}': {e}", config.endpoint),
                }
                .build()
            })?
            .connect_timeout(config.connect_timeout)
            .tcp_nodelay(true)
            .tcp_keepalive(Some(TCP_KEEPALIVE_INTERVAL))
            .http2_keep_alive_interval(HTTP2_KEEPALIVE_INTERVAL)
            .keep_alive_timeout(HTTP2_KEEPALIVE_TIMEOUT)
            .keep_alive_while_idle(true);

        // Endpoint::connect_timeout does not bound name resolution, so the
        // whole dial is wrapped in an outer deadline as well.
        let channel = tokio::time::timeout(config.connect_timeout, endpoint.connect())
            .await
            .map_err(|_| {
                TimeoutSnafu {
                    operation: "dialing peer",
                    duration_ms: config.connect_timeout.as_millis() as u64,
                }
                .build()
            })??;

        Ok(Self { channel })
    }

    /// Returns a clone of the underlying channel.
    #[must_use]
    pub fn channel(&self) -> Channel {
        self.channel.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SdkError;

    fn config_for(endpoint: &str) -> EventClientConfig {
        EventClientConfig::builder()
            .endpoint(endpoint)
            .msp_id("Org1MSP")
            .connect_timeout(Duration::from_millis(200))
            .build()
            .expect("valid config")
    }

    #[tokio::test]
    async fn invalid_endpoint_is_a_connection_error() {
        let err = PeerConnection::open(&config_for("::not a url::")).await.unwrap_err();
        assert!(matches!(err, SdkError::Connection { .. }));
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails_within_deadline() {
        // Port 1 on localhost refuses or times out quickly.
        let start = std::time::Instant::now();
        let result = PeerConnection::open(&config_for("http://127.0.0.1:1")).await;
        assert!(result.is_err());
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
