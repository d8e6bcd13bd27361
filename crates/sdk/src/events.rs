//! Subscription lifecycle: registration, stream reading, delivery.
//!
//! [`EventClient::subscribe`] walks the connection through its states:
//! disconnected -> connected (dial) -> registered (signed interest sent)
//! -> streaming (reader task running) -> closed or failed. Connection
//! and registration failures return synchronously; once the reader task
//! starts, all outcomes flow through the delivery channel, which closing
//! is the completion signal.

use std::sync::Arc;

use hlfc_crypto::{CryptoSuite, Identity};
use hlfc_proto::common::Block;
use hlfc_proto::msp::SerializedIdentity;
use hlfc_proto::peer::events_client::EventsClient;
use hlfc_proto::peer::{event, Event, EventType, Interest, Register, SignedEvent};
use prost::Message;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::config::EventClientConfig;
use crate::connection::{PeerConnection, GRPC_MAX_MESSAGE_SIZE};
use crate::decode::{decode_block_tx, TxRecord};
use crate::error::{ConnectionSnafu, Result, TerminalStreamSnafu, TimeoutSnafu};

/// A client for the committed-block event feed of one peer.
///
/// Explicitly constructed with its own configuration, identity and
/// crypto suite; there is no process-wide client state. Cheap to clone,
/// and each [`subscribe`](Self::subscribe) call opens an independent
/// subscription.
#[derive(Clone)]
pub struct EventClient {
    config: EventClientConfig,
    identity: Arc<Identity>,
    crypto: Arc<dyn CryptoSuite>,
}

impl EventClient {
    /// Creates a client from plain configuration values.
    pub fn new(
        config: EventClientConfig,
        identity: Identity,
        crypto: Arc<dyn CryptoSuite>,
    ) -> Self {
        Self { config, identity: Arc::new(identity), crypto }
    }

    /// Opens a subscription to the peer's committed-block feed.
    ///
    /// Dials the peer, sends the signed whole-block interest request and
    /// spawns the stream reader. Returns once the peer has accepted the
    /// stream; no background work starts on failure.
    ///
    /// # Errors
    ///
    /// [`SdkError::Connection`]/[`SdkError::Transport`]/[`SdkError::Timeout`]
    /// for dial and registration failures, [`SdkError::Signing`] when
    /// the crypto suite rejects the identity's key.
    ///
    /// [`SdkError::Connection`]: crate::SdkError::Connection
    /// [`SdkError::Transport`]: crate::SdkError::Transport
    /// [`SdkError::Timeout`]: crate::SdkError::Timeout
    /// [`SdkError::Signing`]: crate::SdkError::Signing
    pub async fn subscribe(&self) -> Result<Subscription> {
        let connection = PeerConnection::open(&self.config).await?;
        let mut client = EventsClient::new(connection.channel())
            .max_decoding_message_size(GRPC_MAX_MESSAGE_SIZE)
            .max_encoding_message_size(GRPC_MAX_MESSAGE_SIZE);

        // Sign before anything is sent so key problems surface here.
        let registration = self.build_registration()?;

        // The outbound side stays open for the lifetime of the stream;
        // the reader task owns the sender and dropping it half-closes
        // the call.
        let (outbound_tx, outbound_rx) = mpsc::channel::<SignedEvent>(1);
        if outbound_tx.try_send(registration).is_err() {
            return ConnectionSnafu { message: "outbound stream rejected the registration" }.fail();
        }

        let response = tokio::time::timeout(
            self.config.connect_timeout(),
            client.chat(ReceiverStream::new(outbound_rx)),
        )
        .await
        .map_err(|_| {
            TimeoutSnafu {
                operation: "registering event interest",
                duration_ms: self.config.connect_timeout().as_millis() as u64,
            }
            .build()
        })?
        .map_err(|status| {
            ConnectionSnafu { message: format!("event registration rejected: {status}") }.build()
        })?;

        let inbound = response.into_inner();
        let (records_tx, records_rx) = mpsc::channel(self.config.channel_capacity());
        let (cancel_tx, cancel_rx) = watch::channel(false);

        tokio::spawn(read_stream(inbound, records_tx, cancel_rx, outbound_tx));

        Ok(Subscription {
            records: records_rx,
            stop: StopHandle { cancel: Arc::new(cancel_tx) },
        })
    }

    /// Builds the signed whole-block interest request.
    ///
    /// The signature covers exactly the bytes placed in `event_bytes`;
    /// the serialized buffer is signed and then moved, unmodified, into
    /// the wire message. Peers verify against those bytes and drop
    /// mismatches silently, so re-serializing here would break
    /// registration with no error anywhere.
    fn build_registration(&self) -> Result<SignedEvent> {
        let creator = SerializedIdentity {
            mspid: self.config.msp_id().to_owned(),
            id_bytes: self.identity.certificate_pem().into_bytes(),
        }
        .encode_to_vec();

        let interest = Event {
            creator,
            event: Some(event::Event::Register(Register {
                events: vec![Interest {
                    event_type: EventType::Block as i32,
                    chain_id: String::new(),
                }],
            })),
        };
        let event_bytes = interest.encode_to_vec();
        let signature = self.crypto.sign(self.identity.private_key(), &event_bytes)?;
        Ok(SignedEvent { signature, event_bytes })
    }
}

/// A live subscription: the delivery channel plus its stop handle.
///
/// Records arrive in commit order. `recv` returning `None` is the
/// completion signal: the stream ended cleanly, a terminal error record
/// was already delivered, or [`stop`](Self::stop) took effect. Dropping
/// the subscription also ends the reader task.
#[derive(Debug)]
pub struct Subscription {
    records: mpsc::Receiver<TxRecord>,
    stop: StopHandle,
}

impl Subscription {
    /// Receives the next transaction record.
    pub async fn recv(&mut self) -> Option<TxRecord> {
        self.records.recv().await
    }

    /// Returns a clonable handle that can stop this subscription.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Requests a cooperative stop. Already-decoded records still drain
    /// through [`recv`](Self::recv) until `None`.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Splits the subscription into its delivery receiver and stop
    /// handle, for consumers that poll the channel directly.
    #[must_use]
    pub fn into_parts(self) -> (mpsc::Receiver<TxRecord>, StopHandle) {
        (self.records, self.stop)
    }
}

/// Clonable stop signal for a subscription.
///
/// Stopping closes the transport from the reader's side; the peer then
/// observes the stream ending, and the reader exits cleanly without an
/// error record.
#[derive(Debug, Clone)]
pub struct StopHandle {
    cancel: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    /// Signals the reader task to shut the stream down. Idempotent.
    pub fn stop(&self) {
        let _ = self.cancel.send(true);
    }
}

/// The per-subscription reader task: sole consumer of the inbound
/// stream, preserving arrival order end to end.
///
/// Holds the outbound sender so the gRPC call stays open; dropping it on
/// exit (any path) half-closes the call and tears the transport down.
async fn read_stream(
    mut inbound: tonic::Streaming<Event>,
    records: mpsc::Sender<TxRecord>,
    mut cancel: watch::Receiver<bool>,
    _outbound: mpsc::Sender<SignedEvent>,
) {
    loop {
        tokio::select! {
            _ = async { let _ = cancel.wait_for(|stopped| *stopped).await; } => {
                debug!("stop requested; closing event stream");
                break;
            }
            next = inbound.message() => match next {
                Ok(Some(event)) => match event.event {
                    Some(event::Event::Block(block)) => {
                        if !deliver_block(block, &records).await {
                            debug!("consumer dropped delivery channel; stopping");
                            break;
                        }
                    },
                    Some(event::Event::Register(_)) => {
                        debug!("event registration acknowledged");
                    },
                    // Chaincode events, rejections and unregister acks are
                    // not part of the whole-block interest.
                    _ => {},
                },
                Ok(None) => {
                    debug!("event stream ended");
                    break;
                },
                Err(status) => {
                    warn!(error = %status, "event stream failed");
                    let record = TxRecord {
                        error: Some(
                            TerminalStreamSnafu { message: status.to_string() }.build(),
                        ),
                        ..TxRecord::default()
                    };
                    // Exactly one terminal record, then the channel closes.
                    let _ = records.send(record).await;
                    break;
                },
            }
        }
    }
    // Dropping `records` here closes the delivery channel: the consumer's
    // completion signal for every exit path above.
}

/// Decodes and delivers every transaction of one block, in block order.
///
/// Returns false when the consumer has gone away. Sending blocks when
/// the channel is full: that is the documented backpressure, records are
/// never dropped or reordered.
async fn deliver_block(block: Block, records: &mpsc::Sender<TxRecord>) -> bool {
    let height = block.header.as_ref().map(|h| h.number).unwrap_or_default();
    let metadata = block.metadata.map(|m| m.metadata).unwrap_or_default();
    let data = block.data.map(|d| d.data).unwrap_or_default();

    debug!(height, transactions = data.len(), "decoding committed block");
    for (idx, raw) in data.iter().enumerate() {
        let record = decode_block_tx(raw, height, idx, &metadata);
        if records.send(record).await.is_err() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use hlfc_crypto::{EcdsaSuite, PrivateKey};
    use signature::Verifier;

    use super::*;

    fn test_client() -> (EventClient, p256::ecdsa::VerifyingKey) {
        let signing = p256::ecdsa::SigningKey::from_slice(&[0x42; 32]).unwrap();
        let verifying = *signing.verifying_key();
        let identity =
            Identity::new(vec![0x30, 0x03, 0x01, 0x01, 0x00], PrivateKey::Ecdsa(Box::new(signing)));
        let config = EventClientConfig::builder()
            .endpoint("http://127.0.0.1:7053")
            .msp_id("Org1MSP")
            .build()
            .unwrap();
        (EventClient::new(config, identity, Arc::new(EcdsaSuite::new())), verifying)
    }

    #[test]
    fn registration_requests_whole_block_events() {
        let (client, _) = test_client();
        let signed = client.build_registration().unwrap();

        let event = Event::decode(signed.event_bytes.as_slice()).unwrap();
        let Some(event::Event::Register(register)) = event.event else {
            panic!("expected register event");
        };
        assert_eq!(register.events.len(), 1);
        assert_eq!(register.events[0].event_type, EventType::Block as i32);

        let creator = SerializedIdentity::decode(event.creator.as_slice()).unwrap();
        assert_eq!(creator.mspid, "Org1MSP");
        let pem = String::from_utf8(creator.id_bytes).unwrap();
        assert!(pem.starts_with("-----BEGIN CERTIFICATE-----"));
    }

    #[test]
    fn signature_covers_the_transmitted_bytes() {
        let (client, verifying) = test_client();
        let signed = client.build_registration().unwrap();

        let parsed = p256::ecdsa::Signature::from_der(&signed.signature).unwrap();
        verifying.verify(&signed.event_bytes, &parsed).unwrap();
    }

    #[test]
    fn signing_rejection_surfaces_synchronously() {
        let signing = PrivateKey::sm2_from_slice(hlfc_crypto::SM2_DEFAULT_DIST_ID, &[0x24; 32])
            .unwrap();
        let identity = Identity::new(vec![0x30, 0x00], signing);
        let config = EventClientConfig::builder()
            .endpoint("http://127.0.0.1:7053")
            .msp_id("Org1MSP")
            .build()
            .unwrap();
        // ECDSA suite with an SM2 key: the capability must refuse.
        let client = EventClient::new(config, identity, Arc::new(EcdsaSuite::new()));
        let err = client.build_registration().unwrap_err();
        assert!(matches!(err, crate::SdkError::Signing { .. }));
    }
}
