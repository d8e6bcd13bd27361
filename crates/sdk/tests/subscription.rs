//! End-to-end subscription tests against an in-process peer.

use std::sync::Arc;
use std::time::Duration;

use hlfc_crypto::{EcdsaSuite, Identity, PrivateKey};
use hlfc_proto::peer::{event, Event};
use hlfc_sdk::mock::{block_event, committed_block, endorser_envelope, MockPeerServer, Trailing};
use hlfc_sdk::{EventClient, EventClientConfig, SdkError, TxRecord};
use prost::Message;
use signature::Verifier;

const TEST_SCALAR: [u8; 32] = [0x42; 32];

fn client_for(endpoint: &str) -> EventClient {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let signing = p256::ecdsa::SigningKey::from_slice(&TEST_SCALAR).unwrap();
    let identity = Identity::new(
        vec![0x30, 0x03, 0x01, 0x01, 0x00],
        PrivateKey::Ecdsa(Box::new(signing)),
    );
    let config = EventClientConfig::builder()
        .endpoint(endpoint)
        .msp_id("Org1MSP")
        .connect_timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    EventClient::new(config, identity, Arc::new(EcdsaSuite::new()))
}

fn one_tx_block(height: u64, tx_id: &str) -> Event {
    let envelope = endorser_envelope("mychannel", tx_id, "example_cc", &[b"put", b"k", b"v"], None);
    block_event(committed_block(height, vec![envelope], &[0]))
}

async fn recv_within(subscription: &mut hlfc_sdk::Subscription, secs: u64) -> Option<TxRecord> {
    tokio::time::timeout(Duration::from_secs(secs), subscription.recv())
        .await
        .expect("timed out waiting for a record")
}

#[tokio::test]
async fn clean_stream_delivers_records_in_order_then_completes() {
    let script = vec![
        one_tx_block(5, "tx-a"),
        one_tx_block(6, "tx-b"),
        one_tx_block(7, "tx-c"),
    ];
    let server = MockPeerServer::start(script, Trailing::CloseClean).await;
    let mut subscription = client_for(&server.endpoint()).subscribe().await.unwrap();

    for (height, tx_id) in [(5, "tx-a"), (6, "tx-b"), (7, "tx-c")] {
        let record = recv_within(&mut subscription, 5).await.expect("record expected");
        assert!(record.error.is_none(), "unexpected error: {:?}", record.error);
        assert_eq!(record.block_height, height);
        assert_eq!(record.tx_id, tx_id);
        assert_eq!(record.channel_name, "mychannel");
        assert!(record.is_valid);
    }

    // Clean end: channel closes with no trailing error record.
    assert!(recv_within(&mut subscription, 5).await.is_none());
}

#[tokio::test]
async fn multi_transaction_block_yields_one_record_per_transaction() {
    let envelopes = vec![
        endorser_envelope("mychannel", "tx-0", "cc", &[b"a"], Some(("created", b"p0"))),
        endorser_envelope("mychannel", "tx-1", "cc", &[b"b"], None),
    ];
    // Second transaction invalidated with code 10.
    let script = vec![block_event(committed_block(42, envelopes, &[0, 10]))];
    let server = MockPeerServer::start(script, Trailing::CloseClean).await;
    let mut subscription = client_for(&server.endpoint()).subscribe().await.unwrap();

    let first = recv_within(&mut subscription, 5).await.unwrap();
    assert_eq!(first.tx_index, 0);
    assert!(first.is_valid);
    assert_eq!(first.events.len(), 1);
    assert_eq!(first.events[0].name, "created");

    let second = recv_within(&mut subscription, 5).await.unwrap();
    assert_eq!(second.tx_index, 1);
    assert!(!second.is_valid);
    assert_eq!(second.status_code, 10);

    assert!(recv_within(&mut subscription, 5).await.is_none());
}

#[tokio::test]
async fn decode_failure_does_not_stop_later_transactions() {
    // A block whose first entry is unparseable, committed before a good
    // transaction in the same block and another block after it.
    let envelopes = vec![
        vec![0xff, 0xff, 0xff],
        endorser_envelope("mychannel", "tx-good", "cc", &[b"get", b"k"], None),
    ];
    let script = vec![
        block_event(committed_block(12, envelopes, &[0, 0])),
        one_tx_block(13, "tx-next"),
    ];
    let server = MockPeerServer::start(script, Trailing::CloseClean).await;
    let mut subscription = client_for(&server.endpoint()).subscribe().await.unwrap();

    let broken = recv_within(&mut subscription, 5).await.unwrap();
    assert_eq!(broken.tx_index, 0);
    assert!(matches!(broken.error, Some(SdkError::ProtocolDecode { .. })));

    let good = recv_within(&mut subscription, 5).await.unwrap();
    assert!(good.error.is_none(), "unexpected error: {:?}", good.error);
    assert_eq!(good.tx_index, 1);
    assert_eq!(good.tx_id, "tx-good");
    assert!(good.is_valid);
    assert_eq!(good.invocation_args, vec![b"get".to_vec(), b"k".to_vec()]);

    let next = recv_within(&mut subscription, 5).await.unwrap();
    assert!(next.error.is_none());
    assert_eq!(next.block_height, 13);
    assert_eq!(next.tx_id, "tx-next");

    assert!(recv_within(&mut subscription, 5).await.is_none());
}

#[tokio::test]
async fn stream_failure_delivers_one_terminal_record() {
    let script = vec![one_tx_block(9, "tx-ok")];
    let server =
        MockPeerServer::start(script, Trailing::Error("peer going away".into())).await;
    let mut subscription = client_for(&server.endpoint()).subscribe().await.unwrap();

    let ok = recv_within(&mut subscription, 5).await.unwrap();
    assert!(ok.error.is_none());
    assert_eq!(ok.tx_id, "tx-ok");

    let terminal = recv_within(&mut subscription, 5).await.expect("terminal record expected");
    match terminal.error {
        Some(SdkError::TerminalStream { ref message }) => {
            assert!(message.contains("peer going away"));
        },
        other => panic!("expected terminal stream error, got {other:?}"),
    }

    // Exactly one terminal record, then completion.
    assert!(recv_within(&mut subscription, 5).await.is_none());
}

#[tokio::test]
async fn unreachable_peer_fails_synchronously() {
    // Nothing listens on this port; the dial fails before any task spawns.
    let err = client_for("http://127.0.0.1:1").subscribe().await.unwrap_err();
    assert!(
        matches!(err, SdkError::Transport { .. } | SdkError::Timeout { .. }),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn stop_handle_ends_an_open_stream() {
    let script = vec![one_tx_block(3, "tx-live")];
    let server = MockPeerServer::start(script, Trailing::KeepOpen).await;
    let mut subscription = client_for(&server.endpoint()).subscribe().await.unwrap();

    let record = recv_within(&mut subscription, 5).await.unwrap();
    assert_eq!(record.tx_id, "tx-live");

    let stop = subscription.stop_handle();
    stop.stop();
    stop.stop(); // idempotent

    assert!(recv_within(&mut subscription, 5).await.is_none());
}

#[tokio::test]
async fn registration_is_signed_over_the_transmitted_bytes() {
    let server = MockPeerServer::start(Vec::new(), Trailing::KeepOpen).await;
    let subscription = client_for(&server.endpoint()).subscribe().await.unwrap();

    let registrations = server.registrations();
    assert_eq!(registrations.len(), 1);
    let signed = &registrations[0];

    // The peer verifies the signature against event_bytes exactly as sent.
    let signing = p256::ecdsa::SigningKey::from_slice(&TEST_SCALAR).unwrap();
    let signature = p256::ecdsa::Signature::from_der(&signed.signature).unwrap();
    signing.verifying_key().verify(&signed.event_bytes, &signature).unwrap();

    let request = Event::decode(signed.event_bytes.as_slice()).unwrap();
    assert!(matches!(request.event, Some(event::Event::Register(_))));

    subscription.stop();
}
