//! In-process peer stand-in for exercising subscriptions end to end.
//!
//! [`MockPeerServer`] binds an ephemeral localhost port, accepts the
//! bidirectional event stream, records the registration request it
//! receives and replays a scripted sequence of events. Panics are fine
//! here; this module only backs tests.

use std::net::SocketAddr;
use std::sync::Arc;

use hlfc_proto::common::{
    Block, BlockData, BlockHeader, BlockMetadata, ChannelHeader, Envelope, Header, HeaderType,
    Payload,
};
use hlfc_proto::peer::events_server::{Events, EventsServer};
use hlfc_proto::peer::{
    event, ChaincodeAction, ChaincodeActionPayload, ChaincodeEndorsedAction,
    ChaincodeHeaderExtension, ChaincodeId, ChaincodeInput, ChaincodeInvocationSpec,
    ChaincodeProposalPayload, ChaincodeSpec, Event, ProposalResponsePayload, SignedEvent,
    Transaction, TransactionAction,
};
use parking_lot::Mutex;
use prost::Message;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::{ReceiverStream, TcpListenerStream};
use tonic::transport::Server;
use tonic::{Request, Response, Status, Streaming};

/// What the mock does after replaying its scripted events.
#[derive(Debug, Clone)]
pub enum Trailing {
    /// End the stream cleanly.
    CloseClean,
    /// Fail the stream with an `UNAVAILABLE` status.
    Error(String),
    /// Hold the stream open until the client goes away.
    KeepOpen,
}

#[derive(Default)]
struct MockState {
    registrations: Vec<SignedEvent>,
}

#[derive(Clone)]
struct MockPeerService {
    script: Arc<Vec<Event>>,
    trailing: Trailing,
    state: Arc<Mutex<MockState>>,
}

#[tonic::async_trait]
impl Events for MockPeerService {
    type ChatStream = ReceiverStream<Result<Event, Status>>;

    async fn chat(
        &self,
        request: Request<Streaming<SignedEvent>>,
    ) -> Result<Response<Self::ChatStream>, Status> {
        let mut inbound = request.into_inner();
        let registration = inbound
            .message()
            .await?
            .ok_or_else(|| Status::invalid_argument("stream closed before registration"))?;
        self.state.lock().registrations.push(registration);

        let script = Arc::clone(&self.script);
        let trailing = self.trailing.clone();
        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            for scripted in script.iter() {
                if tx.send(Ok(scripted.clone())).await.is_err() {
                    return;
                }
            }
            match trailing {
                Trailing::CloseClean => {},
                Trailing::Error(message) => {
                    let _ = tx.send(Err(Status::unavailable(message))).await;
                },
                Trailing::KeepOpen => tx.closed().await,
            }
        });
        Ok(Response::new(ReceiverStream::new(rx)))
    }
}

/// A scripted event peer on an ephemeral localhost port.
pub struct MockPeerServer {
    addr: SocketAddr,
    state: Arc<Mutex<MockState>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockPeerServer {
    /// Starts the server with a script and a trailing behavior.
    ///
    /// # Panics
    ///
    /// Panics when the ephemeral port cannot be bound.
    pub async fn start(script: Vec<Event>, trailing: Trailing) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
        let addr = listener.local_addr().expect("listener address");

        let state = Arc::new(Mutex::new(MockState::default()));
        let service = MockPeerService {
            script: Arc::new(script),
            trailing,
            state: Arc::clone(&state),
        };

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let _ = Server::builder()
                .add_service(EventsServer::new(service))
                .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Self { addr, state, shutdown: Some(shutdown_tx) }
    }

    /// Returns the URL clients should dial.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Returns the registration requests received so far.
    #[must_use]
    pub fn registrations(&self) -> Vec<SignedEvent> {
        self.state.lock().registrations.clone()
    }
}

impl Drop for MockPeerServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// Wraps a block the way a peer frames it on the event stream.
#[must_use]
pub fn block_event(block: Block) -> Event {
    Event { creator: Vec::new(), event: Some(event::Event::Block(block)) }
}

/// Assembles a committed block from marshaled envelopes and per-transaction
/// validation flags, laid out with the transactions filter at its
/// conventional metadata index.
#[must_use]
pub fn committed_block(height: u64, envelopes: Vec<Vec<u8>>, flags: &[u8]) -> Block {
    Block {
        header: Some(BlockHeader { number: height, ..Default::default() }),
        data: Some(BlockData { data: envelopes }),
        metadata: Some(BlockMetadata {
            metadata: vec![Vec::new(), Vec::new(), flags.to_vec()],
        }),
    }
}

/// Marshals an endorser-transaction envelope the way a committing peer
/// would, invoking `chaincode` with `args` and optionally emitting one
/// named event.
#[must_use]
pub fn endorser_envelope(
    channel: &str,
    tx_id: &str,
    chaincode: &str,
    args: &[&[u8]],
    chaincode_event: Option<(&str, &[u8])>,
) -> Vec<u8> {
    let events = chaincode_event
        .map(|(name, payload)| hlfc_proto::peer::ChaincodeEvent {
            chaincode_id: chaincode.into(),
            tx_id: tx_id.into(),
            event_name: name.into(),
            payload: payload.to_vec(),
        })
        .map(|e| e.encode_to_vec())
        .unwrap_or_default();

    let chaincode_action = ChaincodeAction { events, ..Default::default() };
    let response_payload = ProposalResponsePayload {
        extension: chaincode_action.encode_to_vec(),
        ..Default::default()
    };
    let invocation = ChaincodeInvocationSpec {
        chaincode_spec: Some(ChaincodeSpec {
            input: Some(ChaincodeInput { args: args.iter().map(|a| a.to_vec()).collect() }),
            ..Default::default()
        }),
    };
    let action_payload = ChaincodeActionPayload {
        chaincode_proposal_payload: ChaincodeProposalPayload {
            input: invocation.encode_to_vec(),
        }
        .encode_to_vec(),
        action: Some(ChaincodeEndorsedAction {
            proposal_response_payload: response_payload.encode_to_vec(),
            endorsements: Vec::new(),
        }),
    };
    let transaction = Transaction {
        actions: vec![TransactionAction {
            header: Vec::new(),
            payload: action_payload.encode_to_vec(),
        }],
    };

    let extension = ChaincodeHeaderExtension {
        chaincode_id: Some(ChaincodeId {
            name: chaincode.into(),
            version: "1.0".into(),
            ..Default::default()
        }),
        ..Default::default()
    };
    let channel_header = ChannelHeader {
        r#type: HeaderType::EndorserTransaction as i32,
        channel_id: channel.into(),
        tx_id: tx_id.into(),
        extension: extension.encode_to_vec(),
        ..Default::default()
    };
    let payload = Payload {
        header: Some(Header {
            channel_header: channel_header.encode_to_vec(),
            signature_header: Vec::new(),
        }),
        data: transaction.encode_to_vec(),
    };
    Envelope { payload: payload.encode_to_vec(), signature: Vec::new() }.encode_to_vec()
}
