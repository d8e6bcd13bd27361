//! Messages and the events service from the Fabric `peer` protobuf
//! package.
//!
//! The nesting mirrors the wire format: a committed endorser transaction
//! unwraps as `Envelope` -> `Payload` -> `Transaction` ->
//! `TransactionAction` -> [`ChaincodeActionPayload`] ->
//! ([`ChaincodeProposalPayload`] -> [`ChaincodeInvocationSpec`]) and
//! ([`ChaincodeEndorsedAction`] -> [`ProposalResponsePayload`] ->
//! [`ChaincodeAction`] -> [`ChaincodeEvent`]).

/// Identifies a chaincode by path, name and version.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChaincodeId {
    #[prost(string, tag = "1")]
    pub path: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub version: ::prost::alloc::string::String,
}

/// Ordered invocation arguments. By convention the first argument names
/// the chaincode function.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChaincodeInput {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub args: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChaincodeSpec {
    /// Chaincode runtime type (golang, node, java, ...). Opaque here.
    #[prost(int32, tag = "1")]
    pub r#type: i32,
    #[prost(message, optional, tag = "2")]
    pub chaincode_id: ::core::option::Option<ChaincodeId>,
    #[prost(message, optional, tag = "3")]
    pub input: ::core::option::Option<ChaincodeInput>,
    #[prost(int32, tag = "4")]
    pub timeout: i32,
}

/// Carrier of a chaincode invocation.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChaincodeInvocationSpec {
    #[prost(message, optional, tag = "1")]
    pub chaincode_spec: ::core::option::Option<ChaincodeSpec>,
}

/// Channel-header extension for endorser transactions.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChaincodeHeaderExtension {
    #[prost(bytes = "vec", tag = "1")]
    pub payload_visibility: ::prost::alloc::vec::Vec<u8>,
    /// The chaincode the transaction targets, when known at proposal time.
    #[prost(message, optional, tag = "2")]
    pub chaincode_id: ::core::option::Option<ChaincodeId>,
}

/// Proposal input as sent to endorsers. `input` is a marshaled
/// [`ChaincodeInvocationSpec`].
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChaincodeProposalPayload {
    #[prost(bytes = "vec", tag = "1")]
    pub input: ::prost::alloc::vec::Vec<u8>,
}

/// An atomic set of actions applied to the ledger.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Transaction {
    #[prost(message, repeated, tag = "1")]
    pub actions: ::prost::alloc::vec::Vec<TransactionAction>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionAction {
    /// Marshaled `SignatureHeader` of the action's proposer.
    #[prost(bytes = "vec", tag = "1")]
    pub header: ::prost::alloc::vec::Vec<u8>,
    /// Marshaled [`ChaincodeActionPayload`].
    #[prost(bytes = "vec", tag = "2")]
    pub payload: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChaincodeActionPayload {
    /// Marshaled [`ChaincodeProposalPayload`], transient fields removed.
    #[prost(bytes = "vec", tag = "1")]
    pub chaincode_proposal_payload: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub action: ::core::option::Option<ChaincodeEndorsedAction>,
}

/// The endorsed execution result carried inside an action.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChaincodeEndorsedAction {
    /// Marshaled [`ProposalResponsePayload`].
    #[prost(bytes = "vec", tag = "1")]
    pub proposal_response_payload: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub endorsements: ::prost::alloc::vec::Vec<Endorsement>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Endorsement {
    /// Marshaled `SerializedIdentity` of the endorser.
    #[prost(bytes = "vec", tag = "1")]
    pub endorser: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub signature: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProposalResponsePayload {
    #[prost(bytes = "vec", tag = "1")]
    pub proposal_hash: ::prost::alloc::vec::Vec<u8>,
    /// Marshaled [`ChaincodeAction`] for endorser transactions.
    #[prost(bytes = "vec", tag = "2")]
    pub extension: ::prost::alloc::vec::Vec<u8>,
}

/// A status/message/payload triple, aligned with gRPC status semantics.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Response {
    #[prost(int32, tag = "1")]
    pub status: i32,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "3")]
    pub payload: ::prost::alloc::vec::Vec<u8>,
}

/// Result of chaincode execution: state changes, events and response.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChaincodeAction {
    /// Marshaled read/write set. Opaque here.
    #[prost(bytes = "vec", tag = "1")]
    pub results: ::prost::alloc::vec::Vec<u8>,
    /// Marshaled [`ChaincodeEvent`] emitted during execution, if any.
    #[prost(bytes = "vec", tag = "2")]
    pub events: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub response: ::core::option::Option<Response>,
    #[prost(message, optional, tag = "4")]
    pub chaincode_id: ::core::option::Option<ChaincodeId>,
}

/// Application-defined event emitted by chaincode logic during execution.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChaincodeEvent {
    #[prost(string, tag = "1")]
    pub chaincode_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub tx_id: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub event_name: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "4")]
    pub payload: ::prost::alloc::vec::Vec<u8>,
}

/// A single event category a subscriber registers interest in.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Interest {
    /// An [`EventType`] value.
    #[prost(enumeration = "EventType", tag = "1")]
    pub event_type: i32,
    #[prost(string, tag = "3")]
    pub chain_id: ::prost::alloc::string::String,
}

/// Subscription request: the set of interests to register.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Register {
    #[prost(message, repeated, tag = "1")]
    pub events: ::prost::alloc::vec::Vec<Interest>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Unregister {
    #[prost(message, repeated, tag = "1")]
    pub events: ::prost::alloc::vec::Vec<Interest>,
}

/// Sent by the peer when an endorser transaction is rejected.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Rejection {
    #[prost(message, optional, tag = "1")]
    pub tx: ::core::option::Option<Transaction>,
    #[prost(string, tag = "2")]
    pub error_msg: ::prost::alloc::string::String,
}

/// A message on the event stream, either direction.
///
/// Outbound (client to peer) carries `Register`/`Unregister` plus the
/// creator identity; inbound (peer to client) carries committed blocks,
/// registration acks and rejections.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Event {
    /// Marshaled `SerializedIdentity` of the message creator.
    #[prost(bytes = "vec", tag = "6")]
    pub creator: ::prost::alloc::vec::Vec<u8>,
    #[prost(oneof = "event::Event", tags = "1, 2, 3, 4, 5")]
    pub event: ::core::option::Option<event::Event>,
}

/// Nested message and enum types in `Event`.
pub mod event {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Event {
        /// Registration request outbound; registration ack inbound.
        #[prost(message, tag = "1")]
        Register(super::Register),
        /// A block committed to the ledger.
        #[prost(message, tag = "2")]
        Block(super::super::common::Block),
        #[prost(message, tag = "3")]
        ChaincodeEvent(super::ChaincodeEvent),
        #[prost(message, tag = "4")]
        Rejection(super::Rejection),
        #[prost(message, tag = "5")]
        Unregister(super::Unregister),
    }
}

/// The signed form of an outbound [`Event`].
///
/// `event_bytes` is the marshaled `Event` and `signature` covers exactly
/// those bytes. Peers verify the signature against the creator identity
/// inside `event_bytes`; a mismatch is rejected silently, so producers
/// must sign and transmit the identical buffer.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignedEvent {
    #[prost(bytes = "vec", tag = "1")]
    pub signature: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub event_bytes: ::prost::alloc::vec::Vec<u8>,
}

/// Values of [`Interest::event_type`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum EventType {
    Register = 0,
    /// Whole committed blocks; the only interest this SDK registers.
    Block = 1,
    Chaincode = 2,
    Rejection = 3,
    FilteredBlock = 4,
}

/// Generated client implementations.
pub mod events_client {
    #![allow(
        unused_variables,
        dead_code,
        missing_docs,
        clippy::wildcard_imports,
        clippy::let_unit_value,
    )]
    use tonic::codegen::*;
    use tonic::codegen::http::Uri;
    /// Client for the `protos.Events` bidirectional event stream.
    #[derive(Debug, Clone)]
    pub struct EventsClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl EventsClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> EventsClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::Body>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }
        pub fn with_interceptor<F>(
            inner: T,
            interceptor: F,
        ) -> EventsClient<InterceptedService<T, F>>
        where
            F: tonic::service::Interceptor,
            T::ResponseBody: Default,
            T: tonic::codegen::Service<
                http::Request<tonic::body::Body>,
                Response = http::Response<
                    <T as tonic::client::GrpcService<tonic::body::Body>>::ResponseBody,
                >,
            >,
            <T as tonic::codegen::Service<
                http::Request<tonic::body::Body>,
            >>::Error: Into<StdError> + std::marker::Send + std::marker::Sync,
        {
            EventsClient::new(InterceptedService::new(inner, interceptor))
        }
        /// Compress requests with the given encoding.
        ///
        /// This requires the server to support it otherwise it might respond with an
        /// error.
        #[must_use]
        pub fn send_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.send_compressed(encoding);
            self
        }
        /// Enable decompressing responses.
        #[must_use]
        pub fn accept_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.inner = self.inner.accept_compressed(encoding);
            self
        }
        /// Limits the maximum size of a decoded message.
        ///
        /// Default: `4MB`
        #[must_use]
        pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_decoding_message_size(limit);
            self
        }
        /// Limits the maximum size of an encoded message.
        ///
        /// Default: `usize::MAX`
        #[must_use]
        pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_encoding_message_size(limit);
            self
        }
        pub async fn chat(
            &mut self,
            request: impl tonic::IntoStreamingRequest<Message = super::SignedEvent>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<super::Event>>,
            tonic::Status,
        > {
            self.inner
                .ready()
                .await
                .map_err(|e| {
                    tonic::Status::unknown(
                        format!("Service was not ready: {}", e.into()),
                    )
                })?;
            let codec = tonic_prost::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/protos.Events/Chat");
            let mut req = request.into_streaming_request();
            req.extensions_mut().insert(GrpcMethod::new("protos.Events", "Chat"));
            self.inner.streaming(req, path, codec).await
        }
    }
}

/// Generated server implementations.
pub mod events_server {
    #![allow(
        unused_variables,
        dead_code,
        missing_docs,
        clippy::wildcard_imports,
        clippy::let_unit_value,
    )]
    use tonic::codegen::*;
    /// Generated trait containing gRPC methods that should be implemented for use with EventsServer.
    #[async_trait]
    pub trait Events: std::marker::Send + std::marker::Sync + 'static {
        /// Server streaming response type for the Chat method.
        type ChatStream: tonic::codegen::tokio_stream::Stream<
                Item = std::result::Result<super::Event, tonic::Status>,
            >
            + std::marker::Send
            + 'static;
        async fn chat(
            &self,
            request: tonic::Request<tonic::Streaming<super::SignedEvent>>,
        ) -> std::result::Result<tonic::Response<Self::ChatStream>, tonic::Status>;
    }
    #[derive(Debug)]
    pub struct EventsServer<T> {
        inner: Arc<T>,
        accept_compression_encodings: EnabledCompressionEncodings,
        send_compression_encodings: EnabledCompressionEncodings,
        max_decoding_message_size: Option<usize>,
        max_encoding_message_size: Option<usize>,
    }
    impl<T> EventsServer<T> {
        pub fn new(inner: T) -> Self {
            Self::from_arc(Arc::new(inner))
        }
        pub fn from_arc(inner: Arc<T>) -> Self {
            Self {
                inner,
                accept_compression_encodings: Default::default(),
                send_compression_encodings: Default::default(),
                max_decoding_message_size: None,
                max_encoding_message_size: None,
            }
        }
        pub fn with_interceptor<F>(
            inner: T,
            interceptor: F,
        ) -> InterceptedService<Self, F>
        where
            F: tonic::service::Interceptor,
        {
            InterceptedService::new(Self::new(inner), interceptor)
        }
        /// Enable decompressing requests with the given encoding.
        #[must_use]
        pub fn accept_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.accept_compression_encodings.enable(encoding);
            self
        }
        /// Compress responses with the given encoding, if the client supports it.
        #[must_use]
        pub fn send_compressed(mut self, encoding: CompressionEncoding) -> Self {
            self.send_compression_encodings.enable(encoding);
            self
        }
        /// Limits the maximum size of a decoded message.
        ///
        /// Default: `4MB`
        #[must_use]
        pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
            self.max_decoding_message_size = Some(limit);
            self
        }
        /// Limits the maximum size of an encoded message.
        ///
        /// Default: `usize::MAX`
        #[must_use]
        pub fn max_encoding_message_size(mut self, limit: usize) -> Self {
            self.max_encoding_message_size = Some(limit);
            self
        }
    }
    impl<T, B> tonic::codegen::Service<http::Request<B>> for EventsServer<T>
    where
        T: Events,
        B: Body + std::marker::Send + 'static,
        B::Error: Into<StdError> + std::marker::Send + 'static,
    {
        type Response = http::Response<tonic::body::Body>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;
        fn poll_ready(
            &mut self,
            _cx: &mut Context<'_>,
        ) -> Poll<std::result::Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            match req.uri().path() {
                "/protos.Events/Chat" => {
                    #[allow(non_camel_case_types)]
                    struct ChatSvc<T: Events>(pub Arc<T>);
                    impl<T: Events> tonic::server::StreamingService<super::SignedEvent>
                    for ChatSvc<T> {
                        type Response = super::Event;
                        type ResponseStream = T::ChatStream;
                        type Future = BoxFuture<
                            tonic::Response<Self::ResponseStream>,
                            tonic::Status,
                        >;
                        fn call(
                            &mut self,
                            request: tonic::Request<tonic::Streaming<super::SignedEvent>>,
                        ) -> Self::Future {
                            let inner = Arc::clone(&self.0);
                            let fut = async move {
                                <T as Events>::chat(&inner, request).await
                            };
                            Box::pin(fut)
                        }
                    }
                    let accept_compression_encodings = self.accept_compression_encodings;
                    let send_compression_encodings = self.send_compression_encodings;
                    let max_decoding_message_size = self.max_decoding_message_size;
                    let max_encoding_message_size = self.max_encoding_message_size;
                    let inner = self.inner.clone();
                    let fut = async move {
                        let method = ChatSvc(inner);
                        let codec = tonic_prost::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec)
                            .apply_compression_config(
                                accept_compression_encodings,
                                send_compression_encodings,
                            )
                            .apply_max_message_size_config(
                                max_decoding_message_size,
                                max_encoding_message_size,
                            );
                        let res = grpc.streaming(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => {
                    Box::pin(async move {
                        let mut response = http::Response::new(
                            tonic::body::Body::default(),
                        );
                        let headers = response.headers_mut();
                        headers
                            .insert(
                                tonic::Status::GRPC_STATUS,
                                (tonic::Code::Unimplemented as i32).into(),
                            );
                        headers
                            .insert(
                                http::header::CONTENT_TYPE,
                                tonic::metadata::GRPC_CONTENT_TYPE,
                            );
                        Ok(response)
                    })
                }
            }
        }
    }
    impl<T> Clone for EventsServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self {
                inner,
                accept_compression_encodings: self.accept_compression_encodings,
                send_compression_encodings: self.send_compression_encodings,
                max_decoding_message_size: self.max_decoding_message_size,
                max_encoding_message_size: self.max_encoding_message_size,
            }
        }
    }
    /// Generated gRPC service name
    pub const SERVICE_NAME: &str = "protos.Events";
    impl<T> tonic::server::NamedService for EventsServer<T> {
        const NAME: &'static str = SERVICE_NAME;
    }
}

#[cfg(test)]
mod tests {
    use prost::Message;

    use super::*;
    use crate::common;

    #[test]
    fn signed_event_round_trips() {
        let register = Event {
            creator: b"creator".to_vec(),
            event: Some(event::Event::Register(Register {
                events: vec![Interest { event_type: EventType::Block as i32, chain_id: String::new() }],
            })),
        };
        let bytes = register.encode_to_vec();
        let decoded = Event::decode(bytes.as_slice()).expect("decode");
        assert_eq!(decoded, register);
    }

    #[test]
    fn block_event_oneof_tags_are_stable() {
        let block = common::Block {
            header: Some(common::BlockHeader { number: 7, ..Default::default() }),
            data: Some(common::BlockData { data: vec![b"tx".to_vec()] }),
            metadata: None,
        };
        let event = Event { creator: Vec::new(), event: Some(event::Event::Block(block)) };
        let bytes = event.encode_to_vec();

        let decoded = Event::decode(bytes.as_slice()).expect("decode");
        match decoded.event {
            Some(event::Event::Block(b)) => {
                assert_eq!(b.header.expect("header").number, 7);
                assert_eq!(b.data.expect("data").data, vec![b"tx".to_vec()]);
            },
            other => panic!("expected block event, got {other:?}"),
        }
    }

    #[test]
    fn chaincode_event_round_trips() {
        let ev = ChaincodeEvent {
            chaincode_id: "cc".into(),
            tx_id: "tx1".into(),
            event_name: "event1".into(),
            payload: b"hello".to_vec(),
        };
        let bytes = ev.encode_to_vec();
        let round = ChaincodeEvent::decode(bytes.as_slice()).expect("decode");
        assert_eq!(round, ev);
    }
}
