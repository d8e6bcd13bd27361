//! Messages from the Fabric `common` protobuf package.
//!
//! These are the outer layers of the transaction envelope and the block
//! structure committed to a channel ledger.

/// A signed wrapper around an opaque payload. The outermost layer of every
/// transaction on the wire.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Envelope {
    /// Marshaled [`Payload`].
    #[prost(bytes = "vec", tag = "1")]
    pub payload: ::prost::alloc::vec::Vec<u8>,
    /// Signature by the creator in the payload header.
    #[prost(bytes = "vec", tag = "2")]
    pub signature: ::prost::alloc::vec::Vec<u8>,
}

/// The message contents plus a header describing them.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Payload {
    #[prost(message, optional, tag = "1")]
    pub header: ::core::option::Option<Header>,
    /// Marshaled content, type-dependent on the channel header.
    #[prost(bytes = "vec", tag = "2")]
    pub data: ::prost::alloc::vec::Vec<u8>,
}

/// Paired channel and signature headers, each kept marshaled so the
/// signed bytes are unambiguous.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Header {
    /// Marshaled [`ChannelHeader`].
    #[prost(bytes = "vec", tag = "1")]
    pub channel_header: ::prost::alloc::vec::Vec<u8>,
    /// Marshaled [`SignatureHeader`].
    #[prost(bytes = "vec", tag = "2")]
    pub signature_header: ::prost::alloc::vec::Vec<u8>,
}

/// Per-transaction header carrying channel id, transaction id, type and
/// the type-specific extension.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChannelHeader {
    /// A [`HeaderType`] value.
    #[prost(int32, tag = "1")]
    pub r#type: i32,
    #[prost(int32, tag = "2")]
    pub version: i32,
    #[prost(message, optional, tag = "3")]
    pub timestamp: ::core::option::Option<::prost_types::Timestamp>,
    #[prost(string, tag = "4")]
    pub channel_id: ::prost::alloc::string::String,
    /// End-to-end transaction identifier set by the submitter.
    #[prost(string, tag = "5")]
    pub tx_id: ::prost::alloc::string::String,
    #[prost(uint64, tag = "6")]
    pub epoch: u64,
    /// Type-dependent extension; a marshaled
    /// [`ChaincodeHeaderExtension`](crate::peer::ChaincodeHeaderExtension)
    /// for endorser transactions.
    #[prost(bytes = "vec", tag = "7")]
    pub extension: ::prost::alloc::vec::Vec<u8>,
}

/// Identifies the message creator and the nonce used for replay
/// protection.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignatureHeader {
    /// Marshaled [`SerializedIdentity`](crate::msp::SerializedIdentity).
    #[prost(bytes = "vec", tag = "1")]
    pub creator: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub nonce: ::prost::alloc::vec::Vec<u8>,
}

/// An ordered batch of committed transactions plus metadata; the atomic
/// commit unit of a channel's ledger.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Block {
    #[prost(message, optional, tag = "1")]
    pub header: ::core::option::Option<BlockHeader>,
    #[prost(message, optional, tag = "2")]
    pub data: ::core::option::Option<BlockData>,
    #[prost(message, optional, tag = "3")]
    pub metadata: ::core::option::Option<BlockMetadata>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockHeader {
    /// Position of this block in the chain (the block height).
    #[prost(uint64, tag = "1")]
    pub number: u64,
    #[prost(bytes = "vec", tag = "2")]
    pub previous_hash: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub data_hash: ::prost::alloc::vec::Vec<u8>,
}

/// Ordered transaction envelopes, each a marshaled [`Envelope`].
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockData {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub data: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

/// Indexed metadata entries; see [`BlockMetadataIndex`] for the layout.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockMetadata {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub metadata: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}

/// Values of [`ChannelHeader::type`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum HeaderType {
    Message = 0,
    Config = 1,
    ConfigUpdate = 2,
    /// A chaincode invocation and its endorsed execution result.
    EndorserTransaction = 3,
    OrdererTransaction = 4,
    DeliverSeekInfo = 5,
    ChaincodePackage = 6,
}

/// Well-known positions in [`BlockMetadata::metadata`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum BlockMetadataIndex {
    Signatures = 0,
    LastConfig = 1,
    /// One validation-code byte per transaction, in block order.
    /// Byte value 0 marks a transaction accepted at commit.
    TransactionsFilter = 2,
    Orderer = 3,
}
