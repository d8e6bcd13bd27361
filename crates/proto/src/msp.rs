//! Messages from the Fabric `msp` protobuf package.

/// A membership-scoped identity: the id of the membership service
/// provider that issued the certificate, plus the certificate itself.
///
/// `id_bytes` carries the PEM-encoded X.509 certificate. This is the
/// creator identity asserted by signed requests.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SerializedIdentity {
    #[prost(string, tag = "1")]
    pub mspid: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub id_bytes: ::prost::alloc::vec::Vec<u8>,
}
