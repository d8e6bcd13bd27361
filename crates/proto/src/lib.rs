//! Protobuf wire types for the Hyperledger Fabric 1.x peer protocol.
//!
//! This crate provides:
//! - Message types from the `common`, `msp` and `peer` protobuf packages
//!   ([`common`], [`msp`], [`peer`])
//! - The `protos.Events` gRPC service (client and server) used for the
//!   committed-block event stream ([`peer::events_client`],
//!   [`peer::events_server`])
//!
//! # Maintenance note
//!
//! The upstream `.proto` files are not vendored, so the prost message
//! definitions and the tonic service glue are checked in and maintained by
//! hand. Field tags match the Fabric 1.x wire layout; blocks emitted by a
//! real peer decode with these types unchanged.

#![deny(unsafe_code)]
// gRPC services return tonic::Status (176 bytes) - standard practice for gRPC error handling
#![allow(clippy::result_large_err)]

/// Types from the `common` protobuf package: envelopes, headers, blocks.
pub mod common;

/// Types from the `msp` protobuf package: serialized identities.
pub mod msp;

/// Types from the `peer` protobuf package: transactions, chaincode
/// structures and the events service.
pub mod peer;
