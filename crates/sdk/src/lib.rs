//! Client SDK for subscribing to committed-block events on a
//! permissioned-ledger peer and decoding the transactions they carry.
//!
//! The surface is small: configure an [`EventClient`] with an endpoint,
//! a membership id and an enrollment [`Identity`](hlfc_crypto::Identity),
//! then [`subscribe`](EventClient::subscribe) and receive one
//! [`TxRecord`] per committed transaction, in commit order:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use hlfc_crypto::{EcdsaSuite, Identity, PrivateKey};
//! use hlfc_sdk::{EventClient, EventClientConfig};
//!
//! # async fn run(cert_pem: &str, key_pem: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let config = EventClientConfig::builder()
//!     .endpoint("http://peer0.example.com:7053")
//!     .msp_id("Org1MSP")
//!     .build()?;
//! let identity = Identity::from_cert_pem(cert_pem, PrivateKey::ecdsa_from_pkcs8_pem(key_pem)?)?;
//!
//! let client = EventClient::new(config, identity, Arc::new(EcdsaSuite::new()));
//! let mut subscription = client.subscribe().await?;
//! while let Some(record) = subscription.recv().await {
//!     println!("block {} tx {}: valid={}", record.block_height, record.tx_id, record.is_valid);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Decoding is also usable standalone via [`decode_block`] and
//! [`decode_block_tx`] for blocks obtained elsewhere.

#![deny(unsafe_code)]

mod config;
mod connection;
mod decode;
mod error;
mod events;
pub mod mock;

pub use config::{EventClientConfig, EventClientConfigBuilder};
pub use connection::{PeerConnection, GRPC_MAX_MESSAGE_SIZE};
pub use decode::{decode_block, decode_block_tx, ChaincodeEvent, TxRecord};
pub use error::{Result, SdkError};
pub use events::{EventClient, StopHandle, Subscription};
