//! Pure decoding of committed transactions.
//!
//! [`decode_block_tx`] unwraps one raw transaction envelope from a
//! committed block down to application-level chaincode events. The
//! pipeline is an ordered sequence of fallible transforms over a
//! partial-result accumulator ([`TxRecord`]): each stage either advances
//! the record or attaches an error and stops advancing later fields
//! while keeping the earlier ones.
//!
//! Failure semantics, by stage:
//! - envelope / payload / channel header / header extension: abort, the
//!   record carries only the error;
//! - base fields (height, index, tx id, channel, validity, status,
//!   chaincode identity): always resolved once the headers parse;
//! - endorser-transaction detail (args, events): any sub-stage failure
//!   stops further detail but the identification fields above survive.
//!   Partial correlation data is preferred over total loss.

use hlfc_proto::common::{
    Block, BlockMetadataIndex, ChannelHeader, Envelope, HeaderType, Payload,
};
use hlfc_proto::peer::{
    ChaincodeAction, ChaincodeActionPayload, ChaincodeHeaderExtension,
    ChaincodeInvocationSpec, ChaincodeProposalPayload, ProposalResponsePayload, Transaction,
};
use prost::Message;
use snafu::ResultExt;

use crate::error::{DataShapeSnafu, ProtocolDecodeSnafu, Result, SdkError};

/// Validation code marking a transaction accepted at commit.
const TX_VALIDATION_CODE_VALID: u8 = 0;

/// An application-defined event emitted by chaincode during execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChaincodeEvent {
    /// Event name chosen by the chaincode.
    pub name: String,
    /// Opaque event payload.
    pub payload: Vec<u8>,
}

/// One normalized record per committed transaction.
///
/// Identification fields resolve in pipeline order; a record produced by
/// an outer-stage failure carries only `error`, while an inner-stage
/// failure keeps everything resolved up to that point. Ownership moves
/// to the consumer on delivery and the record is never mutated after.
#[derive(Debug, Default)]
pub struct TxRecord {
    /// Decode failure attached to this transaction, if any. Does not
    /// affect neighboring transactions.
    pub error: Option<SdkError>,
    /// Whether the transaction was accepted at commit (validation flag 0).
    pub is_valid: bool,
    /// Height of the containing block.
    pub block_height: u64,
    /// Position of the transaction within its block.
    pub tx_index: usize,
    /// End-to-end transaction id from the channel header.
    pub tx_id: String,
    /// Channel the transaction committed on.
    pub channel_name: String,
    /// Target chaincode name, when the header extension carries one.
    pub chaincode_name: String,
    /// Target chaincode version, when the header extension carries one.
    pub chaincode_version: String,
    /// Raw per-transaction validation code byte.
    pub status_code: i32,
    /// Ordered chaincode invocation arguments.
    pub invocation_args: Vec<Vec<u8>>,
    /// Events emitted by the chaincode. The wire format carries at most
    /// one per action today; a sequence keeps the surface forward
    /// compatible.
    pub events: Vec<ChaincodeEvent>,
}

/// Decodes every transaction of a committed block, in block order.
///
/// Convenience over [`decode_block_tx`]; the stream reader uses the
/// per-transaction form so records can be delivered as they decode.
#[must_use]
pub fn decode_block(block: &Block) -> Vec<TxRecord> {
    let height = block.header.as_ref().map(|h| h.number).unwrap_or_default();
    let metadata: &[Vec<u8>] =
        block.metadata.as_ref().map(|m| m.metadata.as_slice()).unwrap_or_default();
    let data: &[Vec<u8>] = block.data.as_ref().map(|d| d.data.as_slice()).unwrap_or_default();

    data.iter()
        .enumerate()
        .map(|(idx, raw)| decode_block_tx(raw, height, idx, metadata))
        .collect()
}

/// Decodes one raw transaction envelope into a [`TxRecord`].
///
/// Pure: no I/O, no shared state. `metadata` is the block's indexed
/// metadata array; the transactions-filter entry supplies the validation
/// flag for `tx_index`.
#[must_use]
pub fn decode_block_tx(
    raw: &[u8],
    block_height: u64,
    tx_index: usize,
    metadata: &[Vec<u8>],
) -> TxRecord {
    let mut record =
        TxRecord { block_height, tx_index, ..TxRecord::default() };
    if let Err(error) = run_pipeline(raw, metadata, &mut record) {
        record.error = Some(error);
    }
    record
}

fn unmarshal<T: Message + Default>(bytes: &[u8], stage: &'static str) -> Result<T> {
    T::decode(bytes).context(ProtocolDecodeSnafu { stage })
}

fn run_pipeline(raw: &[u8], metadata: &[Vec<u8>], record: &mut TxRecord) -> Result<()> {
    let envelope: Envelope = unmarshal(raw, "envelope")?;
    let payload: Payload = unmarshal(&envelope.payload, "payload")?;
    let header = payload
        .header
        .as_ref()
        .ok_or_else(|| DataShapeSnafu { message: "payload carries no header" }.build())?;
    let channel_header: ChannelHeader =
        unmarshal(&header.channel_header, "channel header")?;
    let extension: ChaincodeHeaderExtension =
        unmarshal(&channel_header.extension, "chaincode header extension")?;

    // Base fields. From here on the record keeps whatever has resolved,
    // whatever later stages report.
    //
    // The validation flag and the conventional per-transaction status
    // live in the same metadata entry: the transactions-filter array
    // holds one validation-code byte per transaction, and status is that
    // raw byte.
    let flag = metadata
        .get(BlockMetadataIndex::TransactionsFilter as usize)
        .and_then(|flags| flags.get(record.tx_index))
        .copied();
    record.is_valid = flag == Some(TX_VALIDATION_CODE_VALID);
    record.status_code = i32::from(flag.unwrap_or(TX_VALIDATION_CODE_VALID));
    record.tx_id = channel_header.tx_id;
    record.channel_name = channel_header.channel_id;
    if let Some(chaincode_id) = extension.chaincode_id {
        record.chaincode_name = chaincode_id.name;
        record.chaincode_version = chaincode_id.version;
    }

    if channel_header.r#type == HeaderType::EndorserTransaction as i32 {
        decode_endorser_detail(&payload.data, record)?;
    }
    Ok(())
}

/// Stage 6: unwraps the endorser-transaction detail into `invocation_args`
/// and `events`. Errors here leave the base fields on the record intact.
fn decode_endorser_detail(data: &[u8], record: &mut TxRecord) -> Result<()> {
    let transaction: Transaction = unmarshal(data, "transaction")?;
    let action = transaction
        .actions
        .first()
        .ok_or_else(|| DataShapeSnafu { message: "transaction has no actions" }.build())?;

    let action_payload: ChaincodeActionPayload =
        unmarshal(&action.payload, "chaincode action payload")?;
    let proposal_payload: ChaincodeProposalPayload = unmarshal(
        &action_payload.chaincode_proposal_payload,
        "chaincode proposal payload",
    )?;
    let invocation: ChaincodeInvocationSpec =
        unmarshal(&proposal_payload.input, "chaincode invocation spec")?;
    record.invocation_args = invocation
        .chaincode_spec
        .and_then(|spec| spec.input)
        .map(|input| input.args)
        .unwrap_or_default();

    let endorsed = action_payload
        .action
        .ok_or_else(|| DataShapeSnafu { message: "action carries no endorsed action" }.build())?;
    let response_payload: ProposalResponsePayload = unmarshal(
        &endorsed.proposal_response_payload,
        "proposal response payload",
    )?;
    let chaincode_action: ChaincodeAction =
        unmarshal(&response_payload.extension, "chaincode action")?;
    let event: hlfc_proto::peer::ChaincodeEvent =
        unmarshal(&chaincode_action.events, "chaincode event")?;
    if !event.event_name.is_empty() {
        record.events.push(ChaincodeEvent { name: event.event_name, payload: event.payload });
    }
    Ok(())
}
