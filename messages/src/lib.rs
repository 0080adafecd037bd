//! Network message types exchanged between nodes.
//!
//! Bootstrap/sync and peer-discovery messages are not defined here — those
//! protocols are a named-interface collaborator this crate doesn't
//! implement. What's here is the message set that actually rides on top of
//! the block-lattice and voting core: block publication, vote solicitation
//! and reply, keepalive, and the node-identity handshake.

use bln_ledger::Block;
use bln_types::{Account, BlockHash, NetworkId, PublicKey, Signature, Timestamp};
use serde::{Deserialize, Serialize};

/// Header present on every network message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageHeader {
    pub message_type: MessageType,
    pub network_id: NetworkId,
    pub protocol_version: u16,
    pub timestamp: Timestamp,
}

/// All message types in the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    Keepalive,
    Publish,
    ConfirmReq,
    ConfirmAck,
    FrontierReq,
    FrontierResp,
    NodeIdHandshake,
}

/// A block publication — gossip of a newly processed block (§6.1).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PublishMessage {
    pub header: MessageHeader,
    pub block: Block,
}

/// Request confirmation (a vote) for a block.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConfirmReqMessage {
    pub header: MessageHeader,
    pub block_hash: BlockHash,
}

/// A representative's vote on one or more block hashes (§6.2).
///
/// `hashes` carries one or more block hashes bundled under a single
/// signature and timestamp, matching the wire layout's `hash_count ×
/// block_hash` tail. `timestamp == Timestamp::FINAL` marks a final vote.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConfirmAckMessage {
    pub header: MessageHeader,
    pub representative: Account,
    pub hashes: Vec<BlockHash>,
    pub vote_timestamp: u64,
    pub signature: Signature,
}

/// Keepalive message carrying the sender's known peer addresses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeepaliveMessage {
    pub header: MessageHeader,
    pub peers: Vec<PeerAddress>,
}

/// A peer's network address.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PeerAddress {
    pub ip: String,
    pub port: u16,
}

/// Frontier request — ask for account chain heads starting at `start_account`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrontierReqMessage {
    pub header: MessageHeader,
    pub start_account: Account,
    pub count: u32,
}

/// Frontier response — `(account, frontier hash)` pairs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrontierRespMessage {
    pub header: MessageHeader,
    pub frontiers: Vec<(Account, BlockHash)>,
}

/// Node ID handshake, used to authenticate a peer connection (§10.4 boundary;
/// verification lives in `bln_protocol::handshake`, transport doesn't).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeIdHandshakeMessage {
    pub header: MessageHeader,
    pub node_id: PublicKey,
    pub signature: Signature,
}

/// The final-vote timestamp sentinel (§6.2: `timestamp == U64_MAX`).
pub const FINAL_VOTE_TIMESTAMP: u64 = u64::MAX;
