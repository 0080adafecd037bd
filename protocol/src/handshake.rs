//! Node handshake protocol.
//!
//! Verifies a peer's claimed node identity and protocol version from an
//! already-received [`NodeIdHandshakeMessage`]; this module never opens a
//! connection itself, it only validates what a transport layer hands it.

use bln_crypto::verify_signature;
use bln_messages::NodeIdHandshakeMessage;
use bln_types::{NetworkId, PublicKey};

use crate::version::is_compatible;
use crate::ProtocolError;

/// Information about a peer after a successful handshake.
pub struct PeerInfo {
    pub node_id: PublicKey,
    pub protocol_version: u16,
    pub network_id: NetworkId,
}

/// Validate a peer's handshake message against the network we're running
/// and the cookie we expect them to have signed.
pub fn verify_handshake(
    message: &NodeIdHandshakeMessage,
    expected_network: NetworkId,
    cookie: &[u8],
) -> Result<PeerInfo, ProtocolError> {
    if message.header.network_id != expected_network {
        return Err(ProtocolError::HandshakeFailed(format!(
            "network mismatch: expected {:?}, got {:?}",
            expected_network, message.header.network_id
        )));
    }
    if !is_compatible(message.header.protocol_version) {
        return Err(ProtocolError::UnsupportedVersion(message.header.protocol_version));
    }
    if !verify_signature(cookie, &message.signature, &message.node_id) {
        return Err(ProtocolError::HandshakeFailed(
            "node id signature does not match the handshake cookie".into(),
        ));
    }
    Ok(PeerInfo {
        node_id: message.node_id.clone(),
        protocol_version: message.header.protocol_version,
        network_id: message.header.network_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bln_crypto::{generate_keypair, sign_message};
    use bln_messages::MessageHeader;
    use bln_messages::MessageType;
    use bln_types::Timestamp;

    fn handshake_message(cookie: &[u8], network: NetworkId, version: u16) -> NodeIdHandshakeMessage {
        let keypair = generate_keypair();
        let signature = sign_message(cookie, &keypair.private);
        NodeIdHandshakeMessage {
            header: MessageHeader {
                message_type: MessageType::NodeIdHandshake,
                network_id: network,
                protocol_version: version,
                timestamp: Timestamp::new(0),
            },
            node_id: keypair.public,
            signature,
        }
    }

    #[test]
    fn accepts_a_correctly_signed_cookie() {
        let cookie = b"handshake-cookie";
        let message = handshake_message(cookie, NetworkId::Dev, crate::PROTOCOL_VERSION);
        let peer = verify_handshake(&message, NetworkId::Dev, cookie).unwrap();
        assert_eq!(peer.protocol_version, crate::PROTOCOL_VERSION);
    }

    #[test]
    fn rejects_a_network_mismatch() {
        let cookie = b"handshake-cookie";
        let message = handshake_message(cookie, NetworkId::Live, crate::PROTOCOL_VERSION);
        assert!(verify_handshake(&message, NetworkId::Dev, cookie).is_err());
    }

    #[test]
    fn rejects_a_cookie_that_was_not_signed() {
        let cookie = b"handshake-cookie";
        let message = handshake_message(b"a different cookie", NetworkId::Dev, crate::PROTOCOL_VERSION);
        assert!(verify_handshake(&message, NetworkId::Dev, cookie).is_err());
    }
}
