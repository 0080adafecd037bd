//! Message codec — framing and serialization for the wire protocol.

use crate::ProtocolError;

/// Maximum message size in bytes.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024; // 16 MiB

/// Length of the frame's size prefix.
const LENGTH_PREFIX_BYTES: usize = 4;

/// Encode a message as a length-prefixed JSON frame, ready to write to a stream.
pub fn encode(message: &impl serde::Serialize) -> Result<Vec<u8>, ProtocolError> {
    let payload = serde_json::to_vec(message).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    if payload.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: payload.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    let mut framed = Vec::with_capacity(LENGTH_PREFIX_BYTES + payload.len());
    framed.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    framed.extend_from_slice(&payload);
    Ok(framed)
}

/// Decode a bare (unframed) JSON value — the whole buffer is the message.
pub fn decode<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, ProtocolError> {
    serde_json::from_slice(data).map_err(|e| ProtocolError::Malformed(e.to_string()))
}

/// Decode one length-prefixed frame from the front of `data`, returning the
/// decoded value along with how many bytes of `data` it consumed — the
/// caller advances its read cursor by that amount and may find another
/// frame immediately after it.
pub fn decode_framed<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<(T, usize), ProtocolError> {
    if data.len() < LENGTH_PREFIX_BYTES {
        return Err(ProtocolError::Malformed("frame shorter than length prefix".into()));
    }
    let len = u32::from_be_bytes(data[..LENGTH_PREFIX_BYTES].try_into().unwrap()) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }
    let payload = data
        .get(LENGTH_PREFIX_BYTES..LENGTH_PREFIX_BYTES + len)
        .ok_or_else(|| ProtocolError::Malformed("frame shorter than declared length".into()))?;
    let value = serde_json::from_slice(payload).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    Ok((value, LENGTH_PREFIX_BYTES + len))
}
