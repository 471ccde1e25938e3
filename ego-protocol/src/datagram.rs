//! Datagram encoding and decoding
//!
//! Datagram format:
//! - TOPIC (4 bytes): little-endian topic identifier
//! - PAYLOAD (1-28 bytes): topic-specific data

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Size of the topic header in bytes
pub const TOPIC_HEADER_SIZE: usize = 4;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 28;

/// Maximum complete datagram size (TOPIC + MAX_PAYLOAD)
pub const MAX_DATAGRAM_SIZE: usize = TOPIC_HEADER_SIZE + MAX_PAYLOAD_SIZE;

/// Errors that can occur while encoding or decoding datagrams and payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Datagram has no payload (4 bytes or fewer)
    NoPayload,
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Payload shorter than the topic requires
    Truncated,
    /// Payload byte outside the topic's value range
    UnknownValue(u8),
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// A topic identifier plus payload
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Datagram {
    /// Raw topic identifier
    pub topic: u32,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Datagram {
    /// Create a datagram for `topic` carrying `payload`
    pub fn new(topic: u32, payload: &[u8]) -> Result<Self, CodecError> {
        if payload.is_empty() {
            return Err(CodecError::NoPayload);
        }
        let payload = Vec::from_slice(payload).map_err(|_| CodecError::PayloadTooLarge)?;
        Ok(Self { topic, payload })
    }

    /// Parse a received datagram
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() <= TOPIC_HEADER_SIZE {
            return Err(CodecError::NoPayload);
        }
        let mut header = [0u8; TOPIC_HEADER_SIZE];
        header.copy_from_slice(&bytes[..TOPIC_HEADER_SIZE]);
        Self::new(u32::from_le_bytes(header), &bytes[TOPIC_HEADER_SIZE..])
    }

    /// Encode this datagram into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, CodecError> {
        let len = TOPIC_HEADER_SIZE + self.payload.len();
        if buffer.len() < len {
            return Err(CodecError::BufferTooSmall);
        }
        buffer[..TOPIC_HEADER_SIZE].copy_from_slice(&self.topic.to_le_bytes());
        buffer[TOPIC_HEADER_SIZE..len].copy_from_slice(&self.payload);
        Ok(len)
    }

    /// Encode this datagram into a heapless Vec
    pub fn encode_to_vec(&self) -> Vec<u8, MAX_DATAGRAM_SIZE> {
        let mut buffer = [0u8; MAX_DATAGRAM_SIZE];
        // payload length is bounded by MAX_PAYLOAD_SIZE, so this always fits
        let len = self.encode(&mut buffer).unwrap_or(0);
        let mut vec = Vec::new();
        let _ = vec.extend_from_slice(&buffer[..len]);
        vec
    }
}
