//! Frame type combining header and payload, with checksum enforcement.
//!
//! A `Frame` is the transport-layer packet: an 8-byte header followed by a
//! fixed-size (per opcode) payload. This is a pure data holder; see
//! [`crate::payloads::Payload`] for the higher-level enum that interprets
//! the payload bytes.

use bytes::{BufMut, Bytes};

use crate::{
    FrameHeader, Opcode,
    checksum::checksum16,
    errors::{ProtocolError, Result},
};

/// Complete protocol frame: header + raw payload bytes.
///
/// # Invariants
///
/// - `payload.len()` always matches `header.payload_len()`; enforced by
///   [`Frame::new`] and checked again in [`Frame::decode`].
/// - `header.total_length()` never exceeds [`FrameHeader::MAX_FRAME_SIZE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame header (8 bytes).
    pub header: FrameHeader,
    /// Raw payload bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Builds a frame from an opcode and payload, with `total_length` set
    /// to match. The checksum is computed lazily in [`Self::encode`].
    #[must_use]
    pub fn new(opcode: Opcode, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        let header = FrameHeader::new(opcode, payload.len() as u32);
        Self { header, payload }
    }

    /// Encodes this frame to `dst`, computing and filling in the checksum.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::LengthOutOfRange`] if the resulting frame would
    /// exceed [`FrameHeader::MAX_FRAME_SIZE`].
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<()> {
        let total_length = self.header.total_length();
        if total_length > FrameHeader::MAX_FRAME_SIZE {
            return Err(ProtocolError::LengthOutOfRange {
                length: total_length,
                min: FrameHeader::SIZE as u32,
                max: FrameHeader::MAX_FRAME_SIZE,
            });
        }

        let mut header = self.header;
        header.set_checksum(0);

        let mut wire = Vec::with_capacity(total_length as usize);
        wire.extend_from_slice(&header.to_bytes());
        wire.extend_from_slice(&self.payload);

        let checksum = checksum16(&wire);
        wire[6..8].copy_from_slice(&checksum.to_be_bytes());

        dst.put_slice(&wire);
        Ok(())
    }

    /// Decodes a frame from `bytes`, verifying the checksum.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::FrameTooShort`] / [`ProtocolError::LengthOutOfRange`]
    ///   from header parsing.
    /// - [`ProtocolError::FrameTruncated`] if fewer payload bytes are present
    ///   than the header claims.
    /// - [`ProtocolError::ChecksumMismatch`] if the recomputed checksum
    ///   disagrees with the transmitted one.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let header = *FrameHeader::from_bytes(bytes)?;

        let payload_len = header.payload_len() as usize;
        let total_len = FrameHeader::SIZE + payload_len;

        if bytes.len() < total_len {
            return Err(ProtocolError::FrameTruncated {
                expected: payload_len,
                actual: bytes.len().saturating_sub(FrameHeader::SIZE),
            });
        }

        let payload = &bytes[FrameHeader::SIZE..total_len];

        let mut zeroed = header;
        zeroed.set_checksum(0);
        let mut rebuilt = Vec::with_capacity(total_len);
        rebuilt.extend_from_slice(&zeroed.to_bytes());
        rebuilt.extend_from_slice(payload);

        let computed = checksum16(&rebuilt);
        let expected = header.checksum();
        if computed != expected {
            return Err(ProtocolError::ChecksumMismatch { expected, computed });
        }

        Ok(Self { header, payload: Bytes::copy_from_slice(payload) })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn ping_round_trip() {
        let frame = Frame::new(Opcode::Ping, Vec::new());
        let mut wire = Vec::new();
        frame.encode(&mut wire).expect("should encode");

        let parsed = Frame::decode(&wire).expect("should decode");
        assert_eq!(parsed.header.opcode(), Some(Opcode::Ping));
        assert_eq!(parsed.payload.len(), 0);
    }

    #[test]
    fn play_card_round_trip() {
        let frame = Frame::new(Opcode::PlayCard, vec![3u8]);
        let mut wire = Vec::new();
        frame.encode(&mut wire).expect("should encode");

        let parsed = Frame::decode(&wire).expect("should decode");
        assert_eq!(parsed.payload.as_ref(), &[3u8][..]);
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let frame = Frame::new(Opcode::PlayCard, vec![3u8]);
        let mut wire = Vec::new();
        frame.encode(&mut wire).expect("should encode");

        let last = wire.len() - 1;
        wire[last] ^= 0xFF;

        let result = Frame::decode(&wire);
        assert!(matches!(result, Err(ProtocolError::ChecksumMismatch { .. })));
    }

    #[test]
    fn truncated_frame_is_rejected() {
        let frame = Frame::new(Opcode::PlayCard, vec![3u8]);
        let mut wire = Vec::new();
        frame.encode(&mut wire).expect("should encode");

        let result = Frame::decode(&wire[..wire.len() - 1]);
        assert!(matches!(result, Err(ProtocolError::FrameTruncated { .. })));
    }

    proptest! {
        #[test]
        fn round_trip_any_payload_under_limit(payload in prop::collection::vec(any::<u8>(), 0..2000)) {
            let frame = Frame::new(Opcode::Error, payload.clone());
            let mut wire = Vec::new();
            frame.encode(&mut wire).expect("should encode");

            let parsed = Frame::decode(&wire).expect("should decode");
            prop_assert_eq!(parsed.payload.as_ref(), payload.as_slice());
        }
    }
}
