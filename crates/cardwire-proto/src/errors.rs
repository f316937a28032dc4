//! Protocol-level error taxonomy.

/// Errors produced while framing or parsing wire bytes.
///
/// These are distinct from in-game validation errors (insufficient mana,
/// wrong phase, ...), which are reported to the peer as an [`crate::payloads::ErrorPayload`]
/// rather than surfaced as a Rust error — see spec-level error code table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Buffer was shorter than the fixed header size.
    #[error("frame header too short: expected {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Bytes required.
        expected: usize,
        /// Bytes available.
        actual: usize,
    },

    /// Header claims a total length below the header size or above the
    /// maximum frame size.
    #[error("frame length {length} out of range [{min}, {max}]")]
    LengthOutOfRange {
        /// Claimed total length.
        length: u32,
        /// Minimum accepted length (header size).
        min: u32,
        /// Maximum accepted length.
        max: u32,
    },

    /// Buffer did not contain the full payload the header promised.
    #[error("frame truncated: expected {expected} payload bytes, got {actual}")]
    FrameTruncated {
        /// Payload bytes the header promised.
        expected: usize,
        /// Payload bytes actually available.
        actual: usize,
    },

    /// Recomputed checksum did not match the transmitted checksum.
    #[error("checksum mismatch: expected {expected:#06x}, computed {computed:#06x}")]
    ChecksumMismatch {
        /// Checksum read from the wire.
        expected: u16,
        /// Checksum recomputed locally.
        computed: u16,
    },

    /// Opcode field did not match any known opcode.
    #[error("unknown opcode {0:#06x}")]
    UnknownOpcode(u16),

    /// Payload length did not match the fixed size declared for this opcode.
    #[error("payload size mismatch for opcode {opcode:#06x}: expected {expected}, got {actual}")]
    PayloadSizeMismatch {
        /// Opcode the payload was decoded for.
        opcode: u16,
        /// Fixed size the opcode declares.
        expected: usize,
        /// Size actually present.
        actual: usize,
    },
}

/// Convenience result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, ProtocolError>;
