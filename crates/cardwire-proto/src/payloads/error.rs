//! The `ERROR` payload and the fixed set of numeric error codes.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Hand index referred to a slot that is out of range or already consumed.
pub const INVALID_INDEX: i32 = -1;
/// Card cost exceeded the current mana pool.
pub const INSUFFICIENT_MANA: i32 = -2;
/// Slot referenced a card id absent from the catalog.
pub const INVALID_CARD: i32 = -3;
/// Payload length did not match the opcode's declared size.
pub const BAD_PAYLOAD: i32 = -10;
/// Action attempted by the side that does not currently hold the turn.
pub const NOT_YOUR_TURN: i32 = -11;
/// Action attempted outside of MAIN phase.
pub const WRONG_PHASE: i32 = -12;
/// Opcode not recognized.
pub const UNKNOWN_OPCODE: i32 = -99;
/// Session store had no free slot to allocate.
pub const STORE_FULL: i32 = -999;

/// Length of the fixed, zero-padded message field.
pub const MESSAGE_LEN: usize = 48;

/// `ERROR` payload: `{code: i32, msg: 48-byte zero-padded text}`.
#[repr(C, packed)]
#[derive(Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct ErrorPayload {
    code: [u8; 4],
    msg: [u8; MESSAGE_LEN],
}

impl ErrorPayload {
    /// Size on the wire.
    pub const SIZE: usize = 4 + MESSAGE_LEN;

    /// Builds an error payload, truncating `message` to fit the fixed field.
    #[must_use]
    pub fn new(code: i32, message: &str) -> Self {
        let mut msg = [0u8; MESSAGE_LEN];
        let bytes = message.as_bytes();
        let n = bytes.len().min(MESSAGE_LEN);
        msg[..n].copy_from_slice(&bytes[..n]);
        Self { code: code.to_be_bytes(), msg }
    }

    /// Numeric error code (see the module-level constants).
    #[must_use]
    pub fn code(&self) -> i32 {
        i32::from_be_bytes(self.code)
    }

    /// Zero-padded message, decoded as UTF-8 up to the first NUL.
    #[must_use]
    pub fn message(&self) -> String {
        let end = self.msg.iter().position(|&b| b == 0).unwrap_or(MESSAGE_LEN);
        String::from_utf8_lossy(&self.msg[..end]).into_owned()
    }

    /// `-1 invalid index`.
    #[must_use]
    pub fn invalid_index() -> Self {
        Self::new(INVALID_INDEX, "invalid hand index")
    }

    /// `-2 insufficient mana`.
    #[must_use]
    pub fn insufficient_mana() -> Self {
        Self::new(INSUFFICIENT_MANA, "insufficient mana")
    }

    /// `-3 invalid card`.
    #[must_use]
    pub fn invalid_card() -> Self {
        Self::new(INVALID_CARD, "invalid card")
    }

    /// `-10 bad payload`.
    #[must_use]
    pub fn bad_payload() -> Self {
        Self::new(BAD_PAYLOAD, "bad payload")
    }

    /// `-11 not your turn`.
    #[must_use]
    pub fn not_your_turn() -> Self {
        Self::new(NOT_YOUR_TURN, "not your turn")
    }

    /// `-12 wrong phase`.
    #[must_use]
    pub fn wrong_phase() -> Self {
        Self::new(WRONG_PHASE, "wrong phase")
    }

    /// `-99 unknown opcode`.
    #[must_use]
    pub fn unknown_opcode() -> Self {
        Self::new(UNKNOWN_OPCODE, "unknown opcode")
    }

    /// `-999 store full`.
    #[must_use]
    pub fn store_full() -> Self {
        Self::new(STORE_FULL, "session store full")
    }
}

impl std::fmt::Debug for ErrorPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorPayload").field("code", &self.code()).field("message", &self.message()).finish()
    }
}

impl PartialEq for ErrorPayload {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for ErrorPayload {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let err = ErrorPayload::insufficient_mana();
        let bytes = err.as_bytes();
        let parsed = ErrorPayload::ref_from_bytes(bytes).expect("should parse");
        assert_eq!(err, *parsed);
        assert_eq!(parsed.code(), INSUFFICIENT_MANA);
        assert_eq!(parsed.message(), "insufficient mana");
    }

    #[test]
    fn long_message_is_truncated_not_panicking() {
        let message = "x".repeat(200);
        let err = ErrorPayload::new(-1, &message);
        assert_eq!(err.message().len(), MESSAGE_LEN);
    }
}
