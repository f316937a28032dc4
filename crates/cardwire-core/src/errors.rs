//! Engine-level validation errors.
//!
//! These map one-to-one onto the numeric error codes the wire protocol
//! reports in `ERROR` payloads (`cardwire_proto::payloads::error`), but this
//! crate has no dependency on the wire format beyond the numeric codes
//! themselves — the server crate is responsible for turning an
//! [`EngineError`] into an `ErrorPayload`.

use cardwire_proto::payloads::error as codes;

/// A validation failure while attempting to play a card or advance a turn.
///
/// Engine invariant violations (states unreachable by construction) are not
/// represented here; per spec, a worker that detects one aborts with a
/// diagnostic rather than reporting it to the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Hand index out of range, or the slot has already been consumed.
    #[error("invalid hand index")]
    InvalidIndex,
    /// Card cost exceeds the current mana pool.
    #[error("insufficient mana")]
    InsufficientMana,
    /// Slot holds a card id absent from the catalog.
    #[error("invalid card")]
    InvalidCard,
    /// The acting side does not currently hold the turn.
    #[error("not your turn")]
    NotYourTurn,
    /// The match is not in MAIN phase.
    #[error("wrong phase")]
    WrongPhase,
}

impl EngineError {
    /// The numeric wire error code this failure reports as.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::InvalidIndex => codes::INVALID_INDEX,
            Self::InsufficientMana => codes::INSUFFICIENT_MANA,
            Self::InvalidCard => codes::INVALID_CARD,
            Self::NotYourTurn => codes::NOT_YOUR_TURN,
            Self::WrongPhase => codes::WRONG_PHASE,
        }
    }
}
