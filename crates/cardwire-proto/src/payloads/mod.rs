//! Typed payloads and the [`Payload`] enum that ties them to [`Opcode`].

pub mod error;
pub mod hand;
pub mod handshake;
pub mod play;
pub mod state;

pub use error::ErrorPayload;
pub use hand::HandPayload;
pub use handshake::{LoginResp, ResumeReq, ResumeResp};
pub use play::PlayCard;
pub use state::{ActorRecord, StatePayload};

use zerocopy::{FromBytes, IntoBytes};

use crate::{
    Frame, Opcode,
    errors::{ProtocolError, Result},
};

/// A decoded payload, one variant per [`Opcode`].
///
/// Unlike [`Frame`], which carries raw bytes, this enum gives typed access
/// to the fields of each wire record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Empty.
    LoginReq,
    /// `{ok: i32}`.
    LoginResp(LoginResp),
    /// Empty.
    Ping,
    /// Empty.
    Pong,
    /// `{session_id: u64}`.
    ResumeReq(ResumeReq),
    /// `{ok: i32, session_id: u64}`.
    ResumeResp(ResumeResp),
    /// `{hand_idx: u8}`.
    PlayCard(PlayCard),
    /// Empty.
    EndTurn,
    /// Packed match-state record.
    State(StatePayload),
    /// `{n: u8, card_ids: [u16; 8]}`.
    Hand(HandPayload),
    /// `{code: i32, msg: [u8; 48]}`.
    Error(ErrorPayload),
}

impl Payload {
    /// The opcode this payload variant corresponds to.
    #[must_use]
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::LoginReq => Opcode::LoginReq,
            Self::LoginResp(_) => Opcode::LoginResp,
            Self::Ping => Opcode::Ping,
            Self::Pong => Opcode::Pong,
            Self::ResumeReq(_) => Opcode::ResumeReq,
            Self::ResumeResp(_) => Opcode::ResumeResp,
            Self::PlayCard(_) => Opcode::PlayCard,
            Self::EndTurn => Opcode::EndTurn,
            Self::State(_) => Opcode::State,
            Self::Hand(_) => Opcode::Hand,
            Self::Error(_) => Opcode::Error,
        }
    }

    /// Encodes this payload's body to raw bytes (no frame header).
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::LoginReq | Self::Ping | Self::Pong | Self::EndTurn => Vec::new(),
            Self::LoginResp(p) => p.as_bytes().to_vec(),
            Self::ResumeReq(p) => p.as_bytes().to_vec(),
            Self::ResumeResp(p) => p.as_bytes().to_vec(),
            Self::PlayCard(p) => p.as_bytes().to_vec(),
            Self::State(p) => p.as_bytes().to_vec(),
            Self::Hand(p) => p.as_bytes().to_vec(),
            Self::Error(p) => p.as_bytes().to_vec(),
        }
    }

    /// Decodes a payload body given the opcode it was received under.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::PayloadSizeMismatch`] if `bytes.len()` does not
    /// match the opcode's fixed declared size.
    pub fn decode(opcode: Opcode, bytes: &[u8]) -> Result<Self> {
        let expected = opcode.payload_size();
        if bytes.len() != expected {
            return Err(ProtocolError::PayloadSizeMismatch { opcode: opcode.to_u16(), expected, actual: bytes.len() });
        }

        // INVARIANT: bytes.len() == opcode.payload_size() was just checked above,
        // so every ref_from_bytes call below is parsing a buffer of the exact
        // size its target type declares.
        #[allow(clippy::expect_used)]
        Ok(match opcode {
            Opcode::LoginReq => Self::LoginReq,
            Opcode::Ping => Self::Ping,
            Opcode::Pong => Self::Pong,
            Opcode::EndTurn => Self::EndTurn,
            Opcode::LoginResp => Self::LoginResp(*LoginResp::ref_from_bytes(bytes).expect("size checked above")),
            Opcode::ResumeReq => Self::ResumeReq(*ResumeReq::ref_from_bytes(bytes).expect("size checked above")),
            Opcode::ResumeResp => Self::ResumeResp(*ResumeResp::ref_from_bytes(bytes).expect("size checked above")),
            Opcode::PlayCard => Self::PlayCard(*PlayCard::ref_from_bytes(bytes).expect("size checked above")),
            Opcode::State => Self::State(*StatePayload::ref_from_bytes(bytes).expect("size checked above")),
            Opcode::Hand => Self::Hand(*HandPayload::ref_from_bytes(bytes).expect("size checked above")),
            Opcode::Error => Self::Error(*ErrorPayload::ref_from_bytes(bytes).expect("size checked above")),
        })
    }

    /// Wraps this payload into a [`Frame`] ready for [`Frame::encode`].
    #[must_use]
    pub fn into_frame(self) -> Frame {
        let opcode = self.opcode();
        Frame::new(opcode, self.encode())
    }

    /// Extracts the typed payload from a decoded [`Frame`].
    ///
    /// # Errors
    ///
    /// [`ProtocolError::UnknownOpcode`] if the frame's opcode is not
    /// recognized, or [`ProtocolError::PayloadSizeMismatch`] if the
    /// payload length disagrees with the opcode.
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        let opcode = frame.header.opcode().ok_or(ProtocolError::UnknownOpcode(frame.header.opcode_raw()))?;
        Self::decode(opcode, &frame.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_round_trips_through_frame() {
        let frame = Payload::Ping.into_frame();
        let mut wire = Vec::new();
        frame.encode(&mut wire).expect("should encode");

        let decoded = Frame::decode(&wire).expect("should decode");
        let payload = Payload::from_frame(&decoded).expect("should parse");
        assert_eq!(payload, Payload::Ping);
    }

    #[test]
    fn play_card_round_trips_through_frame() {
        let frame = Payload::PlayCard(PlayCard::new(2)).into_frame();
        let mut wire = Vec::new();
        frame.encode(&mut wire).expect("should encode");

        let decoded = Frame::decode(&wire).expect("should decode");
        let payload = Payload::from_frame(&decoded).expect("should parse");
        assert_eq!(payload, Payload::PlayCard(PlayCard::new(2)));
    }

    #[test]
    fn mismatched_payload_size_is_rejected() {
        let result = Payload::decode(Opcode::PlayCard, &[1, 2, 3]);
        assert!(matches!(result, Err(ProtocolError::PayloadSizeMismatch { .. })));
    }
}
