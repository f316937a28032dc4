//! Wire format for the cardwire match protocol.
//!
//! Covers framing (8-byte header + checksum), the opcode set, and the
//! fixed-size packed payload record for each opcode. Has no I/O and no game
//! logic — see `cardwire-core` for the match engine and `cardwire-server`
//! for the transport and connection worker that drive this crate.

pub mod checksum;
pub mod errors;
mod frame;
mod header;
mod opcode;
pub mod payloads;

pub use errors::{ProtocolError, Result};
pub use frame::Frame;
pub use header::FrameHeader;
pub use opcode::Opcode;
pub use payloads::Payload;
