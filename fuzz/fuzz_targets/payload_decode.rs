//! Fuzz target for `Payload::decode`.
//!
//! Tests payload deserialization with arbitrary bytes against every opcode,
//! looking for type-confusion or size-check bypasses. Should never panic;
//! all invalid inputs must return an error.

#![no_main]

use cardwire_proto::{Opcode, Payload};
use libfuzzer_sys::fuzz_target;

const OPCODES: [Opcode; 11] = [
    Opcode::LoginReq,
    Opcode::LoginResp,
    Opcode::Ping,
    Opcode::Pong,
    Opcode::ResumeReq,
    Opcode::ResumeResp,
    Opcode::PlayCard,
    Opcode::EndTurn,
    Opcode::State,
    Opcode::Hand,
    Opcode::Error,
];

fuzz_target!(|data: &[u8]| {
    for opcode in OPCODES {
        let _ = Payload::decode(opcode, data);
    }
});
