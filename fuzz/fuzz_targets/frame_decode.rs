//! Fuzz target for `Frame::decode`.
//!
//! Tests frame decoding with arbitrary byte sequences to find parser
//! crashes, integer overflows in size calculations, and malformed headers
//! that bypass validation. Should never panic; all invalid inputs must
//! return an error.

#![no_main]

use cardwire_proto::Frame;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = Frame::decode(data);
});
