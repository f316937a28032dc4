//! Server-facing error type.
//!
//! Deliberately hand-rolled rather than `thiserror`-derived, unlike the
//! inner `EngineError`/`StoreError`/`ProtocolError` types: this is the
//! outermost error surface the binary reports on exit, and its variants
//! mostly just wrap a formatted string from a lower layer.

use std::fmt;

/// Errors surfaced to the binary's `main`.
#[derive(Debug)]
pub enum ServerError {
    /// Invalid CLI argument or TLS material.
    Config(String),
    /// Transport-level failure (bind, accept, handshake).
    Transport(String),
    /// I/O failure underlying a transport or store operation.
    Io(std::io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Config(_) | Self::Transport(_) => None,
        }
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
