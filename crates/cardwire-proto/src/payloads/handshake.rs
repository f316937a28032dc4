//! Login, resume, and keepalive payloads.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// `LOGIN_RESP` payload: `{ok: i32}`.
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct LoginResp {
    ok: [u8; 4],
}

impl LoginResp {
    /// Size on the wire.
    pub const SIZE: usize = 4;

    /// Builds a response, `ok` is 1 on success and 0 on failure.
    #[must_use]
    pub fn new(ok: bool) -> Self {
        Self { ok: i32::from(ok).to_be_bytes() }
    }

    /// Whether login succeeded.
    #[must_use]
    pub fn ok(&self) -> bool {
        i32::from_be_bytes(self.ok) != 0
    }
}

/// `RESUME_REQ` payload: `{session_id: u64}`.
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct ResumeReq {
    session_id: [u8; 8],
}

impl ResumeReq {
    /// Size on the wire.
    pub const SIZE: usize = 8;

    /// Builds a resume request for the given session id.
    #[must_use]
    pub fn new(session_id: u64) -> Self {
        Self { session_id: session_id.to_be_bytes() }
    }

    /// The session id the client is attempting to reattach to.
    #[must_use]
    pub fn session_id(&self) -> u64 {
        u64::from_be_bytes(self.session_id)
    }
}

/// `RESUME_RESP` payload: `{ok: i32, session_id: u64}`.
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct ResumeResp {
    ok: [u8; 4],
    session_id: [u8; 8],
}

impl ResumeResp {
    /// Size on the wire.
    pub const SIZE: usize = 12;

    /// Builds a successful resume response carrying the session id.
    #[must_use]
    pub fn accepted(session_id: u64) -> Self {
        Self { ok: 1i32.to_be_bytes(), session_id: session_id.to_be_bytes() }
    }

    /// Builds a rejected resume response (unknown or stale session id).
    #[must_use]
    pub fn rejected() -> Self {
        Self { ok: 0i32.to_be_bytes(), session_id: [0; 8] }
    }

    /// Whether the resume attempt succeeded.
    #[must_use]
    pub fn ok(&self) -> bool {
        i32::from_be_bytes(self.ok) != 0
    }

    /// The session id, meaningful only when [`Self::ok`] is true.
    #[must_use]
    pub fn session_id(&self) -> u64 {
        u64::from_be_bytes(self.session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_resp_round_trip() {
        let resp = LoginResp::new(true);
        assert!(resp.ok());
        assert_eq!(LoginResp::ref_from_bytes(resp.as_bytes()).unwrap().ok(), true);
    }

    #[test]
    fn resume_resp_accepted_carries_session_id() {
        let resp = ResumeResp::accepted(0xDEAD_BEEF);
        assert!(resp.ok());
        assert_eq!(resp.session_id(), 0xDEAD_BEEF);
    }

    #[test]
    fn resume_resp_rejected_has_zero_session_id() {
        let resp = ResumeResp::rejected();
        assert!(!resp.ok());
        assert_eq!(resp.session_id(), 0);
    }
}
