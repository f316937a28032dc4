//! The `STATE` payload: a packed snapshot of one match.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Number of lines in the embedded log ring.
pub const LOG_LINES: usize = 6;
/// Length of each log line, in bytes.
pub const LOG_LINE_LEN: usize = 64;

/// Per-side combat stats embedded twice in [`StatePayload`] (player, then
/// opponent).
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct ActorRecord {
    hp: [u8; 2],
    shield: [u8; 2],
    buff: [u8; 2],
    poison: u8,
}

impl ActorRecord {
    /// Size on the wire.
    pub const SIZE: usize = 7;

    /// Builds a record from its logical fields.
    #[must_use]
    pub fn new(hp: i16, shield: i16, buff: i16, poison: u8) -> Self {
        Self { hp: hp.to_be_bytes(), shield: shield.to_be_bytes(), buff: buff.to_be_bytes(), poison }
    }

    /// Current hit points.
    #[must_use]
    pub fn hp(&self) -> i16 {
        i16::from_be_bytes(self.hp)
    }

    /// Current shield pool.
    #[must_use]
    pub fn shield(&self) -> i16 {
        i16::from_be_bytes(self.shield)
    }

    /// Pending next-attack buff.
    #[must_use]
    pub fn buff(&self) -> i16 {
        i16::from_be_bytes(self.buff)
    }

    /// Remaining poison turns.
    #[must_use]
    pub fn poison(&self) -> u8 {
        self.poison
    }
}

/// `STATE` payload: the full authoritative match snapshot.
#[repr(C, packed)]
#[derive(Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct StatePayload {
    player: ActorRecord,
    opponent: ActorRecord,
    turn: u8,
    phase: u8,
    mana: u8,
    max_mana: u8,
    game_over: u8,
    winner: u8,
    log_head: u8,
    logs: [[u8; LOG_LINE_LEN]; LOG_LINES],
}

impl StatePayload {
    /// Size on the wire.
    pub const SIZE: usize = ActorRecord::SIZE * 2 + 7 + LOG_LINE_LEN * LOG_LINES;

    /// Builds a state payload from its logical fields.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        player: ActorRecord,
        opponent: ActorRecord,
        turn: u8,
        phase: u8,
        mana: u8,
        max_mana: u8,
        game_over: bool,
        winner: u8,
        log_head: u8,
        logs: [[u8; LOG_LINE_LEN]; LOG_LINES],
    ) -> Self {
        Self { player, opponent, turn, phase, mana, max_mana, game_over: u8::from(game_over), winner, log_head, logs }
    }

    /// The player's stats.
    #[must_use]
    pub fn player(&self) -> ActorRecord {
        self.player
    }

    /// The opponent's stats.
    #[must_use]
    pub fn opponent(&self) -> ActorRecord {
        self.opponent
    }

    /// Whose turn it currently is: 0 = player, 1 = opponent.
    #[must_use]
    pub fn turn(&self) -> u8 {
        self.turn
    }

    /// Current phase: 0 = DRAW, 1 = MAIN, 2 = END.
    #[must_use]
    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// Current mana available to the turn owner.
    #[must_use]
    pub fn mana(&self) -> u8 {
        self.mana
    }

    /// Maximum mana refilled at DRAW.
    #[must_use]
    pub fn max_mana(&self) -> u8 {
        self.max_mana
    }

    /// Whether the match has concluded.
    #[must_use]
    pub fn game_over(&self) -> bool {
        self.game_over != 0
    }

    /// Winner: 0 = none, 1 = player, 2 = opponent.
    #[must_use]
    pub fn winner(&self) -> u8 {
        self.winner
    }

    /// Index of the next slot the ring log will write to.
    #[must_use]
    pub fn log_head(&self) -> u8 {
        self.log_head
    }

    /// Raw log lines, oldest-to-newest is not guaranteed; use `log_head` to
    /// find the write cursor.
    #[must_use]
    pub fn logs(&self) -> [[u8; LOG_LINE_LEN]; LOG_LINES] {
        self.logs
    }
}

impl std::fmt::Debug for StatePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatePayload")
            .field("player", &self.player())
            .field("opponent", &self.opponent())
            .field("turn", &self.turn())
            .field("phase", &self.phase())
            .field("mana", &self.mana())
            .field("max_mana", &self.max_mana())
            .field("game_over", &self.game_over())
            .field("winner", &self.winner())
            .finish_non_exhaustive()
    }
}

impl PartialEq for StatePayload {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for StatePayload {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_matches_field_layout() {
        assert_eq!(std::mem::size_of::<StatePayload>(), StatePayload::SIZE);
    }

    #[test]
    fn actor_record_round_trip() {
        let actor = ActorRecord::new(-5, 3, 7, 2);
        assert_eq!(actor.hp(), -5);
        assert_eq!(actor.shield(), 3);
        assert_eq!(actor.buff(), 7);
        assert_eq!(actor.poison(), 2);
    }

    #[test]
    fn state_payload_round_trip() {
        let player = ActorRecord::new(30, 0, 0, 0);
        let opponent = ActorRecord::new(27, 0, 0, 1);
        let state = StatePayload::new(player, opponent, 0, 1, 2, 3, false, 0, 1, [[0u8; LOG_LINE_LEN]; LOG_LINES]);

        let bytes = state.as_bytes();
        let parsed = StatePayload::ref_from_bytes(bytes).expect("should parse");
        assert_eq!(state, *parsed);
        assert_eq!(parsed.mana(), 2);
        assert_eq!(parsed.opponent().hp(), 27);
    }
}
