//! Converts in-memory match state into the wire `STATE`/`HAND` payloads.

use cardwire_core::{Hand, MatchState, Phase, Side, Winner};
use cardwire_proto::payloads::{ActorRecord, HandPayload, StatePayload};

fn side_code(side: Side) -> u8 {
    match side {
        Side::Player => 0,
        Side::Opponent => 1,
    }
}

fn phase_code(phase: Phase) -> u8 {
    match phase {
        Phase::Draw => 0,
        Phase::Main => 1,
        Phase::End => 2,
    }
}

fn winner_code(winner: Winner) -> u8 {
    match winner {
        Winner::None => 0,
        Winner::Player => 1,
        Winner::Opponent => 2,
    }
}

fn actor_record(actor: cardwire_core::Actor) -> ActorRecord {
    ActorRecord::new(actor.hp, actor.shield, actor.buff, actor.poison)
}

/// Builds the `STATE` payload for the given match state.
#[must_use]
pub fn state_payload(state: &MatchState) -> StatePayload {
    StatePayload::new(
        actor_record(state.player),
        actor_record(state.opponent),
        side_code(state.turn),
        phase_code(state.phase),
        state.mana,
        state.max_mana,
        state.game_over,
        winner_code(state.winner),
        state.log.head(),
        state.log.lines(),
    )
}

/// Builds the `HAND` payload for the given hand.
#[must_use]
pub fn hand_payload(hand: &Hand) -> HandPayload {
    HandPayload::new(hand.n, hand.card_ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_reports_player_turn_and_draw_phase() {
        let state = MatchState::new();
        let payload = state_payload(&state);
        assert_eq!(payload.turn(), 0);
        assert_eq!(payload.phase(), 0);
    }

    #[test]
    fn hand_payload_carries_card_ids() {
        let mut hand = Hand::default();
        hand.n = 2;
        hand.card_ids[0] = 100;
        hand.card_ids[1] = 200;

        let payload = hand_payload(&hand);
        assert_eq!(payload.n(), 2);
        assert_eq!(payload.card_ids()[0], 100);
        assert_eq!(payload.card_ids()[1], 200);
    }
}
