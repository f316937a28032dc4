//! The authoritative match state machine and effect resolver.
//!
//! Mirrors the phase diagram from the design: `start -> enter_turn(player)
//! -> DRAW -> MAIN -> END -> enter_turn(other side)`, terminating whenever
//! either actor's HP reaches zero.

use crate::catalog::{self, CardKind};
use crate::env::Environment;
use crate::errors::EngineError;

/// Number of lines kept in the ring log embedded in [`MatchState`].
pub const LOG_LINES: usize = 6;
/// Length of each log line, in bytes.
pub const LOG_LINE_LEN: usize = 64;
/// Starting and maximum HP for both actors.
pub const INITIAL_HP: i16 = 30;
/// Hand capacity (fixed slot count, only 3 are dealt per turn).
pub const HAND_CAPACITY: usize = 8;
/// Number of cards dealt at the start of each turn.
pub const CARDS_PER_HAND: usize = 3;
/// Damage poison deals per tick.
pub const POISON_DAMAGE: i16 = 2;

/// Which side a turn or actor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The human player.
    Player,
    /// The scripted opponent.
    Opponent,
}

impl Side {
    /// The other side.
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Player => Self::Opponent,
            Self::Opponent => Self::Player,
        }
    }
}

/// One of the three phases within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Mana refills and a fresh hand is dealt.
    Draw,
    /// The turn owner may play cards.
    Main,
    /// Poison ticks for both sides and game-over is checked.
    End,
}

/// The match's outcome once `game_over` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    /// No winner (simultaneous knockout).
    None,
    /// The player won.
    Player,
    /// The opponent won.
    Opponent,
}

/// Per-side combat stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Current hit points, in `[0, INITIAL_HP]`.
    pub hp: i16,
    /// Damage-absorbing pool, reduced before HP on incoming damage.
    pub shield: i16,
    /// Bonus damage added to this side's next ATK, then consumed.
    pub buff: i16,
    /// Remaining poison turns; ticks for 2 HP at END while positive.
    pub poison: u8,
}

impl Default for Actor {
    fn default() -> Self {
        Self { hp: INITIAL_HP, shield: 0, buff: 0, poison: 0 }
    }
}

/// A turn owner's playable card slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hand {
    /// Number of occupied slots.
    pub n: u8,
    /// Card id in each slot; 0 means empty/consumed.
    pub card_ids: [u16; HAND_CAPACITY],
}

impl Default for Hand {
    fn default() -> Self {
        Self { n: 0, card_ids: [0; HAND_CAPACITY] }
    }
}

/// A fixed-capacity ring of short log lines, embedded in [`MatchState`] so
/// the wire `STATE` payload stays a fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRing {
    lines: [[u8; LOG_LINE_LEN]; LOG_LINES],
    head: u8,
}

impl Default for LogRing {
    fn default() -> Self {
        Self { lines: [[0; LOG_LINE_LEN]; LOG_LINES], head: 0 }
    }
}

impl LogRing {
    /// Appends a line, truncating to fit and overwriting the oldest entry.
    pub fn push(&mut self, text: &str) {
        let idx = self.head as usize % LOG_LINES;
        let mut line = [0u8; LOG_LINE_LEN];
        let bytes = text.as_bytes();
        let n = bytes.len().min(LOG_LINE_LEN);
        line[..n].copy_from_slice(&bytes[..n]);
        self.lines[idx] = line;
        self.head = self.head.wrapping_add(1);
    }

    /// The raw lines, in storage (not chronological) order.
    #[must_use]
    pub fn lines(&self) -> [[u8; LOG_LINE_LEN]; LOG_LINES] {
        self.lines
    }

    /// Index the next write will land on.
    #[must_use]
    pub fn head(&self) -> u8 {
        self.head % LOG_LINES as u8
    }
}

/// The full authoritative state of one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchState {
    /// The human player's stats.
    pub player: Actor,
    /// The scripted opponent's stats.
    pub opponent: Actor,
    /// Whose turn it currently is.
    pub turn: Side,
    /// Current phase within that turn.
    pub phase: Phase,
    /// Mana available to the turn owner right now.
    pub mana: u8,
    /// Mana refilled at each DRAW.
    pub max_mana: u8,
    /// Set once either actor's HP reaches zero; freezes the machine.
    pub game_over: bool,
    /// Meaningful only once `game_over` is set.
    pub winner: Winner,
    /// Ring of recent effect/event descriptions.
    pub log: LogRing,
}

impl MatchState {
    /// Default starting max mana.
    pub const DEFAULT_MAX_MANA: u8 = 3;

    /// A fresh match: both actors at full HP, no turn yet entered.
    ///
    /// Callers must follow this with [`enter_turn`] for [`Side::Player`] to
    /// reach a playable state (DRAW dealt, phase MAIN).
    #[must_use]
    pub fn new() -> Self {
        Self {
            player: Actor::default(),
            opponent: Actor::default(),
            turn: Side::Player,
            phase: Phase::Draw,
            mana: 0,
            max_mana: Self::DEFAULT_MAX_MANA,
            game_over: false,
            winner: Winner::None,
            log: LogRing::default(),
        }
    }

    /// The actor on the given side.
    #[must_use]
    pub fn actor(&self, side: Side) -> &Actor {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    fn actor_mut(&mut self, side: Side) -> &mut Actor {
        match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        }
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

/// Deals a fresh hand: 3 cards sampled uniformly with replacement from the
/// playable pool, remaining slots zeroed. The RNG must be seeded per
/// session (see [`Environment`]); never share one generator across matches.
pub fn deal_hand(hand: &mut Hand, env: &impl Environment) {
    hand.n = CARDS_PER_HAND as u8;
    for i in 0..HAND_CAPACITY {
        hand.card_ids[i] = if i < CARDS_PER_HAND {
            let idx = (env.random_u64() % catalog::PLAYABLE_POOL.len() as u64) as usize;
            catalog::PLAYABLE_POOL[idx]
        } else {
            0
        };
    }
}

/// Enters DRAW for `side`: refills mana, deals a fresh hand, then
/// transitions straight to MAIN (DRAW never waits for input).
pub fn enter_turn(state: &mut MatchState, hand: &mut Hand, env: &impl Environment, side: Side) {
    state.turn = side;
    state.phase = Phase::Draw;
    state.mana = state.max_mana;
    deal_hand(hand, env);
    state.phase = Phase::Main;
}

fn apply_damage(target: &mut Actor, dmg: i16) {
    let absorbed = target.shield.min(dmg);
    target.shield -= absorbed;
    let remainder = dmg - absorbed;
    target.hp = (target.hp - remainder).max(0);
}

fn check_game_over(state: &mut MatchState) {
    if state.game_over {
        return;
    }
    if state.player.hp <= 0 || state.opponent.hp <= 0 {
        state.game_over = true;
        state.winner = match state.player.hp.cmp(&state.opponent.hp) {
            std::cmp::Ordering::Greater => Winner::Player,
            std::cmp::Ordering::Less => Winner::Opponent,
            std::cmp::Ordering::Equal => Winner::None,
        };
    }
}

/// Plays hand slot `idx` on behalf of `side`, resolving its effect.
///
/// Validates turn ownership, phase, slot occupancy, card validity, and
/// mana, deducts cost, dispatches the effect, logs it, checks for
/// game-over, and marks the slot consumed — steps 1-8 of the resolver.
///
/// # Errors
///
/// Returns the specific [`EngineError`] for whichever validation step
/// failed first.
pub fn play_card(state: &mut MatchState, hand: &mut Hand, side: Side, idx: usize) -> Result<(), EngineError> {
    if state.turn != side {
        return Err(EngineError::NotYourTurn);
    }
    if state.phase != Phase::Main {
        return Err(EngineError::WrongPhase);
    }
    if idx >= hand.n as usize || idx >= HAND_CAPACITY {
        return Err(EngineError::InvalidIndex);
    }
    let card_id = hand.card_ids[idx];
    if card_id == 0 {
        return Err(EngineError::InvalidIndex);
    }
    let def = catalog::lookup(card_id).ok_or(EngineError::InvalidCard)?;
    if def.cost > state.mana {
        return Err(EngineError::InsufficientMana);
    }
    state.mana -= def.cost;

    let other = side.other();
    match def.kind {
        CardKind::Atk => {
            let buff = state.actor(side).buff;
            let damage = def.value + buff;
            state.actor_mut(side).buff = 0;
            apply_damage(state.actor_mut(other), damage);
        }
        CardKind::Heal => {
            state.actor_mut(side).hp += def.value;
        }
        CardKind::Shield => {
            state.actor_mut(side).shield += def.value;
        }
        CardKind::Buff => {
            state.actor_mut(side).buff += def.value;
        }
        CardKind::Poison => {
            state.actor_mut(other).poison = state.actor_mut(other).poison.saturating_add(def.value as u8);
        }
    }

    let actor_name = match side {
        Side::Player => "player",
        Side::Opponent => "ai",
    };
    state.log.push(&format!("{actor_name} played {} (mana {})", def.name, state.mana));

    check_game_over(state);
    hand.card_ids[idx] = 0;
    Ok(())
}

fn tick_poison(actor: &mut Actor, log: &mut LogRing, label: &str) {
    if actor.poison > 0 {
        actor.poison -= 1;
        actor.hp = (actor.hp - POISON_DAMAGE).max(0);
        log.push(&format!("{label} takes poison damage ({} HP)", actor.hp));
    }
}

/// Runs the END phase: ticks poison for both sides, checks game-over, and
/// if the match continues, enters the other side's turn.
pub fn end_phase(state: &mut MatchState, hand: &mut Hand, env: &impl Environment) {
    state.phase = Phase::End;

    tick_poison(&mut state.player, &mut state.log, "player");
    tick_poison(&mut state.opponent, &mut state.log, "ai");

    check_game_over(state);

    if !state.game_over {
        let next = state.turn.other();
        enter_turn(state, hand, env, next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::test_util::TestEnv;

    fn fresh() -> (MatchState, Hand, TestEnv) {
        let env = TestEnv::new(1);
        let mut state = MatchState::new();
        let mut hand = Hand::default();
        enter_turn(&mut state, &mut hand, &env, Side::Player);
        (state, hand, env)
    }

    #[test]
    fn enter_turn_deals_three_cards_and_refills_mana() {
        let (state, hand, _env) = fresh();
        assert_eq!(state.phase, Phase::Main);
        assert_eq!(state.mana, MatchState::DEFAULT_MAX_MANA);
        assert_eq!(hand.n, 3);
        assert!(hand.card_ids[3..].iter().all(|&id| id == 0));
    }

    #[test]
    fn playing_slash_deals_damage_and_consumes_mana() {
        let (mut state, mut hand, _env) = fresh();
        hand.card_ids[0] = 100; // Slash: cost 1, value 3
        hand.n = 1;

        play_card(&mut state, &mut hand, Side::Player, 0).expect("should play");

        assert_eq!(state.opponent.hp, INITIAL_HP - 3);
        assert_eq!(state.mana, MatchState::DEFAULT_MAX_MANA - 1);
        assert_eq!(hand.card_ids[0], 0);
    }

    #[test]
    fn insufficient_mana_is_rejected_without_mutation() {
        let (mut state, mut hand, _env) = fresh();
        state.mana = 0;
        hand.card_ids[0] = 100;
        hand.n = 1;

        let result = play_card(&mut state, &mut hand, Side::Player, 0);
        assert_eq!(result, Err(EngineError::InsufficientMana));
        assert_eq!(state.opponent.hp, INITIAL_HP);
        assert_eq!(hand.card_ids[0], 100);
    }

    #[test]
    fn shield_absorbs_before_hp() {
        let (mut state, mut hand, _env) = fresh();
        state.opponent.shield = 2;
        hand.card_ids[0] = 100; // Slash: value 3
        hand.n = 1;

        play_card(&mut state, &mut hand, Side::Player, 0).expect("should play");

        assert_eq!(state.opponent.shield, 0);
        assert_eq!(state.opponent.hp, INITIAL_HP - 1);
    }

    #[test]
    fn buff_is_consumed_by_next_attack() {
        let (mut state, mut hand, _env) = fresh();
        hand.card_ids[0] = 400; // Sharpen: buff +2
        hand.card_ids[1] = 100; // Slash: value 3
        hand.n = 2;

        play_card(&mut state, &mut hand, Side::Player, 0).expect("should play");
        assert_eq!(state.player.buff, 2);

        play_card(&mut state, &mut hand, Side::Player, 1).expect("should play");
        assert_eq!(state.player.buff, 0);
        assert_eq!(state.opponent.hp, INITIAL_HP - 5);
    }

    #[test]
    fn wrong_turn_is_rejected() {
        let (mut state, mut hand, _env) = fresh();
        hand.card_ids[0] = 100;
        hand.n = 1;
        let result = play_card(&mut state, &mut hand, Side::Opponent, 0);
        assert_eq!(result, Err(EngineError::NotYourTurn));
    }

    #[test]
    fn consumed_slot_is_zeroed_until_redeal() {
        let (mut state, mut hand, env) = fresh();
        hand.card_ids[0] = 100;
        hand.n = 1;
        play_card(&mut state, &mut hand, Side::Player, 0).expect("should play");
        assert_eq!(hand.card_ids[0], 0);

        end_phase(&mut state, &mut hand, &env);
        if !state.game_over {
            // next DRAW (for whichever side it lands on) redeals the hand.
            assert_eq!(hand.n, 3);
        }
    }

    #[test]
    fn lethal_damage_sets_game_over_and_winner() {
        let (mut state, mut hand, _env) = fresh();
        state.opponent.hp = 3;
        hand.card_ids[0] = 100; // Slash: value 3
        hand.n = 1;

        play_card(&mut state, &mut hand, Side::Player, 0).expect("should play");

        assert!(state.game_over);
        assert_eq!(state.winner, Winner::Player);
        assert_eq!(state.opponent.hp, 0);
    }

    #[test]
    fn poison_ticks_at_end_phase() {
        let (mut state, mut hand, env) = fresh();
        state.opponent.poison = 2;

        end_phase(&mut state, &mut hand, &env);

        assert_eq!(state.opponent.poison, 1);
        assert_eq!(state.opponent.hp, INITIAL_HP - POISON_DAMAGE);
    }
}
