//! The session store: a fixed-capacity, in-process registry of
//! session id -> (match state, hand, last-seen).
//!
//! The reference design backs this with a shared-memory region so it
//! survives the death of the worker process that owns a session. Rust's
//! task-per-connection model makes that unnecessary here: every worker
//! task shares one `Arc<SessionStore>`, so a connection task dying (panic,
//! drop, client disconnect) never takes the session with it — resumption
//! works the same way, just without the cross-process plumbing.

use std::sync::Mutex;

use cardwire_core::{Environment, Hand, MatchState};

/// Fixed slot capacity, per spec.
pub const CAPACITY: usize = 64;

/// Errors returned by store operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No slot matched the given session id.
    #[error("session {0} not found")]
    NotFound(u64),
}

#[derive(Clone)]
struct Slot {
    id: u64,
    last_seen: u64,
    state: MatchState,
    hand: Hand,
}

/// Fixed-capacity session registry, shared across connection workers.
pub struct SessionStore {
    slots: Mutex<Vec<Option<Slot>>>,
}

impl SessionStore {
    /// Builds an empty store with `CAPACITY` slots, all unallocated.
    #[must_use]
    pub fn new() -> Self {
        Self { slots: Mutex::new(vec![None; CAPACITY]) }
    }

    /// Reserves a slot and returns a fresh, non-zero, unpredictable session
    /// id. Returns `None` if every slot is occupied.
    ///
    /// The new session starts with a default (just-constructed) match
    /// state and an empty hand; callers are expected to follow with
    /// [`Self::save`] once the match has been entered into its opening
    /// turn.
    pub fn allocate(&self, env: &impl Environment) -> Option<u64> {
        #[allow(clippy::expect_used)]
        let mut slots = self.slots.lock().expect("session store mutex poisoned");

        let free_idx = slots.iter().position(Option::is_none)?;

        let id = Self::generate_unique_id(&slots, env)?;
        slots[free_idx] = Some(Slot { id, last_seen: env.wall_clock_secs(), state: MatchState::new(), hand: Hand::default() });
        Some(id)
    }

    fn generate_unique_id(slots: &[Option<Slot>], env: &impl Environment) -> Option<u64> {
        const MAX_ATTEMPTS: u32 = 16;
        for _ in 0..MAX_ATTEMPTS {
            let candidate = generate_session_id(env);
            let collides = slots.iter().flatten().any(|slot| slot.id == candidate);
            if !collides {
                return Some(candidate);
            }
        }
        None
    }

    /// Overwrites the state and hand for `id`, bumping its last-seen time.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if no slot holds `id`.
    pub fn save(&self, id: u64, state: MatchState, hand: Hand, env: &impl Environment) -> Result<(), StoreError> {
        #[allow(clippy::expect_used)]
        let mut slots = self.slots.lock().expect("session store mutex poisoned");
        let slot = slots.iter_mut().flatten().find(|slot| slot.id == id).ok_or(StoreError::NotFound(id))?;
        slot.state = state;
        slot.hand = hand;
        slot.last_seen = env.wall_clock_secs();
        Ok(())
    }

    /// Returns a copy of the state and hand stored for `id`, bumping its
    /// last-seen time on a hit.
    pub fn load(&self, id: u64, env: &impl Environment) -> Option<(MatchState, Hand)> {
        #[allow(clippy::expect_used)]
        let mut slots = self.slots.lock().expect("session store mutex poisoned");
        let slot = slots.iter_mut().flatten().find(|slot| slot.id == id)?;
        slot.last_seen = env.wall_clock_secs();
        Some((slot.state, slot.hand))
    }

    /// Updates last-seen only, without touching state or hand.
    pub fn touch(&self, id: u64, env: &impl Environment) {
        #[allow(clippy::expect_used)]
        let mut slots = self.slots.lock().expect("session store mutex poisoned");
        if let Some(slot) = slots.iter_mut().flatten().find(|slot| slot.id == id) {
            slot.last_seen = env.wall_clock_secs();
        }
    }

    /// Number of slots currently allocated. Test/diagnostic use.
    #[must_use]
    pub fn allocated_count(&self) -> usize {
        #[allow(clippy::expect_used)]
        let slots = self.slots.lock().expect("session store mutex poisoned");
        slots.iter().flatten().count()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_session_id(env: &impl Environment) -> u64 {
    loop {
        let clock = env.wall_clock_secs();
        let entropy = env.random_u64();
        let id = clock ^ entropy.rotate_left(17) ^ (entropy >> 3);
        if id != 0 {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardwire_core::env::test_util::TestEnv;

    #[test]
    fn allocate_returns_nonzero_id() {
        let store = SessionStore::new();
        let env = TestEnv::new(1);
        let id = store.allocate(&env).expect("should allocate");
        assert_ne!(id, 0);
    }

    #[test]
    fn allocate_fails_once_full() {
        let store = SessionStore::new();
        let env = TestEnv::new(2);
        for _ in 0..CAPACITY {
            store.allocate(&env).expect("should allocate while capacity remains");
        }
        assert_eq!(store.allocate(&env), None);
    }

    #[test]
    fn distinct_slots_get_distinct_ids() {
        let store = SessionStore::new();
        let env = TestEnv::new(3);
        let mut ids = std::collections::HashSet::new();
        for _ in 0..CAPACITY {
            let id = store.allocate(&env).expect("should allocate");
            assert!(ids.insert(id), "duplicate session id allocated");
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let store = SessionStore::new();
        let env = TestEnv::new(4);
        let id = store.allocate(&env).expect("should allocate");

        let mut state = MatchState::new();
        state.player.hp = 17;
        let hand = Hand::default();

        store.save(id, state, hand, &env).expect("should save");
        let (loaded_state, _loaded_hand) = store.load(id, &env).expect("should load");
        assert_eq!(loaded_state.player.hp, 17);
    }

    #[test]
    fn load_unknown_id_is_none() {
        let store = SessionStore::new();
        let env = TestEnv::new(5);
        assert!(store.load(0xDEAD_BEEF, &env).is_none());
    }

    #[test]
    fn save_unknown_id_is_not_found() {
        let store = SessionStore::new();
        let env = TestEnv::new(6);
        let result = store.save(0xDEAD_BEEF, MatchState::new(), Hand::default(), &env);
        assert_eq!(result, Err(StoreError::NotFound(0xDEAD_BEEF)));
    }

    #[test]
    fn touch_does_not_change_state() {
        let store = SessionStore::new();
        let env = TestEnv::new(7);
        let id = store.allocate(&env).expect("should allocate");
        store.touch(id, &env);
        let (state, _hand) = store.load(id, &env).expect("should load");
        assert_eq!(state.player.hp, cardwire_core::engine::INITIAL_HP);
    }
}
