//! Environment abstraction for deterministic testing.
//!
//! Decouples engine logic from system resources (time, randomness) so the
//! match engine and session store can be driven deterministically in tests,
//! while production code uses real system time and entropy.

use std::time::Duration;

/// Abstract environment providing time and randomness.
///
/// # Invariants
///
/// Implementations MUST guarantee:
/// - `now()` never goes backwards within a single execution context.
/// - `random_bytes()` uses cryptographically secure entropy in production.
pub trait Environment: Clone + Send + Sync + 'static {
    /// The specific instant type this environment uses.
    type Instant: Copy + Ord + Send + Sync + std::ops::Sub<Output = Duration>;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Current wall-clock time, as seconds since the Unix epoch.
    ///
    /// Used for session `last_seen` timestamps, which must survive across
    /// `Instant`-incompatible process boundaries in the reference design;
    /// kept here even though this implementation stays in-process, since it
    /// is the natural unit for a "last seen" field callers may want to log.
    fn wall_clock_secs(&self) -> u64;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Uses cryptographically secure randomness in production.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_util {
    //! A deterministic [`Environment`] for unit and property tests.

    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use super::Environment;

    /// Deterministic environment: a virtual clock plus a seeded RNG, both
    /// shared behind a mutex so clones observe the same advancing state.
    #[derive(Clone)]
    pub struct TestEnv {
        inner: Arc<Mutex<Inner>>,
    }

    struct Inner {
        elapsed: Duration,
        rng: ChaCha8Rng,
    }

    impl TestEnv {
        /// Builds a test environment seeded deterministically.
        #[must_use]
        pub fn new(seed: u64) -> Self {
            Self { inner: Arc::new(Mutex::new(Inner { elapsed: Duration::ZERO, rng: ChaCha8Rng::seed_from_u64(seed) })) }
        }

        /// Advances the virtual clock by `duration`.
        pub fn advance(&self, duration: Duration) {
            #[allow(clippy::expect_used)]
            let mut inner = self.inner.lock().expect("test env mutex poisoned");
            inner.elapsed += duration;
        }
    }

    impl Environment for TestEnv {
        type Instant = Duration;

        fn now(&self) -> Self::Instant {
            #[allow(clippy::expect_used)]
            let inner = self.inner.lock().expect("test env mutex poisoned");
            inner.elapsed
        }

        fn wall_clock_secs(&self) -> u64 {
            self.now().as_secs()
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            #[allow(clippy::expect_used)]
            let mut inner = self.inner.lock().expect("test env mutex poisoned");
            inner.rng.fill_bytes(buffer);
        }
    }
}
