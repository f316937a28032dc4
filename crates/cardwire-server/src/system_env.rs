//! Production [`Environment`] backed by real system time and OS entropy.

use cardwire_core::Environment;

/// The production environment: `std::time::Instant` for monotonic time,
/// `getrandom` for cryptographic randomness.
#[derive(Clone, Default)]
pub struct SystemEnv;

impl Environment for SystemEnv {
    type Instant = std::time::Instant;

    #[allow(clippy::disallowed_methods)]
    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn wall_clock_secs(&self) -> u64 {
        #[allow(clippy::expect_used)]
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system clock is before the Unix epoch")
            .as_secs()
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        #[allow(clippy::expect_used)]
        getrandom::fill(buffer).expect("OS entropy source unavailable");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_advances() {
        let env = SystemEnv;
        let first = env.now();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let second = env.now();
        assert!(second > first);
    }

    #[test]
    fn random_bytes_fills_buffer() {
        let env = SystemEnv;
        let mut buf = [0u8; 32];
        env.random_bytes(&mut buf);
        assert!(buf.iter().any(|&b| b != 0), "buffer should not be all zero");
    }

    #[test]
    fn wall_clock_is_plausible() {
        let env = SystemEnv;
        // Any time after this crate was written.
        assert!(env.wall_clock_secs() > 1_700_000_000);
    }
}
