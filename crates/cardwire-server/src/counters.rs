//! Two monotonic counters exposed to external observers: total connections
//! accepted and total frames successfully decoded.

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide connection/packet counters.
///
/// The only external reader (a monitoring collaborator, out of scope here)
/// performs unsynchronized loads; `Ordering::Relaxed` is sufficient on both
/// sides because the values are informational, not used to order other
/// memory operations.
#[derive(Default)]
pub struct Counters {
    connections: AtomicU64,
    packets: AtomicU64,
}

impl Counters {
    /// Builds zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the connection counter. Call once per accepted socket.
    pub fn record_connection(&self) {
        self.connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the packet counter. Call once per successfully decoded
    /// inbound frame.
    pub fn record_packet(&self) {
        self.packets.fetch_add(1, Ordering::Relaxed);
    }

    /// Total connections accepted since start.
    #[must_use]
    pub fn connections(&self) -> u64 {
        self.connections.load(Ordering::Relaxed)
    }

    /// Total frames successfully decoded since start.
    #[must_use]
    pub fn packets(&self) -> u64 {
        self.packets.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let counters = Counters::new();
        assert_eq!(counters.connections(), 0);
        assert_eq!(counters.packets(), 0);
    }

    #[test]
    fn increments_independently() {
        let counters = Counters::new();
        counters.record_connection();
        counters.record_connection();
        counters.record_packet();
        assert_eq!(counters.connections(), 2);
        assert_eq!(counters.packets(), 1);
    }
}
