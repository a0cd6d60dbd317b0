//! Wall-clock source for message timestamps.

use std::time::{SystemTime, UNIX_EPOCH};

/// Supplies the advisory timestamp stamped on outgoing gossip messages.
///
/// Protocol logic never reads the value back; it exists for consumers that
/// display or log message timing.
pub trait Clock: Send {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}

/// Production clock backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new system clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        // A clock set before the epoch reports 0
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock::new();
        let t1 = clock.now_millis();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let t2 = clock.now_millis();

        assert!(t1 > 0);
        assert!(t2 >= t1);
    }
}
