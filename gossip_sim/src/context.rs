//! Simulation context: seeded peer selection and a virtual clock.

use gossip_env::{Clock, IndexSelector};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Virtual time 0 maps to 2024-01-01 00:00:00 UTC.
const EPOCH_MS: u64 = 1_704_067_200_000;

/// Deterministic environment for a simulation run.
///
/// Implements both seams the engine consumes:
/// - `IndexSelector` from a ChaCha8 RNG seeded with the master seed
/// - `Clock` from a virtual clock advanced only by the harness
///
/// Clones share the RNG and the clock, so the protocol can own one clone
/// while the harness keeps another to advance time.
pub struct SimContext {
    /// Master seed for this simulation
    seed: u64,

    /// Current virtual time (milliseconds since simulation start)
    virtual_time_ms: Arc<Mutex<u64>>,

    /// Deterministic RNG for peer selection
    rng: Arc<Mutex<ChaCha8Rng>>,
}

impl SimContext {
    /// Creates a new SimContext with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            virtual_time_ms: Arc::new(Mutex::new(0)),
            rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
        }
    }

    /// Returns the master seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        *lock(&self.virtual_time_ms) += duration.as_millis() as u64;
    }

    /// Returns virtual time elapsed since the start of the run.
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(*lock(&self.virtual_time_ms))
    }
}

impl Clone for SimContext {
    fn clone(&self) -> Self {
        Self {
            seed: self.seed,
            virtual_time_ms: Arc::clone(&self.virtual_time_ms),
            rng: Arc::clone(&self.rng),
        }
    }
}

impl IndexSelector for SimContext {
    fn select_index(&mut self, length: usize) -> Option<usize> {
        if length == 0 {
            return None;
        }
        Some(lock(&self.rng).gen_range(0..length))
    }
}

impl Clock for SimContext {
    fn now_millis(&self) -> u64 {
        EPOCH_MS + *lock(&self.virtual_time_ms)
    }
}

// The harness is single-threaded; a poisoned lock still holds valid data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
