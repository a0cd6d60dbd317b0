//! Gossip Environment Abstraction Layer
//!
//! This crate holds the seams through which the gossip engine touches
//! anything non-deterministic:
//! - Randomness (`IndexSelector::select_index()`)
//! - Wall-clock time (`Clock::now_millis()`)
//!
//! The engine in `gossip_core` is generic over both, so the same round logic
//! runs against true randomness in production, a scripted selector in unit
//! tests, and a seeded RNG in the `gossip_sim` harness.
//!
//! # Example
//!
//! ```
//! use gossip_env::{IndexSelector, ScriptedIndexSelector};
//!
//! let mut selector = ScriptedIndexSelector::new(vec![2, 0]);
//! assert_eq!(selector.select_index(3), Some(2));
//! assert_eq!(selector.select_index(3), Some(0));
//! assert_eq!(selector.select_index(0), None);
//! ```

mod clock;
mod selector;

pub use clock::{Clock, SystemClock};
pub use selector::{IndexSelector, RandomIndexSelector, ScriptedIndexSelector};
