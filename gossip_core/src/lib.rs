//! Gossip Core - Deterministic Epidemic State Propagation
//!
//! A round-based engine for push gossip over a complete graph:
//! 1. **Topology**: `initialize(n)` wires every node to every other node
//! 2. **Rounds**: each active (non-Red) node pushes its state to one random peer
//! 3. **Convergence**: the network is converged when every node holds the same state
//!
//! Randomness and time come in through `gossip_env`, so the same rounds can be
//! replayed exactly with a scripted or seeded selector.

pub mod error;
pub mod layout;
pub mod node;
pub mod protocol;
pub mod stats;
pub mod types;

// Re-export key types for convenience
pub use error::GossipError;
pub use layout::circle_layout;
pub use node::Node;
pub use protocol::GossipProtocol;
pub use stats::{convergence_rate, RoundStats, StateCounts};
pub use types::{node_id, GossipMessage, NodeState, Position};
