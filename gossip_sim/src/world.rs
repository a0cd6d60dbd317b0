//! SimWorld - The simulation harness container.

use crate::context::SimContext;
use crate::error::SimError;

use gossip_core::{GossipMessage, GossipProtocol, NodeState};
use std::time::Duration;

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Master seed for determinism
    pub seed: u64,

    /// Number of nodes in the complete graph
    pub num_nodes: usize,

    /// Round limit for scenarios that wait for convergence
    pub max_rounds: u64,

    /// Peer selections drawn by the randomness scenario
    pub samples: usize,

    /// Virtual time between rounds
    pub round_interval_ms: u64,

    /// Radius of the cosmetic circle layout
    pub layout_radius: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            num_nodes: 10,
            max_rounds: 100,
            samples: 1000,
            round_interval_ms: 100,
            layout_radius: 100.0,
        }
    }
}

/// A protocol instance wired to a seeded `SimContext`.
pub struct SimWorld {
    /// Configuration
    pub config: SimConfig,

    /// Shared simulation context (virtual clock + RNG)
    pub context: SimContext,

    /// The engine under test
    protocol: GossipProtocol<SimContext, SimContext>,
}

impl SimWorld {
    /// Creates a world with `config.num_nodes` Red nodes laid out on a circle.
    pub fn new(config: SimConfig) -> Self {
        let context = SimContext::new(config.seed);

        let mut protocol = GossipProtocol::with_selector(context.clone()).with_clock(context.clone());
        protocol.initialize(config.num_nodes);
        protocol.apply_circle_layout(config.layout_radius);

        Self {
            config,
            context,
            protocol,
        }
    }

    /// Seeds a node with a state, without touching its round marker.
    pub fn seed_node(&mut self, id: &str, state: NodeState) -> Result<(), SimError> {
        self.protocol.set_node_state(id, state, None)?;
        Ok(())
    }

    /// Advances virtual time by one interval and executes a round.
    pub fn tick(&mut self) -> Vec<GossipMessage> {
        self.context
            .advance_time(Duration::from_millis(self.config.round_interval_ms));
        self.protocol.execute_round()
    }

    /// Deliveries that changed their target's state in the most recent round.
    pub fn changed_last_round(&self) -> usize {
        self.protocol.last_round_changes()
    }

    pub fn protocol(&self) -> &GossipProtocol<SimContext, SimContext> {
        &self.protocol
    }

    pub fn protocol_mut(&mut self) -> &mut GossipProtocol<SimContext, SimContext> {
        &mut self.protocol
    }

    /// Returns the current round.
    pub fn round(&self) -> u64 {
        self.protocol.current_round()
    }

    /// Returns the current simulation time in seconds.
    pub fn time(&self) -> f64 {
        self.context.elapsed().as_secs_f64()
    }
}
