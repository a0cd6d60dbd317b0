//! The gossip engine: topology, rounds, and convergence.
//!
//! A round runs in two phases so that every message carries its sender's
//! state as of the start of the round:
//!
//! ```text
//!  generation                         delivery
//!  ┌──────────────────────────┐       ┌───────────────────────────────┐
//!  │ for each active node:    │       │ for each message:             │
//!  │   pick peer (selector)   │ ────► │   target.state != msg.state ? │
//!  │   push {from,to,state}   │       │     overwrite, last_updated   │
//!  └──────────────────────────┘       └───────────────────────────────┘
//!                                             current_round += 1
//! ```
//!
//! Generation never mutates, so a node that receives a new state in
//! delivery cannot forward it until the next round.

use crate::error::GossipError;
use crate::layout::circle_layout;
use crate::node::Node;
use crate::stats::{RoundStats, StateCounts};
use crate::types::{node_id, GossipMessage, NodeState};

use gossip_env::{Clock, IndexSelector, RandomIndexSelector, SystemClock};
use tracing::{debug, trace};

/// Owns the node set and drives synchronous gossip rounds.
///
/// The selector decides *which* peer each active node contacts; it never
/// changes what a round means. The clock only stamps message timestamps.
///
/// Not re-entrant: every mutating method takes `&mut self`, and callers that
/// share a protocol across threads must provide their own locking.
pub struct GossipProtocol<S = RandomIndexSelector, C = SystemClock> {
    /// Nodes in id order (`node-0`, `node-1`, ...)
    nodes: Vec<Node>,

    /// Rounds executed since the last `initialize`/`reset`
    current_round: u64,

    /// Peer selection strategy
    selector: S,

    /// Timestamp source for outgoing messages
    clock: C,

    /// Deliveries that changed their target's state in the latest round
    last_round_changes: usize,
}

impl GossipProtocol {
    /// Creates an empty protocol with random peer selection.
    pub fn new() -> Self {
        Self::with_selector(RandomIndexSelector::new())
    }
}

impl Default for GossipProtocol {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: IndexSelector> GossipProtocol<S, SystemClock> {
    /// Creates an empty protocol using `selector` for peer selection.
    pub fn with_selector(selector: S) -> Self {
        Self {
            nodes: Vec::new(),
            current_round: 0,
            selector,
            clock: SystemClock::new(),
            last_round_changes: 0,
        }
    }
}

impl<S: IndexSelector, C: Clock> GossipProtocol<S, C> {
    /// Replaces the timestamp clock, keeping nodes and round counter.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> GossipProtocol<S, C2> {
        GossipProtocol {
            nodes: self.nodes,
            current_round: self.current_round,
            selector: self.selector,
            clock,
            last_round_changes: self.last_round_changes,
        }
    }

    pub fn selector(&self) -> &S {
        &self.selector
    }

    /// Mutable access to the selector, e.g. to re-script it between rounds.
    pub fn selector_mut(&mut self) -> &mut S {
        &mut self.selector
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Returns a snapshot of every node, in id order.
    pub fn nodes(&self) -> Vec<Node> {
        self.nodes.clone()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn current_round(&self) -> u64 {
        self.current_round
    }

    /// Number of deliveries in the latest round that changed their target's
    /// state. A node flipped twice in one round counts twice.
    pub fn last_round_changes(&self) -> usize {
        self.last_round_changes
    }

    /// Discards the current node set and builds a complete graph of
    /// `node_count` Red nodes named `node-0 .. node-{n-1}`.
    ///
    /// Each node's peers are all other ids in ascending order. Zero nodes
    /// produces an empty topology.
    pub fn initialize(&mut self, node_count: usize) {
        self.current_round = 0;
        self.last_round_changes = 0;
        self.nodes = (0..node_count).map(|i| Node::new(node_id(i))).collect();

        let ids: Vec<String> = self.nodes.iter().map(|node| node.id().to_string()).collect();
        for (i, node) in self.nodes.iter_mut().enumerate() {
            node.set_peers(
                ids.iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, id)| id.clone()),
            );
        }

        debug!("Initialized complete graph with {} nodes", node_count);
    }

    /// Linear scan by id.
    ///
    /// O(n) per lookup, which is fine at the node counts this engine is
    /// meant for.
    pub fn find_node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    /// Mutable lookup by id, used by drivers to seed or override states.
    pub fn find_node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id() == id)
    }

    /// Sets the state of the node named `id`.
    ///
    /// # Errors
    /// `GossipError::UnknownNode` when no node has that id.
    pub fn set_node_state(
        &mut self,
        id: &str,
        state: NodeState,
        round: Option<u64>,
    ) -> Result<(), GossipError> {
        let node = self
            .find_node_mut(id)
            .ok_or_else(|| GossipError::unknown_node(id))?;
        node.set_state(state, round);
        Ok(())
    }

    /// Picks one of `node`'s peers through the selector.
    ///
    /// Returns `None` when the node has no peers. Only the selector's
    /// internal state advances.
    pub fn select_random_peer(&mut self, node: &Node) -> Option<String> {
        pick_peer(&mut self.selector, node)
    }

    /// Executes one synchronous round and returns the messages it sent.
    ///
    /// A message counts as sent even if delivery turned out to be a no-op.
    /// The round counter advances by exactly one, also when nothing was sent.
    pub fn execute_round(&mut self) -> Vec<GossipMessage> {
        let round = self.current_round + 1;

        // Generation
        let mut messages = Vec::new();
        for node in self.nodes.iter().filter(|node| node.state().is_active()) {
            if let Some(to) = pick_peer(&mut self.selector, node) {
                messages.push(GossipMessage {
                    from: node.id().to_string(),
                    to,
                    state: node.state(),
                    round,
                    timestamp: self.clock.now_millis(),
                });
            }
        }

        // Delivery
        let mut changed = 0;
        for message in &messages {
            if self.deliver(message) {
                changed += 1;
            }
        }

        self.current_round = round;
        self.last_round_changes = changed;

        debug!(
            "Round {}: {} messages sent, {} nodes changed state",
            round,
            messages.len(),
            changed
        );

        messages
    }

    /// Applies one message. Returns true if the target's state changed.
    fn deliver(&mut self, message: &GossipMessage) -> bool {
        let Some(target) = self.find_node_mut(&message.to) else {
            trace!("Dropping message from {} to unknown node {}", message.from, message.to);
            return false;
        };

        if target.state() == message.state {
            return false;
        }

        target.set_state(message.state, Some(message.round));
        true
    }

    /// True when there are no nodes or every node shares the first node's
    /// state. An all-Red network is converged.
    pub fn is_converged(&self) -> bool {
        match self.nodes.first() {
            None => true,
            Some(first) => self.nodes.iter().all(|node| node.state() == first.state()),
        }
    }

    /// True when converged on an active state, i.e. the infection reached
    /// every node.
    pub fn infected_converged(&self) -> bool {
        self.is_converged()
            && self
                .nodes
                .first()
                .is_some_and(|node| node.state().is_active())
    }

    /// Forces every node back to Red with `last_updated == 0` and rewinds the
    /// round counter. Ids and peer lists are kept.
    pub fn reset(&mut self) {
        self.current_round = 0;
        self.last_round_changes = 0;
        for node in &mut self.nodes {
            node.set_state(NodeState::Red, Some(0));
        }
    }

    /// Snapshot of every non-Red node, in id order.
    pub fn active_nodes(&self) -> Vec<Node> {
        self.nodes
            .iter()
            .filter(|node| node.state().is_active())
            .cloned()
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.state().is_active()).count()
    }

    pub fn state_counts(&self) -> StateCounts {
        StateCounts::tally(self.nodes.iter().map(Node::state))
    }

    /// Executes rounds until the network converges or `max_rounds` have run.
    ///
    /// An already converged network executes no rounds.
    pub fn run_until_converged(&mut self, max_rounds: u64) -> RoundStats {
        let mut stats = RoundStats::new(self.state_counts());
        if self.is_converged() {
            stats.mark_converged(self.current_round);
            return stats;
        }

        for _ in 0..max_rounds {
            let messages = self.execute_round();
            let converged = self.is_converged();
            stats.record_round(self.current_round, messages.len(), self.state_counts(), converged);
            if converged {
                break;
            }
        }

        stats
    }

    /// Spreads the nodes evenly on a circle. Cosmetic only.
    pub fn apply_circle_layout(&mut self, radius: f64) {
        let positions = circle_layout(self.nodes.len(), radius);
        for (node, position) in self.nodes.iter_mut().zip(positions) {
            node.set_position(position);
        }
    }
}

fn pick_peer<S: IndexSelector>(selector: &mut S, node: &Node) -> Option<String> {
    let index = selector.select_index(node.peer_count())?;
    node.peer(index).map(str::to_string)
}
