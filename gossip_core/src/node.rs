//! A single gossip participant.

use crate::error::GossipError;
use crate::types::{NodeState, Position};
use serde::{Deserialize, Serialize};

/// A node in the gossip network.
///
/// Every accessor hands out an independent value: `position()` is `Copy` and
/// `peers()` returns a fresh `Vec`, so callers can never reach the node's
/// internal containers. All mutation goes through the setters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identity, fixed at construction
    id: String,

    /// Current state
    state: NodeState,

    /// Cosmetic layout coordinate
    position: Position,

    /// Peer ids in insertion order, no duplicates via `add_peer`
    peers: Vec<String>,

    /// Round at which the state was last written with a round marker
    last_updated: u64,
}

impl Node {
    /// Creates a Red node at the origin with no peers.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: NodeState::Red,
            position: Position::origin(),
            peers: Vec::new(),
            last_updated: 0,
        }
    }

    /// Sets the initial state.
    pub fn with_state(mut self, state: NodeState) -> Self {
        self.state = state;
        self
    }

    /// Sets the initial position.
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Returns a snapshot of the peer list.
    pub fn peers(&self) -> Vec<String> {
        self.peers.clone()
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Returns the peer at `index`, if any.
    pub fn peer(&self, index: usize) -> Option<&str> {
        self.peers.get(index).map(String::as_str)
    }

    pub fn has_peer(&self, id: &str) -> bool {
        self.peers.iter().any(|peer| peer == id)
    }

    pub fn last_updated(&self) -> u64 {
        self.last_updated
    }

    /// Updates the state.
    ///
    /// `last_updated` moves only when `round` is supplied; topology setup and
    /// manual seeding pass `None` to leave the round history alone.
    pub fn set_state(&mut self, state: NodeState, round: Option<u64>) {
        self.state = state;
        if let Some(round) = round {
            self.last_updated = round;
        }
    }

    /// Parses `value` as a state and applies it.
    ///
    /// # Errors
    /// Returns `GossipError::InvalidState` carrying `value` when it does not
    /// name a state. The node is left untouched in that case.
    pub fn set_state_named(&mut self, value: &str, round: Option<u64>) -> Result<(), GossipError> {
        let state = value.parse::<NodeState>()?;
        self.set_state(state, round);
        Ok(())
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Appends `id` unless it is already a peer.
    pub fn add_peer(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !self.has_peer(&id) {
            self.peers.push(id);
        }
    }

    /// Replaces the whole peer list with a copy of `ids`.
    ///
    /// Duplicates are not checked; topology construction never produces them.
    pub fn set_peers<I, T>(&mut self, ids: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.peers = ids.into_iter().map(Into::into).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_defaults() {
        let node = Node::new("node-1");

        assert_eq!(node.id(), "node-1");
        assert_eq!(node.state(), NodeState::Red);
        assert_eq!(node.position(), Position::new(0.0, 0.0));
        assert!(node.peers().is_empty());
        assert_eq!(node.last_updated(), 0);
    }

    #[test]
    fn test_node_builder() {
        let node = Node::new("node-1")
            .with_state(NodeState::Green)
            .with_position(Position::new(10.0, 20.0));

        assert_eq!(node.state(), NodeState::Green);
        assert_eq!(node.position(), Position::new(10.0, 20.0));
        assert_eq!(node.last_updated(), 0);
    }

    #[test]
    fn test_set_state_without_round_keeps_marker() {
        let mut node = Node::new("node-1");

        node.set_state(NodeState::Green, None);
        assert_eq!(node.state(), NodeState::Green);
        assert_eq!(node.last_updated(), 0);

        node.set_state(NodeState::Blue, Some(5));
        assert_eq!(node.state(), NodeState::Blue);
        assert_eq!(node.last_updated(), 5);

        // Same state, explicit round still moves the marker
        node.set_state(NodeState::Blue, Some(7));
        assert_eq!(node.last_updated(), 7);
    }

    #[test]
    fn test_set_state_named_rejects_unknown_value() {
        let mut node = Node::new("node-1");
        node.set_state(NodeState::Green, Some(3));

        let err = node.set_state_named("Yellow", Some(9)).unwrap_err();
        assert_eq!(err, GossipError::InvalidState("Yellow".to_string()));

        // Nothing changed
        assert_eq!(node.state(), NodeState::Green);
        assert_eq!(node.last_updated(), 3);

        node.set_state_named("Blue", Some(4)).unwrap();
        assert_eq!(node.state(), NodeState::Blue);
        assert_eq!(node.last_updated(), 4);
    }

    #[test]
    fn test_add_peer_is_idempotent() {
        let mut node = Node::new("node-1");
        node.add_peer("node-2");
        node.add_peer("node-3");
        node.add_peer("node-2");

        assert_eq!(node.peers(), vec!["node-2", "node-3"]);
        assert!(node.has_peer("node-3"));
        assert!(!node.has_peer("node-4"));
    }

    #[test]
    fn test_set_peers_replaces_list() {
        let mut node = Node::new("node-1");
        node.add_peer("node-9");

        let ids = vec!["node-2".to_string(), "node-3".to_string()];
        node.set_peers(ids.iter().cloned());
        assert_eq!(node.peers(), ids);
        assert_eq!(node.peer(1), Some("node-3"));
        assert_eq!(node.peer(2), None);
    }

    #[test]
    fn test_accessors_return_copies() {
        let mut node = Node::new("node-1");
        node.set_peers(["node-2"]);
        node.set_position(Position::new(1.0, 2.0));

        let mut peers = node.peers();
        peers.push("node-3".to_string());
        peers[0] = "mutated".to_string();

        let mut position = node.position();
        position.x = 99.0;

        assert_eq!(node.peers(), vec!["node-2"]);
        assert_eq!(node.position(), Position::new(1.0, 2.0));
    }

    #[test]
    fn test_set_peers_copies_source() {
        let mut source = vec!["node-2".to_string()];
        let mut node = Node::new("node-1");
        node.set_peers(source.clone());

        source.push("node-3".to_string());
        assert_eq!(node.peer_count(), 1);
    }
}
