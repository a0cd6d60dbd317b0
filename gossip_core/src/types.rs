//! Value types shared by nodes, the protocol, and its consumers.

use crate::error::GossipError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The state a node holds and spreads.
///
/// `Red` is the neutral baseline. `Green` and `Blue` are two distinct
/// infections; the protocol only ever compares states for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeState {
    #[default]
    Red,
    Green,
    Blue,
}

impl NodeState {
    /// Every state, in declaration order.
    pub const ALL: [NodeState; 3] = [NodeState::Red, NodeState::Green, NodeState::Blue];

    /// Returns true for states that originate messages (anything but Red).
    pub fn is_active(self) -> bool {
        self != NodeState::Red
    }

    /// Returns the state name.
    pub fn name(&self) -> &'static str {
        match self {
            NodeState::Red => "Red",
            NodeState::Green => "Green",
            NodeState::Blue => "Blue",
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for NodeState {
    type Err = GossipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Red" | "red" => Ok(NodeState::Red),
            "Green" | "green" => Ok(NodeState::Green),
            "Blue" | "blue" => Ok(NodeState::Blue),
            _ => Err(GossipError::invalid_state(s)),
        }
    }
}

/// A 2D coordinate. Cosmetic only; the protocol never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The origin, where every node starts.
    pub fn origin() -> Self {
        Self::default()
    }
}

/// A single push of state from one node to one peer.
///
/// Messages are ephemeral: `execute_round` returns them as a record of what
/// was sent and the protocol keeps no copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GossipMessage {
    /// Sender node id
    pub from: String,

    /// Target node id
    pub to: String,

    /// Sender's state at the start of the round
    pub state: NodeState,

    /// Round the message belongs to (the round counter after it completes)
    pub round: u64,

    /// Wall-clock milliseconds at send time (advisory)
    pub timestamp: u64,
}

/// Returns the id assigned to the node at `index` during topology construction.
pub fn node_id(index: usize) -> String {
    format!("node-{}", index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_parse() {
        assert_eq!("Red".parse::<NodeState>().unwrap(), NodeState::Red);
        assert_eq!("green".parse::<NodeState>().unwrap(), NodeState::Green);
        assert_eq!("Blue".parse::<NodeState>().unwrap(), NodeState::Blue);

        let err = "Yellow".parse::<NodeState>().unwrap_err();
        assert_eq!(err, GossipError::InvalidState("Yellow".to_string()));
        assert_eq!(err.to_string(), "Invalid state: Yellow");
    }

    #[test]
    fn test_state_activity() {
        assert!(!NodeState::Red.is_active());
        assert!(NodeState::Green.is_active());
        assert!(NodeState::Blue.is_active());
        assert_eq!(NodeState::default(), NodeState::Red);
    }

    #[test]
    fn test_state_display_roundtrips_through_parse() {
        for state in NodeState::ALL {
            assert_eq!(state.to_string().parse::<NodeState>().unwrap(), state);
        }
    }

    #[test]
    fn test_message_serializes_state_by_name() {
        let message = GossipMessage {
            from: node_id(0),
            to: node_id(1),
            state: NodeState::Green,
            round: 1,
            timestamp: 0,
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["state"], "Green");
        assert_eq!(json["from"], "node-0");
    }
}
