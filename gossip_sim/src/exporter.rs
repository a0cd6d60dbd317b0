//! JSON exporter for per-round visualization.
//!
//! Exports one frame per round so an external renderer can replay a run.

use crate::error::SimError;

use gossip_core::{GossipMessage, Node, NodeState};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// A single frame of simulation data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimFrame {
    /// Round counter after this frame's round (0 = initial state)
    pub round: u64,

    /// Whether every node held the same state at this point
    pub converged: bool,

    /// Node snapshots in id order
    pub nodes: Vec<NodeFrame>,

    /// Messages sent during this round
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub messages: Vec<GossipMessage>,
}

impl SimFrame {
    /// Captures a frame from a node snapshot.
    pub fn capture(round: u64, converged: bool, nodes: &[Node], messages: Vec<GossipMessage>) -> Self {
        Self {
            round,
            converged,
            nodes: nodes.iter().map(NodeFrame::from).collect(),
            messages,
        }
    }
}

/// Node data within a frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeFrame {
    pub id: String,
    pub state: NodeState,
    pub last_updated: u64,
    pub x: f64,
    pub y: f64,
}

impl From<&Node> for NodeFrame {
    fn from(node: &Node) -> Self {
        let position = node.position();
        Self {
            id: node.id().to_string(),
            state: node.state(),
            last_updated: node.last_updated(),
            x: position.x,
            y: position.y,
        }
    }
}

/// Complete simulation export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Rounds executed
    pub rounds: u64,

    /// All frames
    pub frames: Vec<SimFrame>,

    /// Final results
    pub passed: bool,

    /// Round at which the network converged, if it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converged_round: Option<u64>,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            rounds: 0,
            frames: Vec::new(),
            passed: false,
            converged_round: None,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: SimFrame) {
        self.rounds = frame.round;
        self.frames.push(frame);
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, passed: bool, converged_round: Option<u64>) {
        self.passed = passed;
        self.converged_round = converged_round;
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> Result<(), SimError> {
        let json = self.to_json()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
