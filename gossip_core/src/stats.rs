//! Round statistics.
//!
//! Aggregates what a driving caller wants to display between rounds:
//! how many nodes hold each state, how many messages each round sent, and
//! when the network first converged.

use crate::types::NodeState;
use serde::{Deserialize, Serialize};

/// Number of nodes in each state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateCounts {
    pub red: usize,
    pub green: usize,
    pub blue: usize,
}

impl StateCounts {
    /// Tallies an iterator of states.
    pub fn tally<I: IntoIterator<Item = NodeState>>(states: I) -> Self {
        let mut counts = Self::default();
        for state in states {
            counts.add(state);
        }
        counts
    }

    pub fn add(&mut self, state: NodeState) {
        match state {
            NodeState::Red => self.red += 1,
            NodeState::Green => self.green += 1,
            NodeState::Blue => self.blue += 1,
        }
    }

    pub fn get(&self, state: NodeState) -> usize {
        match state {
            NodeState::Red => self.red,
            NodeState::Green => self.green,
            NodeState::Blue => self.blue,
        }
    }

    pub fn total(&self) -> usize {
        self.red + self.green + self.blue
    }

    /// Nodes in any non-Red state.
    pub fn active(&self) -> usize {
        self.green + self.blue
    }

    /// The most common state. Ties resolve in declaration order (Red first).
    pub fn dominant(&self) -> Option<NodeState> {
        if self.total() == 0 {
            return None;
        }

        let mut best = NodeState::Red;
        for state in NodeState::ALL {
            if self.get(state) > self.get(best) {
                best = state;
            }
        }
        Some(best)
    }
}

/// Percentage of nodes holding the most common state.
///
/// An empty network counts as fully converged (100.0).
pub fn convergence_rate(counts: &StateCounts) -> f64 {
    let total = counts.total();
    match counts.dominant() {
        Some(state) if total > 0 => counts.get(state) as f64 * 100.0 / total as f64,
        _ => 100.0,
    }
}

/// Accumulated statistics for a sequence of rounds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoundStats {
    /// Rounds executed while collecting
    pub total_rounds: u64,

    /// Messages sent in each executed round, in order
    pub messages_per_round: Vec<usize>,

    /// Round counter value at which convergence was first observed
    pub converged_round: Option<u64>,

    /// State tally after the most recent round
    pub counts: StateCounts,
}

impl RoundStats {
    /// Starts collecting from the given state tally.
    pub fn new(counts: StateCounts) -> Self {
        Self {
            counts,
            ..Default::default()
        }
    }

    /// Records one executed round.
    pub fn record_round(&mut self, round: u64, messages: usize, counts: StateCounts, converged: bool) {
        self.total_rounds += 1;
        self.messages_per_round.push(messages);
        self.counts = counts;
        if converged && self.converged_round.is_none() {
            self.converged_round = Some(round);
        }
    }

    /// Marks convergence without a round having been executed.
    pub fn mark_converged(&mut self, round: u64) {
        if self.converged_round.is_none() {
            self.converged_round = Some(round);
        }
    }

    pub fn is_converged(&self) -> bool {
        self.converged_round.is_some()
    }

    pub fn total_messages(&self) -> usize {
        self.messages_per_round.iter().sum()
    }

    pub fn convergence_rate(&self) -> f64 {
        convergence_rate(&self.counts)
    }
}
