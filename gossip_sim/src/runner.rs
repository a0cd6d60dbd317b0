//! Scenario runner - executes gossip simulation scenarios.

use crate::context::SimContext;
use crate::error::SimError;
use crate::exporter::{SimExport, SimFrame};
use crate::scenarios::ScenarioId;
use crate::world::{SimConfig, SimWorld};

use gossip_core::{node_id, GossipError, GossipProtocol, Node, NodeState, StateCounts};
use gossip_env::ScriptedIndexSelector;
use tracing::{debug, info, warn};

/// Quality grade for a convergence speed or a selection distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Excellent,
    Good,
    Acceptable,
    Poor,
}

impl Rating {
    /// Grades rounds-to-convergence against network size.
    ///
    /// `<= 2n` Excellent, `<= 3n` Good, `<= 6n` Acceptable, otherwise Poor.
    pub fn for_convergence(rounds: u64, num_nodes: usize) -> Self {
        let n = num_nodes as u64;
        if rounds <= 2 * n {
            Rating::Excellent
        } else if rounds <= 3 * n {
            Rating::Good
        } else if rounds <= 6 * n {
            Rating::Acceptable
        } else {
            Rating::Poor
        }
    }

    /// Grades the spread between the least and most selected peer.
    ///
    /// The acceptable spread is half the expected hits per peer (at least 1).
    pub fn for_distribution(min: usize, max: usize, expected: usize) -> Self {
        let acceptable = (expected / 2).max(1);
        let range = max.saturating_sub(min);
        if range <= acceptable {
            Rating::Good
        } else if range <= acceptable * 2 {
            Rating::Acceptable
        } else {
            Rating::Poor
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rating::Excellent => "excellent",
            Rating::Good => "good",
            Rating::Acceptable => "acceptable",
            Rating::Poor => "poor",
        }
    }
}

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Rounds executed
    pub rounds: u64,

    /// Round at which the scenario's convergence condition first held
    pub converged_round: Option<u64>,

    /// State tally at the end of the run
    pub final_counts: StateCounts,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

impl ScenarioResult {
    fn new(scenario: ScenarioId, seed: u64) -> Self {
        Self {
            scenario,
            seed,
            passed: false,
            rounds: 0,
            converged_round: None,
            final_counts: StateCounts::default(),
            failure_reason: None,
            metrics: ScenarioMetrics::default(),
        }
    }

    pub fn converged(&self) -> bool {
        self.converged_round.is_some()
    }

    fn fail(mut self, reason: impl Into<String>) -> Self {
        self.passed = false;
        self.failure_reason = Some(reason.into());
        self
    }
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default)]
pub struct ScenarioMetrics {
    /// Total messages sent
    pub messages_sent: u64,

    /// Deliveries that changed the target's state
    pub state_changes: u64,

    /// Rounds to convergence per node
    pub efficiency: Option<f64>,

    /// Convergence or distribution grade
    pub rating: Option<Rating>,

    /// Selection hits per peer (randomness scenario)
    pub distribution: Vec<usize>,

    /// State that took over the network (competing scenario)
    pub winner: Option<NodeState>,
}

/// Runs gossip scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Number of nodes
    num_nodes: usize,

    /// Round limit for convergence scenarios
    max_rounds: u64,

    /// Peer selections for the randomness scenario
    samples: usize,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64, num_nodes: usize) -> Self {
        let defaults = SimConfig::default();
        Self {
            seed,
            num_nodes,
            max_rounds: defaults.max_rounds,
            samples: defaults.samples,
        }
    }

    /// Sets the round limit.
    pub fn with_max_rounds(mut self, max_rounds: u64) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Sets the number of randomness samples.
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    fn config(&self) -> SimConfig {
        SimConfig {
            seed: self.seed,
            num_nodes: self.num_nodes,
            max_rounds: self.max_rounds,
            samples: self.samples,
            ..Default::default()
        }
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        self.run_with_export(scenario).0
    }

    /// Runs a scenario, recording a frame per round.
    pub fn run_with_export(&self, scenario: ScenarioId) -> (ScenarioResult, SimExport) {
        info!(
            "Starting scenario: {} (seed={}, nodes={})",
            scenario.name(),
            self.seed,
            self.num_nodes
        );

        let mut export = SimExport::new(scenario.name(), self.seed);
        let result = ScenarioResult::new(scenario, self.seed);

        let result = if self.num_nodes < scenario.min_nodes() {
            result.fail(format!(
                "{} needs at least {} nodes, got {}",
                scenario.name(),
                scenario.min_nodes(),
                self.num_nodes
            ))
        } else {
            let outcome = match scenario {
                ScenarioId::Convergence => self.run_convergence(result.clone(), &mut export),
                ScenarioId::Randomness => self.run_randomness(result.clone(), &mut export),
                ScenarioId::Competing => self.run_competing(result.clone(), &mut export),
                ScenarioId::RoundConsistency => {
                    self.run_round_consistency(result.clone(), &mut export)
                }
                ScenarioId::Reset => self.run_reset(result.clone(), &mut export),
            };
            outcome.unwrap_or_else(|e| result.fail(e.to_string()))
        };

        export.finalize(result.passed, result.converged_round);
        (result, export)
    }

    /// Gossips until `done` holds or the round limit is hit.
    ///
    /// Returns the round at which `done` first held.
    fn spread<F>(
        &self,
        world: &mut SimWorld,
        export: &mut SimExport,
        metrics: &mut ScenarioMetrics,
        done: F,
    ) -> Option<u64>
    where
        F: Fn(&GossipProtocol<SimContext, SimContext>) -> bool,
    {
        export.add_frame(capture(world.protocol(), Vec::new()));
        if done(world.protocol()) {
            return Some(world.round());
        }

        for _ in 0..self.max_rounds {
            let messages = world.tick();
            let changed = world.changed_last_round();
            metrics.messages_sent += messages.len() as u64;
            metrics.state_changes += changed as u64;

            debug!(
                "  round={} | messages={} | changed={} | active={}",
                world.round(),
                messages.len(),
                changed,
                world.protocol().active_count()
            );

            export.add_frame(capture(world.protocol(), messages));
            if done(world.protocol()) {
                return Some(world.round());
            }
        }

        None
    }

    /// One Green source, run until the whole network is Green.
    fn run_convergence(
        &self,
        mut result: ScenarioResult,
        export: &mut SimExport,
    ) -> Result<ScenarioResult, SimError> {
        let mut world = SimWorld::new(self.config());
        world.seed_node(&node_id(0), NodeState::Green)?;

        let mut metrics = ScenarioMetrics::default();
        let converged_round =
            self.spread(&mut world, export, &mut metrics, |protocol| protocol.infected_converged());

        result.rounds = world.round();
        result.converged_round = converged_round;
        result.final_counts = world.protocol().state_counts();

        match converged_round {
            Some(round) => {
                let rating = Rating::for_convergence(round, self.num_nodes);
                metrics.rating = Some(rating);
                metrics.efficiency = Some(round as f64 / self.num_nodes as f64);
                info!(
                    "Converged in {} rounds ({} messages, {})",
                    round,
                    metrics.messages_sent,
                    rating.name()
                );
                result.passed = true;
            }
            None => {
                warn!(
                    "Not converged after {} rounds: {}/{} nodes infected",
                    result.rounds,
                    result.final_counts.active(),
                    self.num_nodes
                );
                result.failure_reason = Some(format!(
                    "Not converged after {} rounds ({}/{} nodes infected)",
                    result.rounds,
                    result.final_counts.active(),
                    self.num_nodes
                ));
            }
        }

        result.metrics = metrics;
        Ok(result)
    }

    /// Samples peer selection from node-0 and grades the spread.
    fn run_randomness(
        &self,
        mut result: ScenarioResult,
        export: &mut SimExport,
    ) -> Result<ScenarioResult, SimError> {
        let mut world = SimWorld::new(self.config());
        let source_id = node_id(0);
        world.seed_node(&source_id, NodeState::Green)?;

        let source = world
            .protocol()
            .find_node(&source_id)
            .cloned()
            .ok_or_else(|| GossipError::unknown_node(&source_id))?;
        let peers = source.peers();

        let mut distribution = vec![0usize; peers.len()];
        for _ in 0..self.samples {
            let Some(target) = world.protocol_mut().select_random_peer(&source) else {
                continue;
            };
            if let Some(slot) = peers.iter().position(|peer| *peer == target) {
                distribution[slot] += 1;
            }
        }

        let expected = self.samples / peers.len();
        let min = distribution.iter().copied().min().unwrap_or(0);
        let max = distribution.iter().copied().max().unwrap_or(0);
        let rating = Rating::for_distribution(min, max, expected);

        info!(
            "Selection spread over {} peers: min={} max={} expected={} ({})",
            peers.len(),
            min,
            max,
            expected,
            rating.name()
        );

        export.add_frame(capture(world.protocol(), Vec::new()));

        result.final_counts = world.protocol().state_counts();
        result.metrics.rating = Some(rating);
        result.metrics.distribution = distribution;

        if rating == Rating::Poor {
            return Ok(result.fail(format!(
                "Poor randomness: range {} for {} expected hits per peer",
                max - min,
                expected
            )));
        }

        result.passed = true;
        Ok(result)
    }

    /// Green at node-0, Blue at the last node, run until one state wins.
    fn run_competing(
        &self,
        mut result: ScenarioResult,
        export: &mut SimExport,
    ) -> Result<ScenarioResult, SimError> {
        let mut world = SimWorld::new(self.config());
        world.seed_node(&node_id(0), NodeState::Green)?;
        world.seed_node(&node_id(self.num_nodes - 1), NodeState::Blue)?;

        let mut metrics = ScenarioMetrics::default();
        let converged_round =
            self.spread(&mut world, export, &mut metrics, |protocol| protocol.is_converged());

        result.rounds = world.round();
        result.converged_round = converged_round;
        result.final_counts = world.protocol().state_counts();

        if converged_round.is_some() {
            metrics.winner = result.final_counts.dominant();
            info!(
                "{} took over after {} rounds",
                metrics.winner.map_or("nothing", |state| state.name()),
                result.rounds
            );
            result.passed = true;
        } else {
            warn!(
                "No winner after {} rounds: {:?}",
                result.rounds, result.final_counts
            );
            result.failure_reason = Some(format!(
                "No winner after {} rounds (green={}, blue={}, red={})",
                result.rounds,
                result.final_counts.green,
                result.final_counts.blue,
                result.final_counts.red
            ));
        }

        result.metrics = metrics;
        Ok(result)
    }

    /// A (Green) -> B (Blue) -> C in one scripted round.
    ///
    /// C must end up with B's state from the start of the round, not the
    /// Green that B receives from A in the same round.
    fn run_round_consistency(
        &self,
        mut result: ScenarioResult,
        export: &mut SimExport,
    ) -> Result<ScenarioResult, SimError> {
        let (a, b, c) = (node_id(0), node_id(1), node_id(2));

        // node-0 picks peer 0 (node-1), node-1 picks peer 1 (node-2)
        let mut protocol = GossipProtocol::with_selector(ScriptedIndexSelector::new(vec![0, 1]));
        protocol.initialize(self.num_nodes);
        protocol.set_node_state(&a, NodeState::Green, None)?;
        protocol.set_node_state(&b, NodeState::Blue, None)?;
        export.add_frame(capture(&protocol, Vec::new()));

        let messages = protocol.execute_round();
        result.metrics.messages_sent = messages.len() as u64;
        export.add_frame(capture(&protocol, messages));

        result.rounds = protocol.current_round();
        result.final_counts = protocol.state_counts();

        let state_of = |id: &str| protocol.find_node(id).map(Node::state);
        let (b_state, c_state) = (state_of(&b), state_of(&c));

        if c_state == Some(NodeState::Green) {
            return Ok(result.fail(format!(
                "{} adopted {}'s state within the same round",
                c, a
            )));
        }
        if b_state != Some(NodeState::Green) || c_state != Some(NodeState::Blue) {
            return Ok(result.fail(format!(
                "Unexpected states after one round: {}={:?}, {}={:?}",
                b, b_state, c, c_state
            )));
        }

        result.passed = true;
        Ok(result)
    }

    /// Spreads for a few rounds, resets, and checks what reset kept.
    fn run_reset(
        &self,
        mut result: ScenarioResult,
        export: &mut SimExport,
    ) -> Result<ScenarioResult, SimError> {
        let mut world = SimWorld::new(self.config());
        world.seed_node(&node_id(0), NodeState::Green)?;

        let stats = world.protocol_mut().run_until_converged(self.max_rounds.min(5));
        result.metrics.messages_sent = stats.total_messages() as u64;
        result.rounds = world.round();
        export.add_frame(capture(world.protocol(), Vec::new()));

        let peers_before: Vec<Vec<String>> =
            world.protocol().nodes().iter().map(Node::peers).collect();

        world.protocol_mut().reset();
        export.add_frame(capture(world.protocol(), Vec::new()));

        let protocol = world.protocol();
        let peers_after: Vec<Vec<String>> = protocol.nodes().iter().map(Node::peers).collect();
        result.final_counts = protocol.state_counts();

        let mut problems = Vec::new();
        if protocol.current_round() != 0 {
            problems.push(format!("round is {}", protocol.current_round()));
        }
        if result.final_counts.red != self.num_nodes {
            problems.push(format!("{} nodes not Red", result.final_counts.active()));
        }
        if protocol.nodes().iter().any(|node| node.last_updated() != 0) {
            problems.push("round markers not cleared".to_string());
        }
        if peers_before != peers_after {
            problems.push("peer lists changed".to_string());
        }

        if !problems.is_empty() {
            return Ok(result.fail(format!("Reset incomplete: {}", problems.join(", "))));
        }

        result.passed = true;
        Ok(result)
    }
}

fn capture<S, C>(protocol: &GossipProtocol<S, C>, messages: Vec<gossip_core::GossipMessage>) -> SimFrame
where
    S: gossip_env::IndexSelector,
    C: gossip_env::Clock,
{
    SimFrame::capture(
        protocol.current_round(),
        protocol.is_converged(),
        &protocol.nodes(),
        messages,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[test]
    fn test_convergence_scenario() {
        let runner = ScenarioRunner::new(42, 10);

        let result = runner.run(ScenarioId::Convergence);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(result.converged());
        assert_eq!(result.final_counts.green, 10);
        assert!(result.metrics.messages_sent > 0);
        // Every node but the seed changed exactly once
        assert_eq!(result.metrics.state_changes, 9);
        assert!(result.metrics.rating.is_some());
    }

    #[test]
    fn test_convergence_deterministic() {
        let runner1 = ScenarioRunner::new(7, 12);
        let runner2 = ScenarioRunner::new(7, 12);

        let result1 = runner1.run(ScenarioId::Convergence);
        let result2 = runner2.run(ScenarioId::Convergence);

        assert_eq!(result1.rounds, result2.rounds);
        assert_eq!(result1.metrics.messages_sent, result2.metrics.messages_sent);
    }

    #[test]
    fn test_convergence_round_limit() {
        let runner = ScenarioRunner::new(42, 50).with_max_rounds(1);

        let result = runner.run(ScenarioId::Convergence);

        assert!(!result.passed);
        assert_eq!(result.rounds, 1);
        assert!(result.failure_reason.unwrap().contains("Not converged"));
    }

    #[test]
    fn test_randomness_scenario() {
        let runner = ScenarioRunner::new(42, 5).with_samples(4000);

        let result = runner.run(ScenarioId::Randomness);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.metrics.distribution.len(), 4);
        assert_eq!(result.metrics.distribution.iter().sum::<usize>(), 4000);
        assert!(result.metrics.distribution.iter().all(|hits| *hits > 0));
        assert_eq!(result.rounds, 0);
    }

    #[test]
    fn test_competing_scenario() {
        let runner = ScenarioRunner::new(42, 6).with_max_rounds(1000);

        let result = runner.run(ScenarioId::Competing);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.final_counts.red, 0);
        let winner = result.metrics.winner.unwrap();
        assert!(winner.is_active());
        assert_eq!(result.final_counts.get(winner), 6);
    }

    /// Replays each frame's messages against the previous frame's states and
    /// counts the deliveries that changed their target.
    fn replayed_state_changes(export: &SimExport) -> u64 {
        let mut changes = 0;
        for pair in export.frames.windows(2) {
            let mut states: HashMap<&str, NodeState> = pair[0]
                .nodes
                .iter()
                .map(|node| (node.id.as_str(), node.state))
                .collect();
            for message in &pair[1].messages {
                if let Some(state) = states.get_mut(message.to.as_str()) {
                    if *state != message.state {
                        *state = message.state;
                        changes += 1;
                    }
                }
            }
        }
        changes
    }

    #[test]
    fn test_competing_state_changes_match_replay() {
        for seed in 1..=20 {
            let runner = ScenarioRunner::new(seed, 6).with_max_rounds(1000);

            let (result, export) = runner.run_with_export(ScenarioId::Competing);

            assert_eq!(
                result.metrics.state_changes,
                replayed_state_changes(&export),
                "seed {}",
                seed
            );
        }
    }

    #[test]
    fn test_round_consistency_scenario() {
        let runner = ScenarioRunner::new(42, 3);

        let result = runner.run(ScenarioId::RoundConsistency);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.rounds, 1);
        assert_eq!(result.metrics.messages_sent, 2);
        assert_eq!(result.final_counts, StateCounts { red: 0, green: 2, blue: 1 });
    }

    #[test]
    fn test_scenario_needs_enough_nodes() {
        let runner = ScenarioRunner::new(42, 2);

        let result = runner.run(ScenarioId::RoundConsistency);

        assert!(!result.passed);
        assert!(result.failure_reason.unwrap().contains("at least 3"));

        let result = ScenarioRunner::new(42, 1).run(ScenarioId::Convergence);
        assert!(!result.passed);
    }

    #[test]
    fn test_reset_scenario() {
        let runner = ScenarioRunner::new(42, 8);

        let result = runner.run(ScenarioId::Reset);

        assert!(result.passed, "{:?}", result.failure_reason);
        assert_eq!(result.final_counts.red, 8);
        assert!(result.metrics.messages_sent > 0);
    }

    #[test]
    fn test_export_has_frame_per_round() {
        let runner = ScenarioRunner::new(3, 6);

        let (result, export) = runner.run_with_export(ScenarioId::Convergence);

        assert_eq!(export.frames.len() as u64, result.rounds + 1);
        assert_eq!(export.rounds, result.rounds);
        assert_eq!(export.converged_round, result.converged_round);
        assert_eq!(export.passed, result.passed);
        assert_eq!(export.frames[0].round, 0);
        assert!(export.frames[0].messages.is_empty());
    }

    #[test]
    fn test_convergence_rating_thresholds() {
        assert_eq!(Rating::for_convergence(20, 10), Rating::Excellent);
        assert_eq!(Rating::for_convergence(21, 10), Rating::Good);
        assert_eq!(Rating::for_convergence(30, 10), Rating::Good);
        assert_eq!(Rating::for_convergence(60, 10), Rating::Acceptable);
        assert_eq!(Rating::for_convergence(61, 10), Rating::Poor);
    }

    #[test]
    fn test_distribution_rating_thresholds() {
        // expected 10 -> acceptable range 5
        assert_eq!(Rating::for_distribution(8, 13, 10), Rating::Good);
        assert_eq!(Rating::for_distribution(5, 15, 10), Rating::Acceptable);
        assert_eq!(Rating::for_distribution(2, 20, 10), Rating::Poor);
        // Tiny expectations still allow a spread of 1
        assert_eq!(Rating::for_distribution(0, 1, 1), Rating::Good);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_converged_run_infects_each_node_once(seed in any::<u64>(), num_nodes in 2usize..16) {
            let result = ScenarioRunner::new(seed, num_nodes).run(ScenarioId::Convergence);

            if result.converged() {
                prop_assert_eq!(result.final_counts.green, num_nodes);
                prop_assert_eq!(result.metrics.state_changes, num_nodes as u64 - 1);
                prop_assert_eq!(result.converged_round, Some(result.rounds));
            }
        }
    }
}
