//! Named simulation scenarios.

use crate::error::SimError;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// One Green source, run until every node is Green
    Convergence,

    /// Repeated peer selection from one node, check the spread of targets
    Randomness,

    /// Green and Blue sources racing until one state holds every node
    Competing,

    /// Scripted chain A -> B -> C within one round
    RoundConsistency,

    /// Spread, reset, verify topology survives
    Reset,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Convergence,
            ScenarioId::Randomness,
            ScenarioId::Competing,
            ScenarioId::RoundConsistency,
            ScenarioId::Reset,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Convergence => "convergence",
            ScenarioId::Randomness => "randomness",
            ScenarioId::Competing => "competing",
            ScenarioId::RoundConsistency => "round_consistency",
            ScenarioId::Reset => "reset",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Convergence => "Seed node-0 Green, gossip until all nodes are Green",
            ScenarioId::Randomness => "Sample peer selection from node-0, check target distribution",
            ScenarioId::Competing => "Seed Green and Blue at opposite ends, gossip until one wins",
            ScenarioId::RoundConsistency => "Chain A->B->C in one round, C must see B's pre-round state",
            ScenarioId::Reset => "Spread for a few rounds, reset, verify Red / round 0 / same peers",
        }
    }

    /// Smallest network the scenario can run on.
    pub fn min_nodes(&self) -> usize {
        match self {
            ScenarioId::RoundConsistency => 3,
            _ => 2,
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "convergence" | "converge" => Ok(ScenarioId::Convergence),
            "randomness" | "random" => Ok(ScenarioId::Randomness),
            "competing" | "compete" => Ok(ScenarioId::Competing),
            "round_consistency" | "roundconsistency" | "consistency" => {
                Ok(ScenarioId::RoundConsistency)
            }
            "reset" => Ok(ScenarioId::Reset),
            _ => Err(SimError::UnknownScenario(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_names_parse_back() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>().unwrap(), scenario);
            assert_eq!(scenario.to_string(), scenario.name());
            assert!(!scenario.description().is_empty());
        }
    }

    #[test]
    fn test_scenario_aliases() {
        assert_eq!("Consistency".parse::<ScenarioId>().unwrap(), ScenarioId::RoundConsistency);
        assert_eq!("RANDOM".parse::<ScenarioId>().unwrap(), ScenarioId::Randomness);
    }

    #[test]
    fn test_unknown_scenario() {
        let err = "split_brain".parse::<ScenarioId>().unwrap_err();
        assert!(matches!(err, SimError::UnknownScenario(ref name) if name == "split_brain"));
        assert_eq!(err.to_string(), "Unknown scenario: split_brain");
    }
}
