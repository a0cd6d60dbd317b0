//! Peer index selection.

use rand::Rng;

/// Chooses an index into a candidate list.
///
/// This is the only source of randomness the gossip engine consumes.
///
/// # Implementations
///
/// - **Production**: `RandomIndexSelector` - thread-local RNG
/// - **Tests**: `ScriptedIndexSelector` - replays a fixed script
/// - **Simulation**: `gossip_sim::SimContext` - seeded ChaCha8 RNG
pub trait IndexSelector: Send {
    /// Returns an index in `[0, length)`, or `None` when `length == 0`.
    ///
    /// `None` means "no peers available" and is not an error.
    fn select_index(&mut self, length: usize) -> Option<usize>;
}

impl<S: IndexSelector + ?Sized> IndexSelector for Box<S> {
    fn select_index(&mut self, length: usize) -> Option<usize> {
        (**self).select_index(length)
    }
}

impl<S: IndexSelector + ?Sized> IndexSelector for &mut S {
    fn select_index(&mut self, length: usize) -> Option<usize> {
        (**self).select_index(length)
    }
}

/// Uniform selection backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIndexSelector;

impl RandomIndexSelector {
    /// Creates a new random selector.
    pub fn new() -> Self {
        Self
    }
}

impl IndexSelector for RandomIndexSelector {
    fn select_index(&mut self, length: usize) -> Option<usize> {
        if length == 0 {
            return None;
        }
        Some(rand::thread_rng().gen_range(0..length))
    }
}

/// Replays a predetermined sequence of indices.
///
/// Each call returns the next scripted value, wrapping around at the end of
/// the script. A scripted value that is out of range for the requested
/// length is remapped to `0`.
#[derive(Debug, Clone)]
pub struct ScriptedIndexSelector {
    /// The script; never empty
    indices: Vec<usize>,

    /// Number of successful selections since the script was last set
    calls: usize,
}

impl ScriptedIndexSelector {
    /// Creates a selector replaying `indices`.
    ///
    /// An empty script is replaced by the default script `[0]`.
    pub fn new(indices: Vec<usize>) -> Self {
        Self {
            indices: Self::normalize(indices),
            calls: 0,
        }
    }

    /// Replaces the script and restarts it from the first entry.
    pub fn set_indices(&mut self, indices: Vec<usize>) {
        self.indices = Self::normalize(indices);
        self.calls = 0;
    }

    /// Returns the current script.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Returns how many indices have been handed out since the last reset.
    pub fn calls(&self) -> usize {
        self.calls
    }

    fn normalize(indices: Vec<usize>) -> Vec<usize> {
        if indices.is_empty() {
            vec![0]
        } else {
            indices
        }
    }
}

impl Default for ScriptedIndexSelector {
    fn default() -> Self {
        Self::new(vec![0])
    }
}

impl IndexSelector for ScriptedIndexSelector {
    fn select_index(&mut self, length: usize) -> Option<usize> {
        if length == 0 {
            return None;
        }

        let index = self.indices[self.calls % self.indices.len()];
        self.calls += 1;

        if index < length {
            Some(index)
        } else {
            Some(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_selector_empty() {
        let mut selector = RandomIndexSelector::new();
        assert_eq!(selector.select_index(0), None);
    }

    #[test]
    fn test_random_selector_in_range() {
        let mut selector = RandomIndexSelector::new();
        for _ in 0..1000 {
            let index = selector.select_index(7).unwrap();
            assert!(index < 7);
        }

        // Single candidate is always chosen
        assert_eq!(selector.select_index(1), Some(0));
    }

    #[test]
    fn test_scripted_selector_cycles() {
        let mut selector = ScriptedIndexSelector::new(vec![1, 2, 0]);

        let picks: Vec<_> = (0..6).map(|_| selector.select_index(3).unwrap()).collect();
        assert_eq!(picks, vec![1, 2, 0, 1, 2, 0]);
        assert_eq!(selector.calls(), 6);
    }

    #[test]
    fn test_scripted_selector_out_of_range_maps_to_zero() {
        let mut selector = ScriptedIndexSelector::new(vec![5]);
        assert_eq!(selector.select_index(3), Some(0));
        assert_eq!(selector.select_index(6), Some(5));
    }

    #[test]
    fn test_scripted_selector_empty_length_does_not_advance() {
        let mut selector = ScriptedIndexSelector::new(vec![1, 2]);

        assert_eq!(selector.select_index(0), None);
        assert_eq!(selector.calls(), 0);
        assert_eq!(selector.select_index(3), Some(1));
    }

    #[test]
    fn test_scripted_selector_set_indices_resets_counter() {
        let mut selector = ScriptedIndexSelector::new(vec![0, 1]);
        selector.select_index(2);
        assert_eq!(selector.calls(), 1);

        selector.set_indices(vec![1]);
        assert_eq!(selector.calls(), 0);
        assert_eq!(selector.select_index(2), Some(1));
    }

    #[test]
    fn test_scripted_selector_empty_script_defaults_to_zero() {
        let mut selector = ScriptedIndexSelector::new(Vec::new());
        assert_eq!(selector.indices(), &[0]);
        assert_eq!(selector.select_index(4), Some(0));

        let mut default = ScriptedIndexSelector::default();
        assert_eq!(default.select_index(4), Some(0));
    }

    #[test]
    fn test_boxed_selector_delegates() {
        let mut selector: Box<dyn IndexSelector> = Box::new(ScriptedIndexSelector::new(vec![2]));
        assert_eq!(selector.select_index(3), Some(2));
        assert_eq!(selector.select_index(0), None);
    }
}
