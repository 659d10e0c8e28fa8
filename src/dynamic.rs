//! Per-report-step state with carry-forward semantics.
//!
//! A value set at step N holds for every later step until overridden. The
//! container is sized to the time map once and updated in deck order, so a
//! lookup is a plain index and never chases "latest mutation before step"
//! at query time.

use serde::{Deserialize, Serialize};

/// A value per report step with carry-forward on update.
///
/// `update(step, v)` assigns `v` to `step` and every later step; deck
/// processing applies updates in non-decreasing step order, which makes the
/// dense representation exactly the carry-forward timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicState<T> {
    data: Vec<T>,
}

impl<T: Clone> DynamicState<T> {
    /// A state holding `initial` at every one of `num_steps` steps.
    pub fn new(num_steps: usize, initial: T) -> Self {
        Self {
            data: vec![initial; num_steps],
        }
    }

    /// Number of report steps covered.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The value in force at `step`.
    ///
    /// Panics if `step` is out of range; callers validate steps against the
    /// time map before querying.
    pub fn get(&self, step: usize) -> &T {
        &self.data[step]
    }

    /// The value in force at the final step.
    pub fn back(&self) -> &T {
        self.data.last().expect("DynamicState is never empty")
    }

    /// Set the value from `step` (inclusive) onwards.
    pub fn update(&mut self, step: usize, value: T) {
        for slot in self.data.iter_mut().skip(step) {
            *slot = value.clone();
        }
    }

    /// Replace the value at every step. Used for initial-state assignments
    /// made before the timeline proper is processed.
    pub fn update_initial(&mut self, value: T) {
        self.update(0, value);
    }

    /// Mutable access to the value at `step` and onwards is deliberately not
    /// offered; compose a new value and `update` instead.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}
