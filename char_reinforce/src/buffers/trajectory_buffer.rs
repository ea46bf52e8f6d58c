//! Ordered log of sampled actions and the rewards they earned.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::algorithms::action_policy::SampledAction;

/// A sampled action paired with the reward the harness returned for it.
#[derive(Debug, Clone)]
pub struct TrajectoryEntry<B: Backend> {
    /// The action as sampled, including its graph-attached log-probability.
    pub action: SampledAction<B>,
    /// Scalar reward for the action.
    pub reward: f32,
}

/// Append-only trajectory between learning updates.
///
/// Insertion order is temporal order. The buffer is emptied as a whole by
/// [`clear`](Self::clear); there is no partial flush.
#[derive(Debug)]
pub struct TrajectoryBuffer<B: Backend> {
    entries: Vec<TrajectoryEntry<B>>,
}

impl<B: Backend> Default for TrajectoryBuffer<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> TrajectoryBuffer<B> {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append one step.
    pub fn push(&mut self, action: SampledAction<B>, reward: f32) {
        self.entries.push(TrajectoryEntry { action, reward });
    }

    /// Number of buffered steps.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no step is buffered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether enough history has accumulated for an update.
    ///
    /// An empty buffer is never ready, whatever the threshold.
    pub fn is_ready(&self, threshold: usize) -> bool {
        !self.entries.is_empty() && self.entries.len() >= threshold
    }

    /// Rewards in temporal order.
    pub fn rewards(&self) -> Vec<f32> {
        self.entries.iter().map(|e| e.reward).collect()
    }

    /// Graph-attached log-probabilities in temporal order.
    pub fn log_probs(&self) -> Vec<Tensor<B, 1>> {
        self.entries
            .iter()
            .map(|e| e.action.log_prob.clone())
            .collect()
    }

    /// Sampled indices in temporal order.
    pub fn action_indices(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.action.index).collect()
    }

    /// Buffered entries.
    pub fn entries(&self) -> &[TrajectoryEntry<B>] {
        &self.entries
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
