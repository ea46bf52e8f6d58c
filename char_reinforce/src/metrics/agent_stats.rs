//! Running counters for a single agent.

use crate::algorithms::reinforce::{UpdateError, UpdateReport};

/// Interaction and learning counters.
///
/// The agent is driven by one caller, so these are plain fields rather than
/// atomics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentStats {
    /// Symbols emitted.
    steps: usize,
    /// Rewards recorded against an action.
    rewarded_steps: usize,
    /// Sum of recorded rewards.
    cumulative_reward: f64,
    /// Completed learning updates.
    updates: usize,
    /// Updates abandoned because the signal had no spread.
    degenerate_batches: usize,
    /// Updates abandoned because the gradient norm was not finite.
    gradient_overflows: usize,
    /// Most recent completed update.
    last_update: Option<UpdateReport>,
}

impl AgentStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an emitted symbol.
    pub fn record_step(&mut self) {
        self.steps += 1;
    }

    /// Count a reward recorded against an action.
    pub fn record_reward(&mut self, reward: f32) {
        self.rewarded_steps += 1;
        self.cumulative_reward += reward as f64;
    }

    /// Count a completed update.
    pub fn record_update(&mut self, report: &UpdateReport) {
        self.updates += 1;
        self.last_update = Some(*report);
    }

    /// Count an abandoned update.
    pub fn record_fault(&mut self, error: &UpdateError) {
        match error {
            UpdateError::DegenerateBatch { .. } => self.degenerate_batches += 1,
            UpdateError::GradientOverflow { .. } => self.gradient_overflows += 1,
            UpdateError::EmptyBatch => {}
        }
    }

    /// Symbols emitted.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Rewards recorded against an action.
    pub fn rewarded_steps(&self) -> usize {
        self.rewarded_steps
    }

    /// Sum of recorded rewards.
    pub fn cumulative_reward(&self) -> f64 {
        self.cumulative_reward
    }

    /// Mean recorded reward (0 before any reward).
    pub fn avg_reward(&self) -> f64 {
        if self.rewarded_steps == 0 {
            return 0.0;
        }
        self.cumulative_reward / self.rewarded_steps as f64
    }

    /// Completed learning updates.
    pub fn updates(&self) -> usize {
        self.updates
    }

    /// Updates abandoned for a degenerate signal.
    pub fn degenerate_batches(&self) -> usize {
        self.degenerate_batches
    }

    /// Updates abandoned for a non-finite gradient norm.
    pub fn gradient_overflows(&self) -> usize {
        self.gradient_overflows
    }

    /// Total abandoned updates.
    pub fn skipped_updates(&self) -> usize {
        self.degenerate_batches + self.gradient_overflows
    }

    /// Most recent completed update.
    pub fn last_update(&self) -> Option<&UpdateReport> {
        self.last_update.as_ref()
    }

    /// Pre-clip gradient norm of the most recent completed update.
    pub fn last_grad_norm(&self) -> Option<f32> {
        self.last_update.map(|r| r.grad_norm)
    }

    /// Reset all counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(step: usize) -> UpdateReport {
        UpdateReport {
            step,
            cumulative_reward: 1.0,
            n_actions: 10,
            grad_norm: 2.0,
            max_grad_norm: 5.0,
            clipped: false,
        }
    }

    #[test]
    fn test_reward_average() {
        let mut stats = AgentStats::new();
        assert_eq!(stats.avg_reward(), 0.0);

        stats.record_reward(1.0);
        stats.record_reward(0.0);
        stats.record_reward(2.0);

        assert_eq!(stats.rewarded_steps(), 3);
        assert!((stats.cumulative_reward() - 3.0).abs() < 1e-9);
        assert!((stats.avg_reward() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_update_and_fault_counts() {
        let mut stats = AgentStats::new();
        stats.record_update(&report(10));
        stats.record_update(&report(20));
        stats.record_fault(&UpdateError::DegenerateBatch { std: 0.0 });
        stats.record_fault(&UpdateError::GradientOverflow { norm: f32::NAN });
        stats.record_fault(&UpdateError::EmptyBatch);

        assert_eq!(stats.updates(), 2);
        assert_eq!(stats.last_update().map(|r| r.step), Some(20));
        assert_eq!(stats.last_grad_norm(), Some(2.0));
        assert_eq!(stats.degenerate_batches(), 1);
        assert_eq!(stats.gradient_overflows(), 1);
        assert_eq!(stats.skipped_updates(), 2);
    }

    #[test]
    fn test_reset() {
        let mut stats = AgentStats::new();
        stats.record_step();
        stats.record_reward(1.0);
        stats.record_update(&report(1));
        stats.reset();
        assert_eq!(stats, AgentStats::new());
    }
}
