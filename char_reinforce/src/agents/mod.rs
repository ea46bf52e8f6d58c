//! Agents driven through the `reward` / `next` call protocol.
//!
//! A harness alternates the two calls for the whole session:
//!
//! ```text
//!   reward(None) ─► next(c0) ─► reward(r0) ─► next(c1) ─► reward(r1) ─► ...
//! ```
//!
//! The first `reward` arrives before any action exists and is ignored.

pub mod config;
pub mod error;
pub mod reinforce_agent;
pub mod scanning_agent;

#[cfg(test)]
mod tests;

pub use config::{AgentConfig, ConfigError};
pub use error::AgentError;
pub use reinforce_agent::{PolicyOptimizer, ReinforceAgent};
pub use scanning_agent::ScanningAgent;

/// Turn-based reward/symbol exchange with a harness.
pub trait Learner {
    /// Credit the previous action. `None` counts as 0.
    fn reward(&mut self, reward: Option<f32>) -> Result<(), AgentError>;

    /// Read one input symbol and emit one output symbol.
    fn next(&mut self, input: char) -> Result<char, AgentError>;
}

/// Position of an agent in the `reward` / `next` cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentPhase {
    /// No action emitted yet; `reward` is a no-op.
    AwaitingFirstInput,
    /// An action was emitted and needs its reward.
    AwaitingReward,
    /// The last action was credited; waiting for the next symbol.
    AwaitingInput,
}
