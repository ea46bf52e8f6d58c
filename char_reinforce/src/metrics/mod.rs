//! Agent metrics.
//!
//! - [`AgentStats`]: interaction and update counters for one agent

pub mod agent_stats;

pub use agent_stats::AgentStats;
