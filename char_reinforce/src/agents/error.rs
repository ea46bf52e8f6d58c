//! Errors surfaced by the `reward` / `next` interface.

use std::fmt;

use super::config::ConfigError;
use super::AgentPhase;
use crate::core::alphabet::{AlphabetError, UnknownSymbolError};

/// Error returned by [`Learner`](super::Learner) calls.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentError {
    /// The input symbol is not in the alphabet. Agent state is unchanged.
    UnknownSymbol(UnknownSymbolError),
    /// An index could not be mapped back to a symbol.
    Alphabet(AlphabetError),
    /// Reward is NaN or infinite. Agent state is unchanged.
    NonFiniteReward { reward: f32 },
    /// `reward` / `next` called out of their alternating order.
    OutOfOrder {
        call: &'static str,
        phase: AgentPhase,
    },
    /// Invalid configuration.
    Config(ConfigError),
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::UnknownSymbol(e) => write!(f, "{}", e),
            AgentError::Alphabet(e) => write!(f, "alphabet error: {}", e),
            AgentError::NonFiniteReward { reward } => {
                write!(f, "reward must be finite, got {}", reward)
            }
            AgentError::OutOfOrder { call, phase } => {
                write!(f, "`{}` called out of order (agent is {:?})", call, phase)
            }
            AgentError::Config(e) => write!(f, "invalid config: {}", e),
        }
    }
}

impl std::error::Error for AgentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AgentError::UnknownSymbol(e) => Some(e),
            AgentError::Alphabet(e) => Some(e),
            AgentError::Config(e) => Some(e),
            AgentError::NonFiniteReward { .. } | AgentError::OutOfOrder { .. } => None,
        }
    }
}

impl From<UnknownSymbolError> for AgentError {
    fn from(e: UnknownSymbolError) -> Self {
        AgentError::UnknownSymbol(e)
    }
}

impl From<AlphabetError> for AgentError {
    fn from(e: AlphabetError) -> Self {
        AgentError::Alphabet(e)
    }
}

impl From<ConfigError> for AgentError {
    fn from(e: ConfigError) -> Self {
        AgentError::Config(e)
    }
}
