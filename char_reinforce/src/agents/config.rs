//! Agent configuration.
//!
//! Everything the agent needs is fixed at construction: the alphabet, the
//! network sizes, the update settings and the sampling seed. Nothing is read
//! from global state.

use std::fmt;

use crate::algorithms::policy::PolicyConfig;
use crate::algorithms::reinforce::ReinforceConfig;
use crate::core::alphabet::Alphabet;

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A count parameter must be positive.
    InvalidCount { field: &'static str, value: usize },
    /// A parameter is outside its valid range.
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    /// A parameter must be strictly positive and finite.
    NotPositive { field: &'static str, value: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidCount { field, value } => {
                write!(f, "{} must be > 0, got {}", field, value)
            }
            ConfigError::OutOfRange {
                field,
                value,
                min,
                max,
            } => {
                write!(f, "{} must be in [{}, {}], got {}", field, min, max, value)
            }
            ConfigError::NotPositive { field, value } => {
                write!(f, "{} must be positive and finite, got {}", field, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn check_count(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidCount { field, value });
    }
    Ok(())
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(())
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if !(min..=max).contains(&value) {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Configuration for [`ReinforceAgent`](super::ReinforceAgent).
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Symbols the agent reads and emits.
    pub alphabet: Alphabet,
    /// Network sizes. `vocab_size` is taken from the alphabet at build time.
    pub policy: PolicyConfig,
    /// Learning update settings.
    pub reinforce: ReinforceConfig,
    /// Steps between diagnostic log lines.
    pub diagnostic_interval: usize,
    /// Feed index 0 to the network regardless of the input symbol.
    ///
    /// The input is still validated against the alphabet.
    pub ignore_input: bool,
    /// Seed for action sampling (`None` = OS entropy).
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            alphabet: Alphabet::default(),
            policy: PolicyConfig::default(),
            reinforce: ReinforceConfig::default(),
            diagnostic_interval: 100,
            ignore_input: false,
            seed: None,
        }
    }
}

impl AgentConfig {
    /// Create a configuration with defaults (batched updates every 100 steps).
    pub fn new() -> Self {
        Self::default()
    }

    /// Batched variant: one update per 100 buffered steps.
    pub fn batched() -> Self {
        Self::default()
    }

    /// Micro-task variant: update after every step, input symbol ignored.
    pub fn micro() -> Self {
        Self {
            reinforce: ReinforceConfig::default().with_reinforce_step(1),
            ignore_input: true,
            ..Self::default()
        }
    }

    /// Policy configuration with the vocabulary size taken from the alphabet.
    pub fn policy_config(&self) -> PolicyConfig {
        self.policy.clone().with_vocab_size(self.alphabet.len())
    }

    /// Validate all configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let policy = &self.policy;
        check_count("obs_hidden_size", policy.obs_hidden_size)?;
        check_count("aux_hidden_size", policy.aux_hidden_size)?;
        check_count("obs_n_layers", policy.obs_n_layers)?;
        check_count("aux_n_layers", policy.aux_n_layers)?;
        if !(0.0..1.0).contains(&policy.dropout) {
            return Err(ConfigError::OutOfRange {
                field: "dropout",
                value: policy.dropout,
                min: 0.0,
                max: 1.0,
            });
        }
        check_positive("init_range", policy.init_range)?;

        let reinforce = &self.reinforce;
        check_count("reinforce_step", reinforce.reinforce_step)?;
        check_range("gamma", reinforce.gamma as f64, 0.0, 1.0)?;
        check_positive("max_grad_norm", reinforce.max_grad_norm as f64)?;
        check_positive("learning_rate", reinforce.learning_rate)?;
        check_positive("adam_epsilon", reinforce.adam_epsilon as f64)?;
        check_range("min_std", reinforce.min_std as f64, 0.0, f64::MAX)?;
        if !reinforce.baseline.is_finite() {
            return Err(ConfigError::OutOfRange {
                field: "baseline",
                value: reinforce.baseline as f64,
                min: f64::MIN,
                max: f64::MAX,
            });
        }

        check_count("diagnostic_interval", self.diagnostic_interval)?;
        Ok(())
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }

    /// Set the alphabet.
    pub fn with_alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    /// Set the network configuration.
    pub fn with_policy(mut self, policy: PolicyConfig) -> Self {
        self.policy = policy;
        self
    }

    /// Set the update configuration.
    pub fn with_reinforce(mut self, reinforce: ReinforceConfig) -> Self {
        self.reinforce = reinforce;
        self
    }

    /// Set the update threshold.
    pub fn with_reinforce_step(mut self, steps: usize) -> Self {
        self.reinforce.reinforce_step = steps;
        self
    }

    /// Set the diagnostic log interval.
    pub fn with_diagnostic_interval(mut self, interval: usize) -> Self {
        self.diagnostic_interval = interval;
        self
    }

    /// Ignore the input symbol when choosing an action.
    pub fn with_ignore_input(mut self, ignore_input: bool) -> Self {
        self.ignore_input = ignore_input;
        self
    }

    /// Seed action sampling.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
