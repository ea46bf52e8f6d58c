//! # char_reinforce: Online REINFORCE Agent over Characters
//!
//! A turn-based agent that reads one character, emits one character and is
//! told how good its answer was. It learns online with the REINFORCE policy
//! gradient, using a recurrent policy that sees both the input symbol and the
//! history of rewards.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        ReinforceAgent                            │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   next(c) ──► Alphabet::encode ──► index                         │
//! │                                     │                            │
//! │   prev reward ──► aux GRU stack ──┐ ▼                            │
//! │                                   ├─► cat ─► obs GRU stack       │
//! │                  Embedding(idx) ──┘            │                 │
//! │                                                ▼                 │
//! │                                   Linear ─► logits ─► sample     │
//! │                                                         │        │
//! │   reward(r) ──► TrajectoryBuffer ◄── log π(a) ──────────┘        │
//! │                       │                                          │
//! │                       ▼  (len ≥ reinforce_step)                  │
//! │        returns ─► standardize ─► loss ─► clip ─► Adam            │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use burn::backend::{Autodiff, NdArray};
//! use char_reinforce::{AgentConfig, Learner, ReinforceAgent};
//!
//! type B = Autodiff<NdArray<f32>>;
//!
//! let config = AgentConfig::batched().with_seed(42);
//! let mut agent = ReinforceAgent::<B>::new(config, &Default::default())?;
//!
//! agent.reward(None)?;
//! let mut output = agent.next('h')?;
//! loop {
//!     let reward = harness.score(output);
//!     agent.reward(Some(reward))?;
//!     output = agent.next(harness.input())?;
//! }
//! ```

pub mod agents;
pub mod algorithms;
pub mod buffers;
pub mod core;
pub mod metrics;

// Agents and their protocol
pub use agents::{
    AgentConfig, AgentError, AgentPhase, ConfigError, Learner, PolicyOptimizer, ReinforceAgent,
    ScanningAgent,
};

// Policy and learning rule
pub use algorithms::{
    CategoricalOutput, FaultPolicy, Policy, PolicyConfig, ReinforceConfig, SampledAction,
    SignalPairing, UpdateError, UpdateReport,
};

// Core types
pub use crate::core::{Alphabet, AlphabetError, PolicyState, UnknownSymbolError, DEFAULT_SYMBOLS};

pub use buffers::TrajectoryBuffer;
pub use metrics::AgentStats;
