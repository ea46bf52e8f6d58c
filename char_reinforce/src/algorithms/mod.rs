//! Policy network and the REINFORCE learning rule.
//!
//! - `policy`: recurrent policy over output symbols
//! - `action_policy`: categorical sampling with graph-attached log-probabilities
//! - `returns`: discounted, standardized per-action weights
//! - `grad_norm`: global gradient norm and clipping
//! - `reinforce`: the update procedure

pub mod action_policy;
pub mod grad_norm;
pub mod policy;
pub mod reinforce;
pub mod returns;

pub use action_policy::{sample_index, CategoricalOutput, SampledAction};
pub use grad_norm::{clip_grad_norm, global_grad_norm, scale_grads, ClipOutcome};
pub use policy::{Policy, PolicyConfig};
pub use reinforce::{reinforce_update, FaultPolicy, ReinforceConfig, UpdateError, UpdateReport};
pub use returns::{action_weights, compute_signal, standardize, ReturnSignal, SignalPairing};
