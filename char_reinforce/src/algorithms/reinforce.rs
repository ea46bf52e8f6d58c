//! REINFORCE policy-gradient update.
//!
//! One update consumes the whole trajectory buffer:
//!
//! 1. Rewards → discounted signal → standardized weights (see [`returns`](super::returns)).
//! 2. loss = -Σ_i w_i · log π(a_i), one backward pass over every buffered action.
//! 3. Global gradient norm; rescale to `max_grad_norm` when exceeded.
//! 4. One Adam step.
//! 5. Clear the buffer.
//!
//! Numerical faults abort before the optimizer step, so parameters are never
//! touched by a NaN/inf gradient.

use std::fmt;

use burn::module::AutodiffModule;
use burn::optim::{GradientsParams, Optimizer};
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::Tensor;

use super::grad_norm::clip_grad_norm;
use super::returns::{action_weights, SignalPairing};
use crate::buffers::trajectory_buffer::TrajectoryBuffer;

/// What happens to the buffered trajectory when an update is abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultPolicy {
    /// Keep the entries and retry at the next trigger.
    #[default]
    RetainBuffer,
    /// Drop the entries.
    ClearBuffer,
}

/// Configuration for the REINFORCE update.
#[derive(Debug, Clone, PartialEq)]
pub struct ReinforceConfig {
    /// Buffered steps required before an update runs.
    pub reinforce_step: usize,
    /// Discount factor.
    pub gamma: f32,
    /// Constant subtracted from rewards when building the signal.
    pub baseline: f32,
    /// Maximum global gradient norm.
    pub max_grad_norm: f32,
    /// Adam learning rate.
    pub learning_rate: f64,
    /// Adam epsilon.
    pub adam_epsilon: f32,
    /// Signal layout and action pairing.
    pub pairing: SignalPairing,
    /// Standard deviation at or below which the signal is treated as degenerate.
    pub min_std: f32,
    /// Buffer handling when the signal is degenerate.
    ///
    /// A gradient overflow always clears the buffer: the backward pass has
    /// already consumed the graphs behind the buffered log-probabilities.
    pub on_degenerate_batch: FaultPolicy,
}

impl Default for ReinforceConfig {
    fn default() -> Self {
        Self {
            reinforce_step: 100,
            gamma: 1.0,
            baseline: 0.01,
            max_grad_norm: 5.0,
            learning_rate: 1e-3,
            adam_epsilon: 1e-8,
            pairing: SignalPairing::Interleaved,
            min_std: 1e-8,
            on_degenerate_batch: FaultPolicy::RetainBuffer,
        }
    }
}

impl ReinforceConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the update threshold.
    pub fn with_reinforce_step(mut self, steps: usize) -> Self {
        self.reinforce_step = steps;
        self
    }

    /// Set the discount factor.
    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set the reward baseline.
    pub fn with_baseline(mut self, baseline: f32) -> Self {
        self.baseline = baseline;
        self
    }

    /// Set the gradient norm ceiling.
    pub fn with_max_grad_norm(mut self, max_norm: f32) -> Self {
        self.max_grad_norm = max_norm;
        self
    }

    /// Set the learning rate.
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Set the signal pairing scheme.
    pub fn with_pairing(mut self, pairing: SignalPairing) -> Self {
        self.pairing = pairing;
        self
    }

    /// Set the degenerate-batch threshold.
    pub fn with_min_std(mut self, min_std: f32) -> Self {
        self.min_std = min_std;
        self
    }

    /// Set buffer handling for degenerate batches.
    pub fn with_on_degenerate_batch(mut self, policy: FaultPolicy) -> Self {
        self.on_degenerate_batch = policy;
        self
    }
}

/// Reasons an update was abandoned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateError {
    /// Nothing buffered.
    EmptyBatch,
    /// Signal standard deviation was zero (or below `min_std`) or not finite.
    DegenerateBatch { std: f32 },
    /// Gradient norm was not finite.
    GradientOverflow { norm: f32 },
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateError::EmptyBatch => write!(f, "no buffered steps to learn from"),
            UpdateError::DegenerateBatch { std } => {
                write!(f, "reward signal has degenerate spread (std = {})", std)
            }
            UpdateError::GradientOverflow { norm } => {
                write!(f, "gradient norm is not finite ({})", norm)
            }
        }
    }
}

impl std::error::Error for UpdateError {}

/// Summary of a completed update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateReport {
    /// Agent step at which the update ran.
    pub step: usize,
    /// Sum of buffered rewards.
    pub cumulative_reward: f32,
    /// Number of actions in the batch.
    pub n_actions: usize,
    /// Gradient norm before clipping.
    pub grad_norm: f32,
    /// Clipping threshold in effect.
    pub max_grad_norm: f32,
    /// Whether gradients were rescaled.
    pub clipped: bool,
}

/// Run one REINFORCE update over `buffer` and step `model` with `optimizer`.
///
/// On success the buffer is cleared. On [`UpdateError::DegenerateBatch`] the
/// buffer follows `config.on_degenerate_batch`; on
/// [`UpdateError::GradientOverflow`] it is cleared. `model` is unchanged on
/// every error path.
pub fn reinforce_update<B, M, O>(
    model: &mut M,
    optimizer: &mut O,
    buffer: &mut TrajectoryBuffer<B>,
    config: &ReinforceConfig,
    step: usize,
) -> Result<UpdateReport, UpdateError>
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
    O: Optimizer<M, B>,
{
    if buffer.is_empty() {
        return Err(UpdateError::EmptyBatch);
    }

    let n_actions = buffer.len();
    let (weights, cumulative_reward) = match action_weights(
        &buffer.rewards(),
        config.gamma,
        config.baseline,
        config.pairing,
        config.min_std,
    ) {
        Ok(result) => result,
        Err(err) => {
            if config.on_degenerate_batch == FaultPolicy::ClearBuffer {
                buffer.clear();
            }
            return Err(err);
        }
    };

    let log_probs = Tensor::cat(buffer.log_probs(), 0);
    let device = log_probs.device();
    let weights = Tensor::<B, 1>::from_floats(weights.as_slice(), &device);
    let loss = -(log_probs * weights).sum();

    let mut grads = GradientsParams::from_grads(loss.backward(), model);
    let clip = clip_grad_norm(model, &mut grads, config.max_grad_norm);
    if !clip.norm.is_finite() {
        buffer.clear();
        return Err(UpdateError::GradientOverflow { norm: clip.norm });
    }

    log::info!(
        "learning | step {}: cumulative reward {} over {} actions | grad norm {:.5} / clip to {:.1}",
        step, cumulative_reward, n_actions, clip.norm, config.max_grad_norm
    );

    *model = optimizer.step(config.learning_rate, model.clone(), grads);
    buffer.clear();

    Ok(UpdateReport {
        step,
        cumulative_reward,
        n_actions,
        grad_norm: clip.norm,
        max_grad_norm: config.max_grad_norm,
        clipped: clip.clipped,
    })
}
