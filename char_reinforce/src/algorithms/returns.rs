//! Turning buffered rewards into per-action REINFORCE weights.
//!
//! ## Discounted return
//!
//! R_t = r_t + γ R_{t+1}, computed by walking the trajectory backwards.
//!
//! ## Signal layouts
//!
//! - [`SignalPairing::Interleaved`]: two entries per step, `r_t - b` and
//!   `R_t`, in temporal order `[r_0 - b, R_0, r_1 - b, R_1, ...]`.
//!   Statistics use all 2N entries and action `i` takes entry `i`.
//! - [`SignalPairing::PerAction`]: one entry per step, `R_t - b`.
//!
//! Both layouts are standardized to zero mean and unit (population)
//! standard deviation before use.

use super::reinforce::UpdateError;

/// How the signal list is laid out and paired with actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalPairing {
    /// Two entries per step; action `i` is weighted by entry `i`.
    #[default]
    Interleaved,
    /// One entry per step; action `i` is weighted by its own return.
    PerAction,
}

/// Signal derived from a trajectory of rewards.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSignal {
    /// Unstandardized signal in temporal order.
    pub signal: Vec<f32>,
    /// Sum of the raw rewards.
    pub cumulative_reward: f32,
}

/// Build the raw signal for `rewards` (temporal order).
pub fn compute_signal(
    rewards: &[f32],
    gamma: f32,
    baseline: f32,
    pairing: SignalPairing,
) -> ReturnSignal {
    let per_step = match pairing {
        SignalPairing::Interleaved => 2,
        SignalPairing::PerAction => 1,
    };
    let mut signal = Vec::with_capacity(rewards.len() * per_step);
    let mut cumulative_reward = 0.0f32;
    let mut ret = 0.0f32;

    for &reward in rewards.iter().rev() {
        cumulative_reward += reward;
        ret = ret * gamma + reward;
        match pairing {
            SignalPairing::Interleaved => {
                signal.push(ret);
                signal.push(reward - baseline);
            }
            SignalPairing::PerAction => signal.push(ret - baseline),
        }
    }
    signal.reverse();

    ReturnSignal {
        signal,
        cumulative_reward,
    }
}

/// Standardize to zero mean, unit population standard deviation.
///
/// Fails with [`UpdateError::DegenerateBatch`] when the standard deviation is
/// not above `min_std` (constant or single-entry signal) or not finite.
pub fn standardize(signal: &[f32], min_std: f32) -> Result<Vec<f32>, UpdateError> {
    let n = signal.len();
    if n == 0 {
        return Err(UpdateError::EmptyBatch);
    }

    let mean = signal.iter().map(|&x| x as f64).sum::<f64>() / n as f64;
    let var = signal
        .iter()
        .map(|&x| (x as f64 - mean).powi(2))
        .sum::<f64>()
        / n as f64;
    let std = var.sqrt();

    if !std.is_finite() || std <= min_std as f64 {
        return Err(UpdateError::DegenerateBatch { std: std as f32 });
    }

    Ok(signal
        .iter()
        .map(|&x| ((x as f64 - mean) / std) as f32)
        .collect())
}

/// Per-action weights: standardized signal truncated to `n_actions`.
pub fn action_weights(
    rewards: &[f32],
    gamma: f32,
    baseline: f32,
    pairing: SignalPairing,
    min_std: f32,
) -> Result<(Vec<f32>, f32), UpdateError> {
    let ReturnSignal {
        signal,
        cumulative_reward,
    } = compute_signal(rewards, gamma, baseline, pairing);

    let mut weights = standardize(&signal, min_std)?;
    weights.truncate(rewards.len());
    Ok((weights, cumulative_reward))
}
