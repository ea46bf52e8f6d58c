//! Categorical action distribution over output symbols.
//!
//! Sampling is split from the network: the policy produces logits, and
//! [`CategoricalOutput::sample`] draws an index on the host while keeping a
//! log-probability tensor that still points into the autodiff graph. That
//! tensor is what the REINFORCE update later weights and backpropagates.

use burn::tensor::activation::{log_softmax, softmax};
use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};
use rand::Rng;

/// One categorical draw.
#[derive(Debug, Clone)]
pub struct SampledAction<B: Backend> {
    /// Sampled symbol index.
    pub index: usize,
    /// Probability of the sampled index (host copy, for diagnostics).
    pub prob: f32,
    /// `log π(index)` with gradient lineage, shape `[1]`.
    pub log_prob: Tensor<B, 1>,
}

/// Logits over the vocabulary for a single decision, `[1, n_actions]`.
#[derive(Debug, Clone)]
pub struct CategoricalOutput<B: Backend> {
    /// Unnormalized log probabilities.
    pub logits: Tensor<B, 2>,
}

impl<B: Backend> CategoricalOutput<B> {
    /// Wrap a logits tensor.
    pub fn new(logits: Tensor<B, 2>) -> Self {
        Self { logits }
    }

    /// Number of actions.
    pub fn n_actions(&self) -> usize {
        self.logits.dims()[1]
    }

    /// Softmax probabilities.
    pub fn probs(&self) -> Tensor<B, 2> {
        softmax(self.logits.clone(), 1)
    }

    /// Host copy of the probabilities.
    pub fn prob_values(&self) -> Vec<f32> {
        self.probs().into_data().iter::<f32>().collect()
    }

    /// `(max logit, max probability)`, the confidence figures that show up in
    /// the periodic step diagnostics.
    pub fn confidence(&self) -> (f32, f32) {
        let max_logit = self
            .logits
            .clone()
            .into_data()
            .iter::<f32>()
            .fold(f32::NEG_INFINITY, f32::max);
        let max_prob = self
            .prob_values()
            .into_iter()
            .fold(f32::NEG_INFINITY, f32::max);
        (max_logit, max_prob)
    }

    /// Draw an index from the distribution.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SampledAction<B> {
        let probs = self.prob_values();
        let index = sample_index(&probs, rng.gen::<f32>());
        SampledAction {
            index,
            prob: probs[index],
            log_prob: self.log_prob(index),
        }
    }

    /// `log π(index)` with gradient flow, shape `[1]`.
    pub fn log_prob(&self, index: usize) -> Tensor<B, 1> {
        let device = self.logits.device();
        let log_probs = log_softmax(self.logits.clone(), 1);
        let selected = Tensor::<B, 2, Int>::from_ints([[index as i32]], &device);
        log_probs.gather(1, selected).reshape([1])
    }
}

/// Inverse-CDF draw from `probs` given a uniform `u` in `[0, 1)`.
///
/// Falls back to the last index when rounding leaves the cumulative sum
/// short of `u`.
pub fn sample_index(probs: &[f32], u: f32) -> usize {
    let last = probs.len().saturating_sub(1);
    let mut cumsum = 0.0;
    for (i, p) in probs.iter().enumerate() {
        cumsum += p;
        if u < cumsum {
            return i;
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    type B = NdArray<f32>;

    fn output(logits: [f32; 3]) -> CategoricalOutput<B> {
        let device = Default::default();
        CategoricalOutput::new(Tensor::<B, 2>::from_floats([logits], &device))
    }

    #[test]
    fn test_sample_index_inverse_cdf() {
        let probs = [0.2, 0.5, 0.3];
        assert_eq!(sample_index(&probs, 0.0), 0);
        assert_eq!(sample_index(&probs, 0.19), 0);
        assert_eq!(sample_index(&probs, 0.2), 1);
        assert_eq!(sample_index(&probs, 0.69), 1);
        assert_eq!(sample_index(&probs, 0.71), 2);
    }

    #[test]
    fn test_sample_index_rounding_falls_back_to_last() {
        let probs = [0.3, 0.3, 0.3];
        assert_eq!(sample_index(&probs, 0.95), 2);
    }

    #[test]
    fn test_probs_sum_to_one() {
        let out = output([1.0, -2.0, 0.5]);
        let sum: f32 = out.prob_values().iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert_eq!(out.n_actions(), 3);
    }

    #[test]
    fn test_log_prob_matches_probability() {
        let out = output([0.0, 1.0, 2.0]);
        let probs = out.prob_values();
        for index in 0..3 {
            let log_prob: f32 = out.log_prob(index).into_scalar();
            assert!((log_prob.exp() - probs[index]).abs() < 1e-5);
        }
    }

    #[test]
    fn test_sample_follows_distribution() {
        // Logit gap of 10 puts ~all mass on index 1
        let out = output([0.0, 10.0, 0.0]);
        let mut rng = StdRng::seed_from_u64(3);
        let hits = (0..200).filter(|_| out.sample(&mut rng).index == 1).count();
        assert!(hits > 190);
    }

    #[test]
    fn test_sample_is_stochastic() {
        let out = output([0.0, 0.0, 0.0]);
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = [false; 3];
        for _ in 0..100 {
            seen[out.sample(&mut rng).index] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_sampled_action_carries_probability() {
        let out = output([0.3, 0.1, -0.4]);
        let mut rng = StdRng::seed_from_u64(5);
        let action = out.sample(&mut rng);
        let probs = out.prob_values();
        assert!((action.prob - probs[action.index]).abs() < 1e-6);
        assert_eq!(action.log_prob.dims(), [1]);
    }

    #[test]
    fn test_confidence() {
        let out = output([0.0, 2.0, 1.0]);
        let (max_logit, max_prob) = out.confidence();
        assert!((max_logit - 2.0).abs() < 1e-6);
        let probs = out.prob_values();
        assert!((max_prob - probs[1]).abs() < 1e-6);
    }
}
