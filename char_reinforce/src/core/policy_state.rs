//! Hidden state threaded between decision steps.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Recurrent state of the policy: main observation encoder plus auxiliary
/// reward encoder, each shaped `[layers, 1, hidden]`.
#[derive(Debug, Clone)]
pub struct PolicyState<B: Backend> {
    /// Main (observation) encoder state.
    pub obs: Tensor<B, 3>,
    /// Auxiliary (reward history) encoder state.
    pub aux: Tensor<B, 3>,
}

impl<B: Backend> PolicyState<B> {
    /// Pair two state tensors.
    pub fn new(obs: Tensor<B, 3>, aux: Tensor<B, 3>) -> Self {
        Self { obs, aux }
    }

    /// Same values, no autodiff history.
    ///
    /// The agent calls this after every forward pass so each step's graph
    /// ends at the step that produced it.
    pub fn detach(self) -> Self {
        Self {
            obs: self.obs.detach(),
            aux: self.aux.detach(),
        }
    }

    /// Flattened main-encoder state.
    pub fn obs_values(&self) -> Vec<f32> {
        self.obs.clone().into_data().iter::<f32>().collect()
    }

    /// Flattened auxiliary-encoder state.
    pub fn aux_values(&self) -> Vec<f32> {
        self.aux.clone().into_data().iter::<f32>().collect()
    }
}
