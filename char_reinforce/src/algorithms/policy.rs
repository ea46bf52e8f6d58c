//! Recurrent character policy.
//!
//! ```text
//!   input index ──► Embedding(V, V) ─────────────────────┐
//!                                                        ├─► cat ─► obs GRU ─► Linear ─► logits [1, V]
//!   prev reward ──► aux GRU (reward history) ─► aux h ───┘
//! ```
//!
//! The embedding width equals the vocabulary size. Both recurrent stacks
//! carry their state in a [`PolicyState`]; the forward pass is a pure
//! function of its inputs and the learnable parameters.

use burn::module::{Module, ModuleVisitor, ParamId};
use burn::nn::{Embedding, EmbeddingConfig, Initializer, Linear, LinearConfig};
use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};

use crate::core::policy_state::PolicyState;
use crate::core::recurrent::{StackedGru, StackedGruConfig};

/// The auxiliary encoder consumes one scalar per step: the previous reward.
const AUX_INPUT_SIZE: usize = 1;

/// Configuration for [`Policy`].
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyConfig {
    /// Vocabulary size V (also the embedding width).
    pub vocab_size: usize,
    /// Hidden size of the main observation encoder.
    pub obs_hidden_size: usize,
    /// Hidden size of the auxiliary reward encoder.
    pub aux_hidden_size: usize,
    /// Layers in the main encoder.
    pub obs_n_layers: usize,
    /// Layers in the auxiliary encoder.
    pub aux_n_layers: usize,
    /// Inter-layer dropout for both encoders.
    pub dropout: f64,
    /// Parameters are drawn from `Uniform(-init_range, init_range)`.
    pub init_range: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            vocab_size: crate::core::alphabet::DEFAULT_SYMBOLS.chars().count(),
            obs_hidden_size: 128,
            aux_hidden_size: 16,
            obs_n_layers: 4,
            aux_n_layers: 4,
            dropout: 0.5,
            init_range: 0.1,
        }
    }
}

impl PolicyConfig {
    /// Default sizes for a vocabulary of `vocab_size` symbols.
    pub fn new(vocab_size: usize) -> Self {
        Self {
            vocab_size,
            ..Default::default()
        }
    }

    /// Set the vocabulary size.
    pub fn with_vocab_size(mut self, vocab_size: usize) -> Self {
        self.vocab_size = vocab_size;
        self
    }

    /// Set the main encoder hidden size.
    pub fn with_obs_hidden_size(mut self, size: usize) -> Self {
        self.obs_hidden_size = size;
        self
    }

    /// Set the auxiliary encoder hidden size.
    pub fn with_aux_hidden_size(mut self, size: usize) -> Self {
        self.aux_hidden_size = size;
        self
    }

    /// Set the main encoder depth.
    pub fn with_obs_n_layers(mut self, n_layers: usize) -> Self {
        self.obs_n_layers = n_layers;
        self
    }

    /// Set the auxiliary encoder depth.
    pub fn with_aux_n_layers(mut self, n_layers: usize) -> Self {
        self.aux_n_layers = n_layers;
        self
    }

    /// Set the dropout probability.
    pub fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout;
        self
    }

    /// Set the uniform initialization half-width.
    pub fn with_init_range(mut self, init_range: f64) -> Self {
        self.init_range = init_range;
        self
    }

    /// Width of the main encoder input: embedding plus auxiliary hidden.
    pub fn obs_input_size(&self) -> usize {
        self.vocab_size + self.aux_hidden_size
    }

    fn initializer(&self) -> Initializer {
        Initializer::Uniform {
            min: -self.init_range,
            max: self.init_range,
        }
    }

    /// Initialize the policy on `device`.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Policy<B> {
        let initializer = self.initializer();

        let embedding = EmbeddingConfig::new(self.vocab_size, self.vocab_size)
            .with_initializer(initializer.clone())
            .init(device);

        let obs_rnn = StackedGruConfig::new(self.obs_input_size(), self.obs_hidden_size)
            .with_n_layers(self.obs_n_layers)
            .with_dropout(self.dropout)
            .with_initializer(initializer.clone())
            .init(device);

        let aux_rnn = StackedGruConfig::new(AUX_INPUT_SIZE, self.aux_hidden_size)
            .with_n_layers(self.aux_n_layers)
            .with_dropout(self.dropout)
            .with_initializer(initializer.clone())
            .init(device);

        let affine = LinearConfig::new(self.obs_hidden_size, self.vocab_size)
            .with_initializer(initializer)
            .init(device);

        Policy {
            embedding,
            obs_rnn,
            aux_rnn,
            affine,
            vocab_size: self.vocab_size,
        }
    }
}

/// Recurrent policy producing logits over the next output symbol.
#[derive(Module, Debug)]
pub struct Policy<B: Backend> {
    embedding: Embedding<B>,
    obs_rnn: StackedGru<B>,
    aux_rnn: StackedGru<B>,
    affine: Linear<B>,
    #[module(skip)]
    vocab_size: usize,
}

impl<B: Backend> Policy<B> {
    /// One decision step.
    ///
    /// # Arguments
    /// * `input` - encoded input symbol, `< vocab_size`
    /// * `prev_reward` - reward received for the previous action
    /// * `state` - state returned by the previous call (or [`init_state`](Self::init_state))
    ///
    /// # Returns
    /// * logits `[1, vocab_size]`
    /// * next state
    pub fn forward(
        &self,
        input: usize,
        prev_reward: f32,
        state: &PolicyState<B>,
    ) -> (Tensor<B, 2>, PolicyState<B>) {
        debug_assert!(input < self.vocab_size);
        let device = state.obs.device();

        let tokens = Tensor::<B, 2, Int>::from_ints([[input as i32]], &device);
        let embedded = self.embedding.forward(tokens).reshape([1, self.vocab_size]);

        let reward = Tensor::<B, 2>::from_floats([[prev_reward]], &device);
        let (aux_hidden, aux_state) = self.aux_rnn.step(reward, state.aux.clone());

        let obs_input = Tensor::cat(vec![embedded, aux_hidden], 1);
        let (obs_hidden, obs_state) = self.obs_rnn.step(obs_input, state.obs.clone());

        let logits = self.affine.forward(obs_hidden);
        (logits, PolicyState::new(obs_state, aux_state))
    }

    /// All-zero state for a single sequence.
    pub fn init_state(&self, device: &B::Device) -> PolicyState<B> {
        PolicyState::new(
            self.obs_rnn.initial_state(1, device),
            self.aux_rnn.initial_state(1, device),
        )
    }

    /// Vocabulary size V.
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Every parameter value, flattened in traversal order.
    pub fn parameter_values(&self) -> Vec<f32> {
        let mut collector = ParamCollector { values: Vec::new() };
        self.visit(&mut collector);
        collector.values
    }
}

/// Copies parameter values out of a module in traversal order.
struct ParamCollector {
    values: Vec<f32>,
}

impl<B: Backend> ModuleVisitor<B> for ParamCollector {
    fn visit_float<const D: usize>(&mut self, _id: ParamId, tensor: &Tensor<B, D>) {
        let data = tensor.clone().into_data();
        self.values.extend(data.iter::<f32>());
    }
}
