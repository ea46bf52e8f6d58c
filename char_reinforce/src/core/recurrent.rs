//! Recurrent building blocks for the policy network.
//!
//! Burn ships an LSTM but the policy is built from GRUs, so the cell is
//! written out here from `Linear` layers. [`StackedGru`] chains several cells
//! with dropout between them and carries one hidden slice per layer in a
//! `[layers, batch, hidden]` state tensor.

use burn::module::Module;
use burn::nn::{Dropout, DropoutConfig, Initializer, Linear, LinearConfig};
use burn::tensor::activation::sigmoid;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

// ============================================================================
// GRU Cell
// ============================================================================

/// Configuration for a single GRU cell.
#[derive(Debug, Clone)]
pub struct GruCellConfig {
    /// Input feature size.
    pub d_input: usize,
    /// Hidden state size.
    pub d_hidden: usize,
    /// Whether the input projections and the candidate's hidden projection
    /// carry a bias.
    pub bias: bool,
    /// Weight initializer shared by every projection.
    pub initializer: Initializer,
}

impl GruCellConfig {
    /// Create new GRU config.
    pub fn new(d_input: usize, d_hidden: usize) -> Self {
        Self {
            d_input,
            d_hidden,
            bias: true,
            initializer: Initializer::KaimingUniform {
                gain: 1.0 / 3.0f64.sqrt(),
                fan_out_only: false,
            },
        }
    }

    /// Set bias option.
    pub fn with_bias(mut self, bias: bool) -> Self {
        self.bias = bias;
        self
    }

    /// Set the weight initializer.
    pub fn with_initializer(mut self, initializer: Initializer) -> Self {
        self.initializer = initializer;
        self
    }

    fn projection<B: Backend>(&self, d_in: usize, bias: bool, device: &B::Device) -> Linear<B> {
        LinearConfig::new(d_in, self.d_hidden)
            .with_bias(bias)
            .with_initializer(self.initializer.clone())
            .init(device)
    }

    /// Initialize the GRU cell.
    pub fn init<B: Backend>(&self, device: &B::Device) -> GruCell<B> {
        GruCell {
            reset_input: self.projection(self.d_input, self.bias, device),
            reset_hidden: self.projection(self.d_hidden, false, device),
            update_input: self.projection(self.d_input, self.bias, device),
            update_hidden: self.projection(self.d_hidden, false, device),
            candidate_input: self.projection(self.d_input, self.bias, device),
            candidate_hidden: self.projection(self.d_hidden, self.bias, device),
            d_input: self.d_input,
            d_hidden: self.d_hidden,
        }
    }
}

/// GRU cell.
///
/// - r = σ(W_ir * x + W_hr * h + b_r)
/// - z = σ(W_iz * x + W_hz * h + b_z)
/// - n = tanh(W_in * x + b_in + r ⊙ (W_hn * h + b_hn))
/// - h' = (1 - z) ⊙ n + z ⊙ h
#[derive(Module, Debug)]
pub struct GruCell<B: Backend> {
    reset_input: Linear<B>,
    reset_hidden: Linear<B>,
    update_input: Linear<B>,
    update_hidden: Linear<B>,
    candidate_input: Linear<B>,
    candidate_hidden: Linear<B>,
    #[module(skip)]
    d_input: usize,
    #[module(skip)]
    d_hidden: usize,
}

impl<B: Backend> GruCell<B> {
    /// Advance one timestep.
    ///
    /// `input` is `[batch, d_input]`, `hidden` is `[batch, d_hidden]`; the
    /// returned tensor is the new hidden state, which is also the output.
    pub fn step(&self, input: Tensor<B, 2>, hidden: Tensor<B, 2>) -> Tensor<B, 2> {
        let r = sigmoid(
            self.reset_input.forward(input.clone()) + self.reset_hidden.forward(hidden.clone()),
        );
        let z = sigmoid(
            self.update_input.forward(input.clone()) + self.update_hidden.forward(hidden.clone()),
        );
        let n = (self.candidate_input.forward(input)
            + r * self.candidate_hidden.forward(hidden.clone()))
        .tanh();

        let ones = Tensor::ones_like(&z);
        (ones - z.clone()) * n + z * hidden
    }

    /// Hidden size (output dimension).
    pub fn hidden_size(&self) -> usize {
        self.d_hidden
    }

    /// Input size.
    pub fn input_size(&self) -> usize {
        self.d_input
    }
}

// ============================================================================
// Stacked GRU
// ============================================================================

/// Configuration for a multi-layer GRU.
#[derive(Debug, Clone)]
pub struct StackedGruConfig {
    /// Input feature size of the first layer.
    pub d_input: usize,
    /// Hidden size of every layer.
    pub d_hidden: usize,
    /// Number of stacked layers.
    pub n_layers: usize,
    /// Dropout applied to each layer's output before it feeds the next layer.
    pub dropout: f64,
    /// Weight initializer for every cell.
    pub initializer: Initializer,
}

impl StackedGruConfig {
    /// Create a single-layer config without dropout.
    pub fn new(d_input: usize, d_hidden: usize) -> Self {
        Self {
            d_input,
            d_hidden,
            n_layers: 1,
            dropout: 0.0,
            initializer: GruCellConfig::new(d_input, d_hidden).initializer,
        }
    }

    /// Set the number of layers.
    pub fn with_n_layers(mut self, n_layers: usize) -> Self {
        self.n_layers = n_layers;
        self
    }

    /// Set the inter-layer dropout probability.
    pub fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout;
        self
    }

    /// Set the weight initializer.
    pub fn with_initializer(mut self, initializer: Initializer) -> Self {
        self.initializer = initializer;
        self
    }

    /// Initialize the stack.
    pub fn init<B: Backend>(&self, device: &B::Device) -> StackedGru<B> {
        let layers = (0..self.n_layers)
            .map(|layer| {
                let d_in = if layer == 0 { self.d_input } else { self.d_hidden };
                GruCellConfig::new(d_in, self.d_hidden)
                    .with_initializer(self.initializer.clone())
                    .init(device)
            })
            .collect();

        StackedGru {
            layers,
            dropout: DropoutConfig::new(self.dropout).init(),
            d_hidden: self.d_hidden,
        }
    }
}

/// Multi-layer GRU advanced one timestep at a time.
///
/// Dropout only takes effect on autodiff backends, matching Burn's
/// train/inference split.
#[derive(Module, Debug)]
pub struct StackedGru<B: Backend> {
    layers: Vec<GruCell<B>>,
    dropout: Dropout,
    #[module(skip)]
    d_hidden: usize,
}

impl<B: Backend> StackedGru<B> {
    /// Advance every layer by one timestep.
    ///
    /// # Arguments
    /// * `input` - `[batch, d_input]`
    /// * `state` - `[n_layers, batch, d_hidden]`
    ///
    /// # Returns
    /// * top-layer output `[batch, d_hidden]`
    /// * new state `[n_layers, batch, d_hidden]`
    pub fn step(&self, input: Tensor<B, 2>, state: Tensor<B, 3>) -> (Tensor<B, 2>, Tensor<B, 3>) {
        let [n_layers, batch_size, d_hidden] = state.dims();
        debug_assert_eq!(n_layers, self.layers.len());

        let mut x = input;
        let mut new_states = Vec::with_capacity(n_layers);

        for (layer, cell) in self.layers.iter().enumerate() {
            if layer > 0 {
                x = self.dropout.forward(x);
            }
            let hidden = state
                .clone()
                .slice([layer..layer + 1, 0..batch_size, 0..d_hidden])
                .reshape([batch_size, d_hidden]);

            let new_hidden = cell.step(x, hidden);
            new_states.push(new_hidden.clone().reshape([1, batch_size, d_hidden]));
            x = new_hidden;
        }

        (x, Tensor::cat(new_states, 0))
    }

    /// Zero state for `batch_size` sequences.
    pub fn initial_state(&self, batch_size: usize, device: &B::Device) -> Tensor<B, 3> {
        Tensor::zeros([self.layers.len(), batch_size, self.d_hidden], device)
    }

    /// Number of layers.
    pub fn n_layers(&self) -> usize {
        self.layers.len()
    }

    /// Hidden size of every layer.
    pub fn hidden_size(&self) -> usize {
        self.d_hidden
    }
}
