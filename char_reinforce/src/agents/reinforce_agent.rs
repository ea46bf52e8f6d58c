//! Online REINFORCE agent.
//!
//! The agent interleaves acting and learning on a single call stream:
//!
//! ```text
//!   reward(r)  ──► attach r to the pending action ──► buffer
//!   next(c)    ──► [buffer ready?  update + clear] ──► forward ──► sample ──► symbol
//! ```
//!
//! The recurrent state is detached after every forward pass, so gradients
//! never reach past the step that produced an action. Each buffered
//! log-probability still owns the graph of its own step until the update
//! consumes it.

use burn::module::{AutodiffModule, Module};
use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::{Adam, AdamConfig, Optimizer};
use burn::tensor::backend::AutodiffBackend;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::config::AgentConfig;
use super::error::AgentError;
use super::{AgentPhase, Learner};
use crate::algorithms::action_policy::{CategoricalOutput, SampledAction};
use crate::algorithms::policy::Policy;
use crate::algorithms::reinforce::{reinforce_update, UpdateError, UpdateReport};
use crate::buffers::trajectory_buffer::TrajectoryBuffer;
use crate::core::alphabet::Alphabet;
use crate::core::policy_state::PolicyState;
use crate::metrics::agent_stats::AgentStats;

/// Adam over the policy parameters.
pub type PolicyOptimizer<B> = OptimizerAdaptor<Adam, Policy<B>, B>;

/// Character agent trained online with REINFORCE.
pub struct ReinforceAgent<B: AutodiffBackend, O = PolicyOptimizer<B>> {
    config: AgentConfig,
    policy: Policy<B>,
    optimizer: O,
    state: PolicyState<B>,
    buffer: TrajectoryBuffer<B>,
    phase: AgentPhase,
    /// Action emitted by the last `next`, waiting for its reward.
    pending: Option<SampledAction<B>>,
    prev_reward: f32,
    step: usize,
    last_learning_step: Option<usize>,
    stats: AgentStats,
    rng: StdRng,
    device: B::Device,
}

impl<B: AutodiffBackend> ReinforceAgent<B> {
    /// Build an agent with a fresh policy and Adam optimizer.
    pub fn new(config: AgentConfig, device: &B::Device) -> Result<Self, AgentError> {
        let optimizer = AdamConfig::new()
            .with_epsilon(config.reinforce.adam_epsilon)
            .init();
        Self::with_optimizer(config, device, optimizer)
    }
}

impl<B, O> ReinforceAgent<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<Policy<B>, B>,
{
    /// Build an agent with a caller-supplied optimizer.
    pub fn with_optimizer(
        config: AgentConfig,
        device: &B::Device,
        optimizer: O,
    ) -> Result<Self, AgentError> {
        config.validate()?;

        let policy = config.policy_config().init::<B>(device);
        let state = policy.init_state(device);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        log::debug!(
            "agent ready | {} symbols | {} parameters | update every {} steps",
            config.alphabet.len(),
            policy.num_params(),
            config.reinforce.reinforce_step
        );

        Ok(Self {
            config,
            policy,
            optimizer,
            state,
            buffer: TrajectoryBuffer::new(),
            phase: AgentPhase::AwaitingFirstInput,
            pending: None,
            prev_reward: 0.0,
            step: 0,
            last_learning_step: None,
            stats: AgentStats::new(),
            rng,
            device: device.clone(),
        })
    }

    /// Run an update if the buffer has reached the threshold.
    ///
    /// Abandoned updates are logged and counted; they never surface as an
    /// error to the harness.
    pub fn try_learning_step(&mut self) -> Option<UpdateReport> {
        if !self.buffer.is_ready(self.config.reinforce.reinforce_step) {
            return None;
        }

        let result = reinforce_update(
            &mut self.policy,
            &mut self.optimizer,
            &mut self.buffer,
            &self.config.reinforce,
            self.step,
        );

        match result {
            Ok(report) => {
                self.last_learning_step = Some(self.step);
                self.stats.record_update(&report);
                Some(report)
            }
            Err(err) => {
                match err {
                    UpdateError::DegenerateBatch { .. } => log::warn!(
                        "skipping update at step {}: {} ({} steps buffered)",
                        self.step,
                        err,
                        self.buffer.len()
                    ),
                    UpdateError::GradientOverflow { .. } => {
                        log::error!("skipping update at step {}: {}", self.step, err)
                    }
                    UpdateError::EmptyBatch => log::debug!("no update at step {}: {}", self.step, err),
                }
                self.stats.record_fault(&err);
                None
            }
        }
    }

    /// Symbols emitted so far.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Steps waiting in the trajectory buffer.
    pub fn buffered_steps(&self) -> usize {
        self.buffer.len()
    }

    /// Step at which the last successful update ran.
    pub fn last_learning_step(&self) -> Option<usize> {
        self.last_learning_step
    }

    /// Reward fed into the auxiliary encoder on the next step.
    pub fn prev_reward(&self) -> f32 {
        self.prev_reward
    }

    /// Where the agent is in the `reward` / `next` cycle.
    pub fn phase(&self) -> AgentPhase {
        self.phase
    }

    /// Interaction and learning counters.
    pub fn stats(&self) -> &AgentStats {
        &self.stats
    }

    /// Current recurrent state.
    pub fn state(&self) -> &PolicyState<B> {
        &self.state
    }

    /// Current policy.
    pub fn policy(&self) -> &Policy<B> {
        &self.policy
    }

    /// Policy without autodiff, for evaluation.
    pub fn inference_policy(&self) -> Policy<B::InnerBackend> {
        self.policy.valid()
    }

    /// The agent's alphabet.
    pub fn alphabet(&self) -> &Alphabet {
        &self.config.alphabet
    }

    /// The agent's configuration.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Device the policy lives on.
    pub fn device(&self) -> &B::Device {
        &self.device
    }
}

impl<B, O> Learner for ReinforceAgent<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<Policy<B>, B>,
{
    fn reward(&mut self, reward: Option<f32>) -> Result<(), AgentError> {
        let reward = reward.unwrap_or(0.0);
        if !reward.is_finite() {
            return Err(AgentError::NonFiniteReward { reward });
        }

        match self.phase {
            // Nothing has been emitted yet, so there is nothing to credit.
            AgentPhase::AwaitingFirstInput => Ok(()),
            AgentPhase::AwaitingInput => Err(AgentError::OutOfOrder {
                call: "reward",
                phase: self.phase,
            }),
            AgentPhase::AwaitingReward => {
                if let Some(action) = self.pending.take() {
                    self.buffer.push(action, reward);
                }
                self.prev_reward = reward;
                self.stats.record_reward(reward);
                self.phase = AgentPhase::AwaitingInput;
                Ok(())
            }
        }
    }

    fn next(&mut self, input: char) -> Result<char, AgentError> {
        if self.phase == AgentPhase::AwaitingReward {
            return Err(AgentError::OutOfOrder {
                call: "next",
                phase: self.phase,
            });
        }
        let encoded = self.config.alphabet.encode(input)?;

        self.try_learning_step();

        let input_index = if self.config.ignore_input { 0 } else { encoded };
        let (logits, state) = self
            .policy
            .forward(input_index, self.prev_reward, &self.state);
        self.state = state.detach();

        let output = CategoricalOutput::new(logits);
        let action = output.sample(&mut self.rng);
        let symbol = self.config.alphabet.decode(action.index)?;

        if self.step % self.config.diagnostic_interval == 0 {
            let (max_logit, max_prob) = output.confidence();
            log::info!(
                "step {} | input[{}][{}] output[{}][{}] | max logit {:.5} | max prob {:.5}",
                self.step, input_index, input, action.index, symbol, max_logit, max_prob
            );
        }

        self.pending = Some(action);
        self.phase = AgentPhase::AwaitingReward;
        self.step += 1;
        self.stats.record_step();
        Ok(symbol)
    }
}
