//! Behavioral tests for the agents driven through the `Learner` protocol.

use super::*;
use crate::algorithms::grad_norm::global_grad_norm;
use crate::algorithms::policy::PolicyConfig;
use crate::algorithms::reinforce::ReinforceConfig;
use crate::algorithms::returns::SignalPairing;
use crate::core::alphabet::{Alphabet, UnknownSymbolError};
use burn::backend::{Autodiff, NdArray};
use burn::optim::GradientsParams;
use burn::tensor::Tensor;

// ============================================================================
// Test Backend Types
// ============================================================================

type B = Autodiff<NdArray<f32>>;

// ============================================================================
// Test Helper Functions
// ============================================================================

fn small_policy() -> PolicyConfig {
    PolicyConfig::default()
        .with_obs_hidden_size(8)
        .with_aux_hidden_size(4)
        .with_obs_n_layers(2)
        .with_aux_n_layers(2)
}

fn small_config(symbols: &str) -> AgentConfig {
    AgentConfig::new()
        .with_alphabet(Alphabet::new(symbols).unwrap())
        .with_policy(small_policy())
        .with_seed(7)
}

fn agent(config: AgentConfig) -> ReinforceAgent<B> {
    ReinforceAgent::new(config, &Default::default()).unwrap()
}

/// Opening turn: the harness sends no reward before the first symbol.
fn warm_up<L: Learner>(learner: &mut L, input: char) -> char {
    learner.reward(None).unwrap();
    learner.next(input).unwrap()
}

/// One `reward` + `next` exchange.
fn exchange<L: Learner>(learner: &mut L, reward: f32, input: char) -> char {
    learner.reward(Some(reward)).unwrap();
    learner.next(input).unwrap()
}

// ============================================================================
// ReinforceAgent: protocol
// ============================================================================

#[test]
fn test_new_agent_is_idle() {
    let agent = agent(small_config("abc"));
    assert_eq!(agent.step(), 0);
    assert_eq!(agent.buffered_steps(), 0);
    assert_eq!(agent.last_learning_step(), None);
    assert_eq!(agent.phase(), AgentPhase::AwaitingFirstInput);
    assert_eq!(agent.policy().vocab_size(), 3);
    assert!(agent.state().obs_values().iter().all(|v| *v == 0.0));
}

#[test]
fn test_invalid_config_rejected() {
    let config = small_config("abc").with_reinforce_step(0);
    assert!(matches!(
        ReinforceAgent::<B>::new(config, &Default::default()),
        Err(AgentError::Config(ConfigError::InvalidCount {
            field: "reinforce_step",
            ..
        }))
    ));
}

#[test]
fn test_reward_before_first_action_is_ignored() {
    let mut agent = agent(small_config("abc"));
    agent.reward(Some(5.0)).unwrap();
    agent.reward(None).unwrap();

    assert_eq!(agent.prev_reward(), 0.0);
    assert_eq!(agent.buffered_steps(), 0);
    assert_eq!(agent.stats().rewarded_steps(), 0);
}

#[test]
fn test_output_is_in_alphabet() {
    let mut agent = agent(small_config("xyz"));
    let mut output = warm_up(&mut agent, 'x');
    for _ in 0..20 {
        assert!(agent.alphabet().contains(output));
        output = exchange(&mut agent, 0.0, 'y');
    }
}

#[test]
fn test_none_reward_counts_as_zero() {
    let mut agent = agent(small_config("ab"));
    warm_up(&mut agent, 'a');
    agent.reward(None).unwrap();

    assert_eq!(agent.prev_reward(), 0.0);
    assert_eq!(agent.buffered_steps(), 1);
}

#[test]
fn test_out_of_order_calls() {
    let mut agent = agent(small_config("ab"));
    warm_up(&mut agent, 'a');

    assert_eq!(
        agent.next('a'),
        Err(AgentError::OutOfOrder {
            call: "next",
            phase: AgentPhase::AwaitingReward
        })
    );

    agent.reward(Some(1.0)).unwrap();
    assert_eq!(
        agent.reward(Some(1.0)),
        Err(AgentError::OutOfOrder {
            call: "reward",
            phase: AgentPhase::AwaitingInput
        })
    );

    // The rejected calls left the exchange intact
    assert_eq!(agent.buffered_steps(), 1);
    assert_eq!(agent.prev_reward(), 1.0);
    assert!(agent.next('b').is_ok());
}

/// Policy gradient norm of a loss built from `state` and a fresh weight leaf.
fn state_grad_norm(agent: &ReinforceAgent<B>, state: &crate::core::PolicyState<B>) -> f32 {
    let weight: Tensor<B, 1> = Tensor::ones([1], agent.device()).require_grad();
    let loss = state.obs.clone().sum() * weight.clone() + state.aux.clone().sum() * weight;
    let grads = GradientsParams::from_grads(loss.backward(), agent.policy());
    global_grad_norm(agent.policy(), &grads)
}

#[test]
fn test_state_detached_after_next() {
    let mut agent = agent(small_config("ab"));
    warm_up(&mut agent, 'b');
    assert!(agent.state().obs_values().iter().any(|v| *v != 0.0));

    // The stored state carries no lineage back into the policy
    assert_eq!(state_grad_norm(&agent, agent.state()), 0.0);

    // The same forward pass without detaching does
    let (_, attached) = agent.policy().forward(1, 0.0, agent.state());
    assert!(state_grad_norm(&agent, &attached) > 0.0);
}

#[test]
fn test_non_finite_reward_rejected() {
    let mut agent = agent(small_config("ab").with_reinforce_step(1));
    warm_up(&mut agent, 'a');

    for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
        assert!(matches!(
            agent.reward(Some(bad)),
            Err(AgentError::NonFiniteReward { .. })
        ));
    }
    assert_eq!(agent.phase(), AgentPhase::AwaitingReward);
    assert_eq!(agent.buffered_steps(), 0);
    assert_eq!(agent.prev_reward(), 0.0);
    assert_eq!(agent.stats().rewarded_steps(), 0);

    // Learning carries on once valid rewards arrive
    agent.reward(Some(0.0)).unwrap();
    agent.next('a').unwrap();
    for i in 0..19 {
        exchange(&mut agent, (i % 2) as f32, 'b');
    }

    assert_eq!(agent.stats().updates(), 20);
    assert_eq!(agent.stats().skipped_updates(), 0);
    assert_eq!(agent.buffered_steps(), 0);
}

// ============================================================================
// ReinforceAgent: learning
// ============================================================================

#[test]
fn test_single_step_update() {
    let mut agent = agent(small_config("ab").with_reinforce_step(1));
    let before = agent.policy().parameter_values();

    warm_up(&mut agent, 'a');
    assert_eq!(agent.stats().updates(), 0);

    exchange(&mut agent, 1.0, 'b');

    assert_eq!(agent.stats().updates(), 1);
    assert_eq!(agent.last_learning_step(), Some(1));
    assert_eq!(agent.buffered_steps(), 0);

    let report = agent.stats().last_update().copied().unwrap();
    assert_eq!(report.n_actions, 1);
    assert!((report.cumulative_reward - 1.0).abs() < 1e-6);
    assert!(report.grad_norm.is_finite());

    let after = agent.policy().parameter_values();
    assert!(before.iter().zip(after.iter()).any(|(a, b)| a != b));
}

#[test]
fn test_unknown_symbol_leaves_state_unchanged() {
    let mut agent = agent(small_config("ab").with_reinforce_step(1));
    warm_up(&mut agent, 'a');
    agent.reward(Some(1.0)).unwrap();

    let obs = agent.state().obs_values();
    let aux = agent.state().aux_values();
    let params = agent.policy().parameter_values();

    assert_eq!(
        agent.next('★'),
        Err(AgentError::UnknownSymbol(UnknownSymbolError { symbol: '★' }))
    );

    assert_eq!(agent.step(), 1);
    assert_eq!(agent.phase(), AgentPhase::AwaitingInput);
    assert_eq!(agent.buffered_steps(), 1);
    assert_eq!(agent.stats().updates(), 0);
    assert_eq!(agent.state().obs_values(), obs);
    assert_eq!(agent.state().aux_values(), aux);
    assert_eq!(agent.policy().parameter_values(), params);

    // A valid symbol afterwards proceeds normally
    assert!(agent.next('b').is_ok());
    assert_eq!(agent.stats().updates(), 1);
}

#[test]
fn test_below_threshold_does_not_learn() {
    let mut agent = agent(small_config("ab").with_reinforce_step(5));
    let before = agent.policy().parameter_values();

    warm_up(&mut agent, 'a');
    for _ in 0..3 {
        exchange(&mut agent, 1.0, 'a');
    }

    assert_eq!(agent.buffered_steps(), 3);
    assert_eq!(agent.last_learning_step(), None);
    assert_eq!(agent.stats().updates(), 0);
    assert_eq!(agent.policy().parameter_values(), before);
}

#[test]
fn test_two_hundred_steps_two_updates() {
    let mut agent = agent(small_config("abc"));
    assert_eq!(agent.config().reinforce.reinforce_step, 100);

    warm_up(&mut agent, 'a');
    for _ in 0..200 {
        exchange(&mut agent, 0.0, 'b');
    }

    assert_eq!(agent.stats().updates(), 2);
    assert_eq!(agent.last_learning_step(), Some(200));
    assert_eq!(agent.buffered_steps(), 0);
    assert_eq!(agent.step(), 201);
    assert_eq!(agent.stats().steps(), 201);
    assert_eq!(agent.stats().rewarded_steps(), 200);
    assert_eq!(agent.stats().skipped_updates(), 0);
}

#[test]
fn test_degenerate_batch_is_contained() {
    let reinforce = ReinforceConfig::new()
        .with_reinforce_step(2)
        .with_gamma(0.5)
        .with_pairing(SignalPairing::PerAction);
    let mut agent = agent(small_config("ab").with_reinforce(reinforce));
    let before = agent.policy().parameter_values();

    warm_up(&mut agent, 'a');
    exchange(&mut agent, 0.0, 'a');
    exchange(&mut agent, 0.0, 'a');

    // Constant signal: update abandoned, buffer kept for the next trigger
    assert_eq!(agent.stats().degenerate_batches(), 1);
    assert_eq!(agent.stats().updates(), 0);
    assert_eq!(agent.buffered_steps(), 2);
    assert_eq!(agent.policy().parameter_values(), before);

    exchange(&mut agent, 1.0, 'b');

    assert_eq!(agent.stats().updates(), 1);
    assert_eq!(agent.buffered_steps(), 0);
    assert_eq!(agent.stats().last_update().map(|r| r.n_actions), Some(3));
}

#[test]
fn test_micro_variant_learns_every_step() {
    let config = AgentConfig::micro()
        .with_alphabet(Alphabet::new("abc").unwrap())
        .with_policy(small_policy())
        .with_seed(3);
    let mut agent = agent(config);

    warm_up(&mut agent, 'a');
    for i in 0..5 {
        exchange(&mut agent, (i % 2) as f32, 'c');
    }

    assert_eq!(agent.stats().updates(), 5);
    assert_eq!(agent.last_learning_step(), Some(5));

    // Input is ignored by the network but still validated
    agent.reward(Some(0.0)).unwrap();
    assert!(matches!(agent.next('?'), Err(AgentError::UnknownSymbol(_))));
}

#[test]
fn test_inference_policy_matches_sizes() {
    let agent = agent(small_config("abcd"));
    let policy = agent.inference_policy();
    let state = policy.init_state(agent.device());
    let (logits, _) = policy.forward(1, 0.0, &state);
    assert_eq!(logits.dims(), [1, 4]);
}

// ============================================================================
// ScanningAgent
// ============================================================================

#[test]
fn test_scanning_agent_searches_and_holds() {
    let mut agent = ScanningAgent::new(Alphabet::new("abc").unwrap());

    // The opening `None` reward already counts as a miss
    assert_eq!(warm_up(&mut agent, 'a'), 'b');
    assert_eq!(exchange(&mut agent, 0.0, 'a'), 'c');
    assert!(agent.is_searching());

    assert_eq!(exchange(&mut agent, 1.0, 'a'), 'c');
    assert!(!agent.is_searching());
    assert_eq!(exchange(&mut agent, 1.0, 'a'), 'c');

    // Losing the reward restarts the scan from the first symbol
    assert_eq!(exchange(&mut agent, 0.0, 'a'), 'a');
    assert!(agent.is_searching());
    assert_eq!(agent.pointer(), 0);
}

#[test]
fn test_scanning_agent_wraps_around() {
    let mut agent = ScanningAgent::new(Alphabet::new("ab").unwrap());
    warm_up(&mut agent, 'a');
    assert_eq!(exchange(&mut agent, -1.0, 'a'), 'a');
    assert_eq!(exchange(&mut agent, -1.0, 'a'), 'b');
}

#[test]
fn test_scanning_agent_rejects_unknown_symbol() {
    let mut agent = ScanningAgent::default();
    agent.reward(None).unwrap();
    assert_eq!(
        agent.next('★'),
        Err(AgentError::UnknownSymbol(UnknownSymbolError { symbol: '★' }))
    );
}
