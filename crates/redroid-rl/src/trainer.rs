//! Episode training loop.
//!
//! Runs epochs until the crash is reproduced or the epoch budget runs out.
//! Strictly sequential: every environment call blocks, and the agent is
//! exclusively owned here.

use thiserror::Error;

use redroid_s2r::types::Step;

use crate::action::ActionRecord;
use crate::agent::{AgentError, QAgent};
use crate::env::Environment;
use crate::persist::{RunSink, SinkError, StepArtifact};
use crate::reward::{calculate_reward, shape_reward};
use crate::state::State;

#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// What a full run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// The crash described by the report was observed.
    pub reproduced: bool,
    pub epochs_run: u32,
    /// Cumulative shaped reward per epoch.
    pub epoch_rewards: Vec<f64>,
    /// The successful action sequence; empty unless `reproduced`.
    pub executed: Vec<ActionRecord>,
}

/// Train until the crash reproduces or the configured epochs are spent.
///
/// Each epoch restores the app, the full step list and the missing-step
/// budget, then steps until the crash fires (success) or the action set
/// empties (failure). The Q-table and reward history are persisted between
/// epochs; the successful action sequence is exported at the end.
pub fn run_training(
    env: &mut dyn Environment,
    agent: &mut QAgent,
    steps: &[Step],
    sink: &mut dyn RunSink,
) -> Result<RunOutcome, TrainError> {
    let cfg = agent.config().clone();
    let window = env.window_size();

    let mut reproduced = false;
    let mut epochs_run = 0;
    let mut epoch_rewards: Vec<f64> = Vec::new();
    let mut executed: Vec<ActionRecord> = Vec::new();

    for epoch in 0..cfg.training_epochs {
        epochs_run = epoch + 1;
        env.reset_app();
        let mut unmatched: Vec<Step> = steps.to_vec();
        let mut budget = cfg.allowed_missing_steps;
        executed.clear();
        let mut epoch_reward = 0.0;
        let mut step_no: u32 = 0;

        let snap = env.snapshot();
        let mut cur = State::from_snapshot(&snap.ui, &unmatched, budget, &cfg);

        loop {
            if cur.is_terminal() {
                tracing::info!(epoch, steps = step_no, "epoch failed: no action available");
                break;
            }
            agent.init_state_values(&cur, window);
            let action = agent.choose_action(&cur)?;
            let breakdown = calculate_reward(&action, &cfg);
            tracing::debug!(epoch, step = step_no, action = %action, "executing");

            env.execute(&action.event);
            executed.push(action.record());
            unmatched.retain(|s| s.index != action.step.index);
            if action.matched_with_noop() {
                budget = budget.saturating_sub(1);
            }

            let next_snap = env.snapshot();
            let next = State::from_snapshot(&next_snap.ui, &unmatched, budget, &cfg);

            sink.record_step(&StepArtifact {
                epoch,
                step: step_no,
                action: action.record(),
                reward: breakdown.clone(),
                state: cur.id_string().to_string(),
            })?;

            let reward = shape_reward(
                breakdown.total,
                cur.ui_signature(),
                next.ui_signature(),
                &cfg,
            );
            let crashed = env.is_crashed();
            agent.init_state_values(&next, window);
            agent.learn(cur.key(), action.key(), reward, next.key())?;
            epoch_reward += reward;
            step_no += 1;

            if crashed {
                tracing::info!(epoch, steps = step_no, "crash reproduced");
                reproduced = true;
                break;
            }
            cur = next;
        }

        epoch_rewards.push(epoch_reward);
        if reproduced {
            break;
        }
        if epoch + 1 < cfg.training_epochs {
            sink.persist_q_table(&agent.dump())?;
            sink.persist_rewards(&epoch_rewards)?;
        }
    }

    if reproduced {
        sink.export_success(&executed)?;
    } else {
        executed.clear();
    }

    Ok(RunOutcome {
        reproduced,
        epochs_run,
        epoch_rewards,
        executed,
    })
}
