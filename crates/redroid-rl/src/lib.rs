//! Q-learning engine that reproduces a reported crash by driving an app's UI.
//!
//! The extraction pipeline turns a bug report into ordered reproduction
//! steps; this crate matches those steps against live screens and learns
//! which concrete actions advance toward the crash. The MDP is custom: states
//! are canonicalized UI snapshots plus the remaining steps and a missing-step
//! budget, and the action set is generated per state from element
//! capabilities. Episodes run until the crash is observed or the action set
//! empties.

pub mod action;
pub mod agent;
pub mod config;
pub mod env;
pub mod event;
pub mod hash;
pub mod logging;
pub mod persist;
pub mod reward;
pub mod state;
pub mod trainer;

pub use action::{Action, ActionRecord};
pub use agent::{AgentError, QAgent, QTableDump};
pub use config::RlConfig;
pub use env::{Environment, ScriptedEnvironment, Snapshot};
pub use event::{Event, EventAction, EventRecord};
pub use hash::{digest64, ActionKey, StateKey};
pub use persist::{JsonDirSink, NullSink, RunSink, SinkError, StepArtifact};
pub use reward::{calculate_reward, shape_reward, RewardBreakdown};
pub use state::State;
pub use trainer::{run_training, RunOutcome, TrainError};
