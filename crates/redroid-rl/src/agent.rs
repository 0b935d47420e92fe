//! Q-learning agent: value table, lazy initialization heuristics,
//! epsilon-greedy selection, and the one-step learning update.

use std::collections::{BTreeMap, HashMap};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use redroid_s2r::types::ActionType;

use crate::action::{Action, ActionRecord};
use crate::config::{MenuDrawerHeuristic, RlConfig};
use crate::event::EventAction;
use crate::hash::{ActionKey, StateKey};
use crate::reward::calculate_reward;
use crate::state::State;

/// Agent-logic faults. These indicate corrupted State/Q-table invariants and
/// are escalated to the caller, never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AgentError {
    #[error("no selectable action in state {0}")]
    NoAction(StateKey),
    #[error("q-value missing for state {state}, action {action}")]
    Uninitialized { state: StateKey, action: ActionKey },
}

/// Serializable Q-table artifact: hash-keyed values plus the side tables
/// that recover the canonical state string and the action record from each
/// hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTableDump {
    pub q_values: BTreeMap<String, BTreeMap<String, f64>>,
    pub states: BTreeMap<String, String>,
    pub actions: BTreeMap<String, ActionRecord>,
}

const IMAGE_CLASSES: &[&str] = &["android.widget.ImageView", "android.widget.ImageButton"];

/// The learner. Exclusively owned by the single training loop; no locking.
pub struct QAgent {
    cfg: RlConfig,
    rng: ChaCha8Rng,
    q_table: HashMap<StateKey, HashMap<ActionKey, f64>>,
    epsilon_table: HashMap<StateKey, f64>,
    // Hash-to-object indexes: persistence and heuristics need the objects
    // back, not just their keys. Lifetime matches the agent's.
    states: HashMap<StateKey, State>,
    actions: HashMap<ActionKey, Action>,
}

impl QAgent {
    pub fn new(cfg: RlConfig) -> QAgent {
        let rng = ChaCha8Rng::seed_from_u64(cfg.rng_seed);
        QAgent {
            cfg,
            rng,
            q_table: HashMap::new(),
            epsilon_table: HashMap::new(),
            states: HashMap::new(),
            actions: HashMap::new(),
        }
    }

    pub fn config(&self) -> &RlConfig {
        &self.cfg
    }

    /// Lazily initialize Q-values for every action of a newly observed
    /// state. Entries that already exist are left untouched.
    ///
    /// With no unmatched steps left there is nothing to guide the estimate
    /// and every action starts at the missing-step penalty. Otherwise fixed
    /// bonuses apply in priority order (rotate step, swipe event, scroll
    /// event, "OK"-dialog dismissal), falling back to the computed reward.
    /// Actions matching an INPUT step are floored, and on the very first
    /// state the menu/drawer chrome heuristic suppresses corner buttons.
    pub fn init_state_values(&mut self, state: &State, window: (u32, u32)) {
        let skey = state.key();
        self.q_table.entry(skey).or_default();
        let first_state = self.q_table.len() == 1;
        self.states.entry(skey).or_insert_with(|| state.clone());

        let cfg = &self.cfg;
        let mut fresh: Vec<(ActionKey, f64)> = Vec::new();
        if let Some(table) = self.q_table.get(&skey) {
            for action in &state.actions {
                let akey = action.key();
                if table.contains_key(&akey) {
                    continue;
                }
                let mut q = if state.unmatched.is_empty() {
                    cfg.missing_step_penalty
                } else {
                    initial_estimate(action, cfg)
                };
                if let Some(floor) = cfg.input_init_q {
                    if action.step.first_action_type() == Some(ActionType::Input) {
                        q = q.max(floor);
                    }
                }
                if first_state {
                    if let Some(h) = &cfg.menu_drawer {
                        if is_menu_or_drawer_chrome(action, window, h) {
                            q = cfg.menu_drawer_init_q(h);
                        }
                    }
                }
                tracing::debug!(state = %skey, action = %akey, q, "initialized q-value");
                fresh.push((akey, q));
            }
        }

        for action in &state.actions {
            let akey = action.key();
            self.actions.entry(akey).or_insert_with(|| action.clone());
        }
        if let Some(table) = self.q_table.get_mut(&skey) {
            table.extend(fresh);
        }
    }

    /// Epsilon-greedy selection over the state's action set.
    ///
    /// Exploit: maximum existing Q, ties broken uniformly at random,
    /// uninitialized actions logged and skipped. Explore: uniform over the
    /// non-greedy actions whose value is above the failure penalty, falling
    /// back to the greedy pick when nothing remains. Failure to select at
    /// all is an invariant violation surfaced as [`AgentError::NoAction`].
    pub fn choose_action(&mut self, state: &State) -> Result<Action, AgentError> {
        let skey = state.key();
        if state.actions.is_empty() {
            return Err(AgentError::NoAction(skey));
        }
        let epsilon = self.consult_epsilon(skey);
        let explore = self.rng.gen::<f64>() < epsilon;

        let mut candidates: Vec<&Action> = state.actions.iter().collect();
        candidates.shuffle(&mut self.rng);

        let entries = self.q_table.get(&skey);
        let mut greedy: Option<(&Action, f64)> = None;
        for &action in &candidates {
            let akey = action.key();
            let q = match entries.and_then(|m| m.get(&akey)) {
                Some(q) => *q,
                None => {
                    tracing::warn!(state = %skey, action = %akey, "skipping uninitialized action");
                    continue;
                }
            };
            if greedy.map_or(true, |(_, best)| q > best) {
                greedy = Some((action, q));
            }
        }

        let chosen: Option<&Action> = if explore || greedy.is_none() {
            let greedy_key = greedy.map(|(a, _)| a.key());
            let mut pool: Vec<&Action> = Vec::new();
            for &action in &candidates {
                let akey = action.key();
                if Some(akey) == greedy_key {
                    continue;
                }
                if let Some(q) = entries.and_then(|m| m.get(&akey)) {
                    if *q <= self.cfg.failure_penalty {
                        continue;
                    }
                    pool.push(action);
                }
            }
            pool.choose(&mut self.rng)
                .copied()
                .or_else(|| greedy.map(|(a, _)| a))
        } else {
            greedy.map(|(a, _)| a)
        };

        chosen.cloned().ok_or(AgentError::NoAction(skey))
    }

    /// One-step Bellman update. A next state absent from the table is only
    /// reachable through failure and contributes the failure penalty as its
    /// max term.
    pub fn learn(
        &mut self,
        cur: StateKey,
        action: ActionKey,
        reward: f64,
        next: StateKey,
    ) -> Result<(), AgentError> {
        let max_next = self
            .q_table
            .get(&next)
            .and_then(|m| {
                m.values()
                    .copied()
                    .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.max(v))))
            })
            .unwrap_or(self.cfg.failure_penalty);
        let (lr, discount) = (self.cfg.learning_rate, self.cfg.discount_factor);
        let q = self
            .q_table
            .get_mut(&cur)
            .and_then(|m| m.get_mut(&action))
            .ok_or(AgentError::Uninitialized { state: cur, action })?;
        *q += lr * (reward + discount * max_next - *q);
        Ok(())
    }

    pub fn q_value(&self, state: StateKey, action: ActionKey) -> Option<f64> {
        self.q_table.get(&state).and_then(|m| m.get(&action)).copied()
    }

    /// Epsilon the next consultation of `state` would use.
    pub fn current_epsilon(&self, state: StateKey) -> f64 {
        if !self.cfg.state_based_epsilon {
            return self.cfg.epsilon;
        }
        self.epsilon_table
            .get(&state)
            .copied()
            .unwrap_or(self.cfg.epsilon)
    }

    fn consult_epsilon(&mut self, skey: StateKey) -> f64 {
        if !self.cfg.state_based_epsilon {
            return self.cfg.epsilon;
        }
        let entry = self.epsilon_table.entry(skey).or_insert(self.cfg.epsilon);
        let epsilon = *entry;
        *entry = (epsilon - self.cfg.epsilon_decay).max(0.0);
        epsilon
    }

    pub fn dump(&self) -> QTableDump {
        let q_values = self
            .q_table
            .iter()
            .map(|(s, m)| {
                (
                    s.to_string(),
                    m.iter().map(|(a, q)| (a.to_string(), *q)).collect(),
                )
            })
            .collect();
        let states = self
            .states
            .iter()
            .map(|(k, s)| (k.to_string(), s.id_string().to_string()))
            .collect();
        let actions = self
            .actions
            .iter()
            .map(|(k, a)| (k.to_string(), a.record()))
            .collect();
        QTableDump {
            q_values,
            states,
            actions,
        }
    }
}

/// Init heuristics in priority order, falling back to the reward model.
fn initial_estimate(action: &Action, cfg: &RlConfig) -> f64 {
    if let Some(v) = cfg.rotate_init_q {
        if action.step.first_action_type() == Some(ActionType::Rotate) {
            return v;
        }
    }
    if let Some(v) = cfg.swipe_init_q {
        if action.event.action == EventAction::Swipe {
            return v;
        }
    }
    if let Some(v) = cfg.scroll_init_q {
        if action.event.action == EventAction::Scroll {
            return v;
        }
    }
    if let Some(v) = cfg.ok_dialog_init_q {
        if action.event.action == EventAction::Click
            && action.matched_with_noop()
            && action.event.target.texts.iter().any(|t| t == "OK")
        {
            return v;
        }
    }
    calculate_reward(action, cfg).total
}

/// Navigation-drawer toggles and overflow menus are image buttons in the
/// top screen corners whose description says "open ..." or "... options".
/// Exploring them early leads away from the reported flow.
fn is_menu_or_drawer_chrome(
    action: &Action,
    window: (u32, u32),
    h: &MenuDrawerHeuristic,
) -> bool {
    if !action.matched_with_noop() || action.event.action != EventAction::Click {
        return false;
    }
    let el = &action.event.target.element;
    if !IMAGE_CLASSES.contains(&el.class.as_str()) {
        return false;
    }
    let (cx, cy) = el.bounds.center();
    let desc = el.content_desc.to_lowercase();
    let drawer = cx < h.drawer_max_x && cy < h.drawer_max_y && desc.contains("open");
    let menu = cx > window.0 as i32 - h.menu_inset_x && cy < h.menu_max_y && desc.contains("option");
    drawer || menu
}
