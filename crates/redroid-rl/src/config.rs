//! Engine configuration.
//!
//! One immutable value passed explicitly into state construction, reward
//! computation, the agent and the trainer. Optional `f64` fields combine a
//! feature toggle with its constant: `None` disables the heuristic.

use serde::{Deserialize, Serialize};

/// Corner regions and the init value of the menu/drawer suppression
/// heuristic (see [`RlConfig::menu_drawer`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuDrawerHeuristic {
    /// Exponent applied to `reward_scale_base` to produce the distinct,
    /// very low initial Q of a suppressed chrome action.
    pub init_q_scale: i32,
    /// Top-left region that hosts the navigation-drawer toggle.
    pub drawer_max_x: i32,
    pub drawer_max_y: i32,
    /// The overflow menu sits within this many pixels of the right edge.
    pub menu_inset_x: i32,
    pub menu_max_y: i32,
}

impl Default for MenuDrawerHeuristic {
    fn default() -> Self {
        Self {
            init_q_scale: -10,
            drawer_max_x: 154,
            drawer_max_y: 223,
            menu_inset_x: 111,
            menu_max_y: 212,
        }
    }
}

/// All tunables of the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RlConfig {
    /// Package name of the app under test; elements owned by any other
    /// package are invisible to the engine (permission dialogs excepted).
    pub package: String,

    // Q-learning core.
    pub learning_rate: f64,
    pub discount_factor: f64,
    pub epsilon: f64,
    /// Subtracted from a state's epsilon each time that state is consulted,
    /// when `state_based_epsilon` is on.
    pub epsilon_decay: f64,
    pub state_based_epsilon: bool,
    pub training_epochs: u32,

    // Step matching.
    pub allowed_missing_steps: u32,
    /// Filler typed into editable fields when a step names no input value.
    pub default_input_text: String,
    /// Offer every unmatched step at once instead of strictly in order.
    pub out_of_order_match: bool,
    /// Keep offering no-op actions after every real step has been consumed.
    pub match_missing_after_all_steps: bool,
    pub enable_action_type_tweak: bool,
    pub action_type_tweak_threshold: f64,
    pub text_from_siblings: bool,

    // Reward model.
    pub missing_step_penalty: f64,
    pub failure_penalty: f64,
    pub reward_scale_base: f64,
    /// Positive components below this floor are dropped as noise.
    pub reward_bar: f64,
    pub textual_similarity_reward: bool,
    pub include_resource_id_similarity: bool,
    pub input_adhoc_reward: Option<f64>,
    pub rotate_reward: Option<f64>,
    pub scroll_reward: Option<f64>,
    pub swipe_reward: Option<f64>,
    /// Override the reward with `failure_penalty` when the action left the
    /// UI signature unchanged.
    pub exploration_shaping: bool,

    // Lazy Q-value initialization.
    pub rotate_init_q: Option<f64>,
    pub swipe_init_q: Option<f64>,
    pub scroll_init_q: Option<f64>,
    /// Floor for the initial Q of any action matching an INPUT step.
    pub input_init_q: Option<f64>,
    /// Bonus for clicking an "OK" surface with no step to match, so stray
    /// dialogs get dismissed early.
    pub ok_dialog_init_q: Option<f64>,
    pub menu_drawer: Option<MenuDrawerHeuristic>,

    pub rng_seed: u64,
}

impl Default for RlConfig {
    fn default() -> Self {
        Self {
            package: String::new(),
            learning_rate: 0.1,
            discount_factor: 0.95,
            epsilon: 0.2,
            epsilon_decay: 0.05,
            state_based_epsilon: true,
            training_epochs: 20,
            allowed_missing_steps: 2,
            default_input_text: "Hello World".to_string(),
            out_of_order_match: false,
            match_missing_after_all_steps: false,
            enable_action_type_tweak: true,
            action_type_tweak_threshold: 0.8,
            text_from_siblings: true,
            missing_step_penalty: -0.5,
            failure_penalty: -5.0,
            reward_scale_base: 2.0,
            reward_bar: 0.4,
            textual_similarity_reward: true,
            include_resource_id_similarity: true,
            input_adhoc_reward: Some(0.7),
            rotate_reward: Some(0.5),
            scroll_reward: Some(0.5),
            swipe_reward: Some(0.5),
            exploration_shaping: true,
            rotate_init_q: Some(1.0),
            swipe_init_q: Some(0.8),
            scroll_init_q: Some(0.8),
            input_init_q: Some(0.8),
            ok_dialog_init_q: Some(0.8),
            menu_drawer: Some(MenuDrawerHeuristic::default()),
            rng_seed: 42,
        }
    }
}

impl RlConfig {
    pub fn for_package(package: &str) -> Self {
        Self {
            package: package.to_string(),
            ..Self::default()
        }
    }

    /// The distinct low init value for suppressed menu/drawer chrome.
    pub fn menu_drawer_init_q(&self, heuristic: &MenuDrawerHeuristic) -> f64 {
        self.reward_scale_base.powi(heuristic.init_q_scale)
    }
}
