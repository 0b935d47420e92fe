use serde::{Deserialize, Serialize};

/// UI-action category predicted by the extraction pipeline for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    #[serde(rename = "CLICK")]
    Click,
    #[serde(rename = "LONG_CLICK", alias = "LONG CLICK")]
    LongClick,
    #[serde(rename = "INPUT")]
    Input,
    #[serde(rename = "SCROLL")]
    Scroll,
    #[serde(rename = "SWIPE")]
    Swipe,
    #[serde(rename = "ROTATE")]
    Rotate,
}

impl ActionType {
    pub fn tag(&self) -> &'static str {
        match self {
            ActionType::Click => "CLICK",
            ActionType::LongClick => "LONG_CLICK",
            ActionType::Input => "INPUT",
            ActionType::Scroll => "SCROLL",
            ActionType::Swipe => "SWIPE",
            ActionType::Rotate => "ROTATE",
        }
    }
}

/// One candidate interpretation of a step as a concrete UI action.
///
/// A step usually carries one variant; ambiguous phrasing can produce
/// several, ranked by `action_similarity`, with only the best ones enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionVariant {
    pub action: ActionType,
    #[serde(default)]
    pub target_word: String,
    #[serde(default)]
    pub action_word: String,
    #[serde(default)]
    pub input_value: String,
    #[serde(default)]
    pub action_similarity: f64,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub swipe_direction: String,
    #[serde(default)]
    pub scroll_direction: String,
    #[serde(default)]
    pub position_direction: Vec<String>,
    #[serde(default)]
    pub position_view: Vec<String>,
}

impl ActionVariant {
    /// A bare variant with only the action type set. Test and tweak helper.
    pub fn of(action: ActionType) -> Self {
        Self {
            action,
            target_word: String::new(),
            action_word: String::new(),
            input_value: String::new(),
            action_similarity: 0.0,
            enabled: false,
            swipe_direction: String::new(),
            scroll_direction: String::new(),
            position_direction: Vec::new(),
            position_view: Vec::new(),
        }
    }
}

/// One reproduction step extracted from the bug report.
///
/// Subject/relation/object keep the extraction provenance for debugging; the
/// engine itself only consults `index`, `sentence` and `ui_actions`.
///
/// Invariant: a step is the no-op sentinel iff its `sentence` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub index: i32,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub relation: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub sentence: String,
    #[serde(default)]
    pub ui_actions: Vec<ActionVariant>,
}

impl Step {
    /// The no-op sentinel: "no specific instruction", used when the agent is
    /// allowed to spend a missing-step budget entry on free exploration.
    pub fn noop() -> Self {
        Self {
            index: -1,
            subject: String::new(),
            relation: String::new(),
            object: String::new(),
            sentence: String::new(),
            ui_actions: Vec::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.sentence.is_empty()
    }

    /// Action type of the first variant. `None` for the no-op sentinel.
    pub fn first_action_type(&self) -> Option<ActionType> {
        if self.is_noop() {
            return None;
        }
        self.ui_actions.first().map(|a| a.action)
    }

    pub fn target_word(&self) -> &str {
        if self.is_noop() {
            return "";
        }
        self.ui_actions.first().map_or("", |a| &a.target_word)
    }

    pub fn action_word(&self) -> &str {
        if self.is_noop() {
            return "";
        }
        self.ui_actions.first().map_or("", |a| &a.action_word)
    }

    pub fn input_value(&self) -> &str {
        if self.is_noop() {
            return "";
        }
        self.ui_actions.first().map_or("", |a| &a.input_value)
    }

    pub fn swipe_direction(&self) -> &str {
        self.ui_actions.first().map_or("", |a| &a.swipe_direction)
    }

    pub fn scroll_direction(&self) -> &str {
        self.ui_actions.first().map_or("", |a| &a.scroll_direction)
    }

    /// Split a step with multiple predicted variants into one step per
    /// *enabled* variant. All other fields are copied verbatim.
    pub fn decompose(&self) -> Vec<Step> {
        self.ui_actions
            .iter()
            .filter(|a| a.enabled)
            .map(|a| Step {
                ui_actions: vec![a.clone()],
                ..self.clone()
            })
            .collect()
    }

    /// Deterministic rendering with a fixed field order, used as the step
    /// half of an Action's identity string. Stable across runs so persisted
    /// Q-tables stay comparable.
    pub fn canonical_string(&self) -> String {
        let variants: Vec<String> = self
            .ui_actions
            .iter()
            .map(|a| {
                format!(
                    "{}|{}|{}|{}|{}|{}|{}",
                    a.action.tag(),
                    a.target_word,
                    a.action_word,
                    a.input_value,
                    a.swipe_direction,
                    a.scroll_direction,
                    a.enabled
                )
            })
            .collect();
        format!(
            "index={};subject={};relation={};object={};sentence={};actions=[{}]",
            self.index,
            self.subject,
            self.relation,
            self.object,
            self.sentence,
            variants.join(",")
        )
    }
}
