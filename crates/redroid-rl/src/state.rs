//! MDP states: a canonicalized screen, the remaining steps, and the
//! missing-step budget, plus the legal action set generated for it.

use redroid_s2r::types::{ActionType, Step};
use redroid_ui::{word_similarity, UiElement, UiTarget, UiTree};

use crate::action::Action;
use crate::config::RlConfig;
use crate::event::{Event, EventAction};
use crate::hash::{digest64, StateKey};

/// One node of the MDP.
///
/// Identity is structural: the canonical string combines the screen's sorted
/// leaf signature (volatile fields blanked), the sorted indices of unmatched
/// steps, and the remaining budget. Two states with the same canonical
/// string are the same node no matter how they were observed. A state whose
/// action set is empty is terminal failure.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub targets: Vec<UiTarget>,
    pub unmatched: Vec<Step>,
    pub remaining_missing: u32,
    ui_signature: String,
    id_string: String,
    pub actions: Vec<Action>,
}

impl State {
    pub fn from_snapshot(
        tree: &UiTree,
        unmatched: &[Step],
        remaining_missing: u32,
        cfg: &RlConfig,
    ) -> State {
        let targets = tree.interactable_targets(&cfg.package, cfg.text_from_siblings);
        let ui_signature = tree.canonical_signature(&cfg.package);
        // The state owns its step copies: tweak mutates them without
        // touching the trainer's master list.
        let mut unmatched: Vec<Step> = unmatched.to_vec();
        let actions = generate_actions(&targets, &mut unmatched, remaining_missing, cfg);

        let mut indices: Vec<i32> = unmatched.iter().map(|s| s.index).collect();
        indices.sort_unstable();
        let id_string = format!("{ui_signature} {indices:?} {remaining_missing}");

        State {
            targets,
            unmatched,
            remaining_missing,
            ui_signature,
            id_string,
            actions,
        }
    }

    pub fn key(&self) -> StateKey {
        StateKey(digest64(&self.id_string))
    }

    pub fn id_string(&self) -> &str {
        &self.id_string
    }

    pub fn ui_signature(&self) -> &str {
        &self.ui_signature
    }

    /// No legal action: the epoch ends in failure here.
    pub fn is_terminal(&self) -> bool {
        self.actions.is_empty()
    }
}

fn generate_actions(
    targets: &[UiTarget],
    unmatched: &mut [Step],
    budget: u32,
    cfg: &RlConfig,
) -> Vec<Action> {
    if targets.is_empty() {
        // App not foregrounded; nothing to act on.
        return Vec::new();
    }
    let mut actions = Vec::new();

    // Exploratory no-op candidates, inferred purely from capability. SWIPE
    // and ROTATE need explicit step evidence and are never inferred.
    if budget > 0 {
        for target in targets {
            for event in noop_events(target, cfg) {
                actions.push(Action::new(event, Step::noop()));
            }
        }
    }

    // Real steps: strictly the next one, or all of them in out-of-order mode.
    let span = if cfg.out_of_order_match {
        unmatched.len()
    } else {
        unmatched.len().min(1)
    };
    for step in unmatched[..span].iter_mut() {
        for target in targets {
            tweak(step, target, cfg);
        }
        for part in step.decompose() {
            let variant = part.ui_actions[0].clone();
            if variant.action == ActionType::Rotate {
                // Rotation is a global device action; one candidate suffices.
                if let Some(target) = targets.first() {
                    let event =
                        Event::from_variant(target.clone(), &variant, &cfg.default_input_text);
                    actions.push(Action::new(event, part.clone()));
                }
                continue;
            }
            for target in targets {
                if !capability_matches(&target.element, variant.action) {
                    continue;
                }
                let mut event =
                    Event::from_variant(target.clone(), &variant, &cfg.default_input_text);
                if event.target.element.is_back() && event.action == EventAction::Click {
                    event.action = EventAction::Back;
                }
                actions.push(Action::new(event, part.clone()));
            }
        }
    }

    // Once every real step is consumed, pure no-op wandering can be cut off.
    if !cfg.match_missing_after_all_steps
        && unmatched.is_empty()
        && actions.iter().all(Action::matched_with_noop)
    {
        actions.clear();
    }

    actions
}

fn noop_events(target: &UiTarget, cfg: &RlConfig) -> Vec<Event> {
    let el = &target.element;
    let mut events = Vec::new();
    if el.is_back() {
        events.push(Event::new(target.clone(), EventAction::Back));
        return events;
    }
    if el.is_clickable_view() {
        events.push(Event::new(target.clone(), EventAction::Click));
    }
    if el.is_editable() && el.text != cfg.default_input_text {
        let mut event = Event::new(target.clone(), EventAction::Input);
        event.input_value = Some(cfg.default_input_text.clone());
        events.push(event);
    }
    if el.is_long_clickable_view() {
        events.push(Event::new(target.clone(), EventAction::LongClick));
    }
    if el.is_scrollable_view() {
        events.push(Event::new(target.clone(), EventAction::Scroll));
    }
    events
}

fn capability_matches(el: &UiElement, action: ActionType) -> bool {
    match action {
        ActionType::Click => el.is_clickable_view() || el.is_back(),
        ActionType::LongClick => el.is_long_clickable_view(),
        ActionType::Input => el.is_editable(),
        ActionType::Scroll => el.is_scrollable_view(),
        ActionType::Swipe => el.is_swipeable(),
        ActionType::Rotate => true,
    }
}

/// Recover from a wrong primary-action prediction: when a live element's
/// text directly confirms the step's second interpretation (INPUT on an
/// editable field, CLICK on a clickable one), enable that second variant so
/// decomposition offers it.
fn tweak(step: &mut Step, target: &UiTarget, cfg: &RlConfig) {
    if !cfg.enable_action_type_tweak || step.is_noop() || step.ui_actions.len() < 2 {
        return;
    }
    let el = &target.element;
    let second = step.ui_actions[1].action;
    let applies = (el.is_editable() && second == ActionType::Input)
        || (el.is_clickable_view() && second == ActionType::Click);
    if !applies {
        return;
    }
    let phrase = step.target_word().to_string();
    let mut best: f64 = 0.0;
    for text in &target.texts {
        best = best.max(word_similarity(&phrase, text));
    }
    best = best.max(word_similarity(&phrase, &el.resource_id_name()));
    best = best.max(word_similarity(&phrase, &el.content_desc));
    if best > cfg.action_type_tweak_threshold {
        step.ui_actions[1].enabled = true;
    }
}
