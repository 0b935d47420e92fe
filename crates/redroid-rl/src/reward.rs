//! Reward model: scores one action against the step it claims to satisfy.
//!
//! Rewards are assembled from named components, floor-filtered, scaled, and
//! finally shaped by whether the action changed anything on screen. The
//! computation never fails; missing textual data scores zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use redroid_s2r::types::ActionType;
use redroid_ui::word_similarity;

use crate::action::Action;
use crate::config::RlConfig;

/// Named reward components plus the scaled total, kept for artifacts so a
/// run can be audited after the fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    pub components: BTreeMap<String, f64>,
    pub total: f64,
}

/// Score `action` before execution. Shaping against the post-execution
/// screen happens separately in [`shape_reward`].
pub fn calculate_reward(action: &Action, cfg: &RlConfig) -> RewardBreakdown {
    let mut components = BTreeMap::new();

    if action.matched_with_noop() {
        components.insert("missing_step".to_string(), cfg.missing_step_penalty);
        return scale(components, cfg);
    }

    match action.step.first_action_type() {
        Some(ActionType::Rotate) => {
            if let Some(v) = cfg.rotate_reward {
                components.insert("rotate".to_string(), v);
            }
        }
        Some(ActionType::Scroll) => {
            if let Some(v) = cfg.scroll_reward {
                components.insert("scroll".to_string(), v);
            }
        }
        Some(ActionType::Swipe) => {
            if let Some(v) = cfg.swipe_reward {
                components.insert("swipe".to_string(), v);
            }
        }
        _ => {
            if action.step.first_action_type() == Some(ActionType::Input)
                && action.event.target.element.is_editable()
            {
                if let Some(v) = cfg.input_adhoc_reward {
                    components.insert("input_adhoc".to_string(), v);
                }
            }
            if cfg.textual_similarity_reward {
                components.insert(
                    "textual_similarity".to_string(),
                    best_similarity(action, cfg),
                );
            }
        }
    }

    scale(components, cfg)
}

/// Maximum word similarity between the step's target phrase and every text
/// surface of the matched element.
fn best_similarity(action: &Action, cfg: &RlConfig) -> f64 {
    let phrase = action.step.target_word();
    let el = &action.event.target.element;
    let mut best: f64 = 0.0;
    for text in &action.event.target.texts {
        best = best.max(word_similarity(phrase, text));
    }
    if cfg.include_resource_id_similarity {
        best = best.max(word_similarity(phrase, &el.resource_id_name()));
        best = best.max(word_similarity(phrase, &el.content_desc));
    }
    best
}

/// Floor-filter and scale the components.
///
/// Positive components below `reward_bar` are dropped as noise; negative
/// ones are always kept as genuine penalty signal. Nothing surviving means
/// the match was unconvincing and earns the missing-step penalty. A negative
/// sum passes through unscaled; a non-negative sum is multiplied by the
/// scale base and rounded to four decimals.
fn scale(components: BTreeMap<String, f64>, cfg: &RlConfig) -> RewardBreakdown {
    let kept: Vec<f64> = components
        .values()
        .copied()
        .filter(|v| *v >= cfg.reward_bar || *v < 0.0)
        .collect();
    let total = if kept.is_empty() {
        cfg.missing_step_penalty
    } else {
        let sum: f64 = kept.iter().sum();
        if sum < 0.0 {
            sum
        } else {
            round4(sum * cfg.reward_scale_base)
        }
    };
    RewardBreakdown { components, total }
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Post-transition shaping: an action that left the screen's canonical
/// signature untouched had no observable effect and is punished with the
/// failure penalty, sign regardless.
pub fn shape_reward(total: f64, cur_signature: &str, next_signature: &str, cfg: &RlConfig) -> f64 {
    if cfg.exploration_shaping && cur_signature == next_signature {
        cfg.failure_penalty
    } else {
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, EventAction};
    use redroid_s2r::types::{ActionVariant, Step};
    use redroid_ui::{UiElement, UiTarget};

    fn step_for(action: ActionType, target_word: &str) -> Step {
        let mut v = ActionVariant::of(action);
        v.target_word = target_word.to_string();
        v.enabled = true;
        Step {
            index: 1,
            subject: String::new(),
            relation: String::new(),
            object: String::new(),
            sentence: "I do the thing.".to_string(),
            ui_actions: vec![v],
        }
    }

    fn click_action(element_text: &str, target_word: &str) -> Action {
        let target = UiTarget {
            element: UiElement {
                text: element_text.to_string(),
                clickable: true,
                ..UiElement::default()
            },
            texts: vec![element_text.to_string()],
        };
        Action::new(
            Event::new(target, EventAction::Click),
            step_for(ActionType::Click, target_word),
        )
    }

    #[test]
    fn noop_match_earns_the_missing_step_penalty() {
        let cfg = RlConfig::default();
        let mut action = click_action("Save", "save");
        action.step = Step::noop();
        let r = calculate_reward(&action, &cfg);
        assert_eq!(r.total, cfg.missing_step_penalty);
        assert_eq!(r.components["missing_step"], cfg.missing_step_penalty);
    }

    #[test]
    fn exact_text_match_scores_scaled_similarity() {
        let cfg = RlConfig::default();
        let r = calculate_reward(&click_action("Save", "save"), &cfg);
        assert_eq!(r.components["textual_similarity"], 1.0);
        assert_eq!(r.total, round4(cfg.reward_scale_base));
    }

    #[test]
    fn similarity_below_the_bar_collapses_to_the_penalty() {
        let cfg = RlConfig::default();
        let r = calculate_reward(&click_action("xzqv", "settings"), &cfg);
        assert!(r.components["textual_similarity"] < cfg.reward_bar);
        assert_eq!(r.total, cfg.missing_step_penalty);
    }

    #[test]
    fn reward_is_monotone_in_similarity() {
        let cfg = RlConfig::default();
        let weak = calculate_reward(&click_action("settinwz", "settings"), &cfg);
        let strong = calculate_reward(&click_action("settings", "settings"), &cfg);
        assert!(
            weak.components["textual_similarity"] <= strong.components["textual_similarity"]
        );
        assert!(weak.total <= strong.total);
    }

    #[test]
    fn resource_id_similarity_is_optional() {
        let mut cfg = RlConfig::default();
        let mut action = click_action("", "settings icon");
        action.event.target.texts.clear();
        action.event.target.element.resource_id = "com.example:id/settings_icon".to_string();

        let with = calculate_reward(&action, &cfg);
        assert_eq!(with.components["textual_similarity"], 1.0);

        cfg.include_resource_id_similarity = false;
        let without = calculate_reward(&action, &cfg);
        assert_eq!(without.components["textual_similarity"], 0.0);
        assert_eq!(without.total, cfg.missing_step_penalty);
    }

    #[test]
    fn fixed_gesture_rewards_apply_and_toggle_off() {
        let mut cfg = RlConfig::default();
        let target = UiTarget {
            element: UiElement {
                scrollable: true,
                ..UiElement::default()
            },
            texts: Vec::new(),
        };
        let action = Action::new(
            Event::new(target, EventAction::Scroll),
            step_for(ActionType::Scroll, ""),
        );
        let r = calculate_reward(&action, &cfg);
        assert_eq!(r.total, round4(0.5 * cfg.reward_scale_base));

        cfg.scroll_reward = None;
        let r = calculate_reward(&action, &cfg);
        assert_eq!(r.total, cfg.missing_step_penalty);
    }

    #[test]
    fn input_on_an_editable_field_adds_the_adhoc_bonus() {
        let cfg = RlConfig::default();
        let target = UiTarget {
            element: UiElement {
                class: "android.widget.EditText".to_string(),
                ..UiElement::default()
            },
            texts: vec!["Title".to_string()],
        };
        let action = Action::new(
            Event::new(target, EventAction::Input),
            step_for(ActionType::Input, "title"),
        );
        let r = calculate_reward(&action, &cfg);
        assert_eq!(r.components["input_adhoc"], 0.7);
        assert_eq!(r.components["textual_similarity"], 1.0);
        assert_eq!(r.total, round4(1.7 * cfg.reward_scale_base));
    }

    #[test]
    fn shaping_punishes_an_unchanged_screen() {
        let cfg = RlConfig::default();
        assert_eq!(shape_reward(2.0, "sig", "sig", &cfg), cfg.failure_penalty);
        assert_eq!(shape_reward(2.0, "sig", "other", &cfg), 2.0);

        let off = RlConfig {
            exploration_shaping: false,
            ..RlConfig::default()
        };
        assert_eq!(shape_reward(2.0, "sig", "sig", &off), 2.0);
    }
}
