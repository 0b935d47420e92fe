//! Pairing of a concrete event with the step it claims to satisfy.

use std::fmt;

use serde::{Deserialize, Serialize};

use redroid_s2r::types::Step;

use crate::event::{Event, EventRecord};
use crate::hash::{digest64, ActionKey};

/// One node of the action space: an executable [`Event`] matched to a
/// [`Step`] (possibly the no-op sentinel).
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub event: Event,
    pub step: Step,
}

impl Action {
    pub fn new(event: Event, step: Step) -> Action {
        Action { event, step }
    }

    /// True when this action spends missing-step budget instead of matching
    /// a real step.
    pub fn matched_with_noop(&self) -> bool {
        self.step.is_noop()
    }

    /// Identity rendering: event identity plus the step's canonical string.
    pub fn identity_string(&self) -> String {
        format!(
            "{} {}",
            self.event.identity_string(),
            self.step.canonical_string()
        )
    }

    pub fn key(&self) -> ActionKey {
        ActionKey(digest64(&self.identity_string()))
    }

    pub fn record(&self) -> ActionRecord {
        ActionRecord {
            step_index: self.step.index,
            sentence: self.step.sentence.clone(),
            target_word: self.step.target_word().to_string(),
            event: self.event.record(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matched_with_noop() {
            write!(f, "[no step] {}", self.event)
        } else {
            write!(f, "[step {} {:?}] {}", self.step.index, self.step.sentence, self.event)
        }
    }
}

/// Serializable artifact shape of an executed action: the chosen step
/// variant plus the concrete event it was paired with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub step_index: i32,
    pub sentence: String,
    pub target_word: String,
    pub event: EventRecord,
}
