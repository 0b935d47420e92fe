//! Concrete UI actions bound to one element.

use std::fmt;

use serde::{Deserialize, Serialize};

use redroid_s2r::types::{ActionType, ActionVariant};
use redroid_ui::UiTarget;

/// Action kinds the device layer can execute. Extends the step-level
/// [`ActionType`] with the synthetic system back gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventAction {
    #[serde(rename = "CLICK")]
    Click,
    #[serde(rename = "LONG_CLICK")]
    LongClick,
    #[serde(rename = "INPUT")]
    Input,
    #[serde(rename = "SCROLL")]
    Scroll,
    #[serde(rename = "SWIPE")]
    Swipe,
    #[serde(rename = "ROTATE")]
    Rotate,
    #[serde(rename = "BACK")]
    Back,
}

impl EventAction {
    pub fn tag(&self) -> &'static str {
        match self {
            EventAction::Click => "CLICK",
            EventAction::LongClick => "LONG_CLICK",
            EventAction::Input => "INPUT",
            EventAction::Scroll => "SCROLL",
            EventAction::Swipe => "SWIPE",
            EventAction::Rotate => "ROTATE",
            EventAction::Back => "BACK",
        }
    }
}

impl From<ActionType> for EventAction {
    fn from(a: ActionType) -> Self {
        match a {
            ActionType::Click => EventAction::Click,
            ActionType::LongClick => EventAction::LongClick,
            ActionType::Input => EventAction::Input,
            ActionType::Scroll => EventAction::Scroll,
            ActionType::Swipe => EventAction::Swipe,
            ActionType::Rotate => EventAction::Rotate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
}

impl SwipeDirection {
    /// Unrecognized extraction output falls back to the default.
    pub fn parse(s: &str) -> SwipeDirection {
        if s.eq_ignore_ascii_case("right") {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            SwipeDirection::Left => "left",
            SwipeDirection::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    pub fn parse(s: &str) -> ScrollDirection {
        if s.eq_ignore_ascii_case("up") {
            ScrollDirection::Up
        } else {
            ScrollDirection::Down
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ScrollDirection::Up => "up",
            ScrollDirection::Down => "down",
        }
    }
}

/// One executable action instance over one element.
///
/// Identity comes from the element's canonical attributes, the action kind
/// and the input value; two events agreeing on those are interchangeable for
/// learning even if they came from different snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub target: UiTarget,
    pub action: EventAction,
    pub input_value: Option<String>,
    pub swipe_direction: SwipeDirection,
    pub scroll_direction: ScrollDirection,
}

impl Event {
    pub fn new(target: UiTarget, action: EventAction) -> Event {
        Event {
            target,
            action,
            input_value: None,
            swipe_direction: SwipeDirection::Left,
            scroll_direction: ScrollDirection::Down,
        }
    }

    /// Bind a step variant to an element. INPUT variants with no predicted
    /// value fall back to the configured filler text.
    pub fn from_variant(target: UiTarget, variant: &ActionVariant, default_input: &str) -> Event {
        let input_value = match variant.action {
            ActionType::Input => Some(if variant.input_value.is_empty() {
                default_input.to_string()
            } else {
                variant.input_value.clone()
            }),
            _ => None,
        };
        Event {
            target,
            action: variant.action.into(),
            input_value,
            swipe_direction: SwipeDirection::parse(&variant.swipe_direction),
            scroll_direction: ScrollDirection::parse(&variant.scroll_direction),
        }
    }

    /// Tap point for click-like actions.
    pub fn coordinates(&self) -> (i32, i32) {
        self.target.element.bounds.center()
    }

    /// Drag start/end for scroll and swipe gestures, `None` otherwise.
    /// Scrolling down drags bottom-to-top within the element; swiping left
    /// drags right-to-left; one pixel of inset keeps the touch inside the
    /// element's bounds.
    pub fn gesture_range(&self) -> Option<((i32, i32), (i32, i32))> {
        let b = self.target.element.bounds;
        match self.action {
            EventAction::Scroll => {
                let x = (b.x1 + b.x2) / 2;
                Some(match self.scroll_direction {
                    ScrollDirection::Down => ((x, b.y2 - 1), (x, b.y1 + 1)),
                    ScrollDirection::Up => ((x, b.y1 - 1), (x, b.y2 + 1)),
                })
            }
            EventAction::Swipe => {
                let y = (b.y1 + b.y2) / 2;
                Some(match self.swipe_direction {
                    SwipeDirection::Left => ((b.x2 - 1, y), (b.x1 + 1, y)),
                    SwipeDirection::Right => ((b.x1 + 1, y), (b.x2 - 1, y)),
                })
            }
            _ => None,
        }
    }

    /// Canonical identity rendering, the event half of an Action key.
    pub fn identity_string(&self) -> String {
        format!(
            "{} {} input={}",
            self.target.element.canonical_attrs(),
            self.action.tag(),
            self.input_value.as_deref().unwrap_or("")
        )
    }

    pub fn record(&self) -> EventRecord {
        let el = &self.target.element;
        EventRecord {
            action: self.action.tag().to_string(),
            class: el.class.clone(),
            resource_id: el.resource_id.clone(),
            text: el.text.clone(),
            content_desc: el.content_desc.clone(),
            bounds: el.bounds.render(),
            input_value: self.input_value.clone(),
            swipe_direction: self.swipe_direction.tag().to_string(),
            scroll_direction: self.scroll_direction.tag().to_string(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.action.tag())?;
        if let Some(v) = &self.input_value {
            write!(f, "({v})")?;
        }
        let el = &self.target.element;
        write!(
            f,
            " on {} {} text={:?} {}",
            el.class,
            el.resource_id,
            el.text,
            el.bounds.render()
        )
    }
}

/// Serializable artifact shape of an executed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub action: String,
    pub class: String,
    pub resource_id: String,
    pub text: String,
    pub content_desc: String,
    pub bounds: String,
    pub input_value: Option<String>,
    pub swipe_direction: String,
    pub scroll_direction: String,
}
