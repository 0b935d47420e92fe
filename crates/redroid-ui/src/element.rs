use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Resource id of the synthetic BACK element (the system back gesture has no
/// element of its own in the dump, so one is injected under this id).
pub const BACK_RESOURCE_ID: &str = "com.android.systemui:id/back";

/// Container classes whose click/long-click flags belong to their children.
const VIEW_GROUP_CLASSES: &[&str] = &["android.widget.ListView", "android.widget.GridView"];

static BOUNDS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d+),(\d+)\]\[(\d+),(\d+)\]").expect("bounds pattern"));

/// Time-of-day text such as "3:47 PM" — volatile, blanked for state identity.
static TIME_OF_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(1[0-2]|0?[1-9]):([0-5][0-9]) ?([AaPp][Mm])").expect("time pattern"));

/// Screen rectangle in the dump's `[x1,y1][x2,y2]` convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Bounds {
    /// Parse the bracket form. Malformed input degrades to zero bounds (the
    /// dump occasionally emits garbage; the engine must keep going).
    pub fn parse(s: &str) -> Bounds {
        match BOUNDS_RE.captures(s) {
            Some(caps) => {
                let n = |i: usize| caps[i].parse::<i32>().unwrap_or(0);
                Bounds {
                    x1: n(1),
                    y1: n(2),
                    x2: n(3),
                    y2: n(4),
                }
            }
            None => {
                tracing::error!(bounds = s, "unparsable bounds string, using zero bounds");
                Bounds::default()
            }
        }
    }

    pub fn center(&self) -> (i32, i32) {
        ((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }

    pub fn render(&self) -> String {
        format!("[{},{}][{},{}]", self.x1, self.y1, self.x2, self.y2)
    }
}

/// One node's attributes from the UI hierarchy dump.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UiElement {
    pub bounds: Bounds,
    pub class: String,
    pub package: String,
    pub resource_id: String,
    pub text: String,
    pub content_desc: String,
    pub checkable: bool,
    pub checked: bool,
    pub clickable: bool,
    pub enabled: bool,
    pub focusable: bool,
    pub focused: bool,
    pub long_clickable: bool,
    pub password: bool,
    pub scrollable: bool,
    pub selected: bool,
    pub visible: bool,
}

impl UiElement {
    /// The synthetic BACK element, injected whenever the screen has at least
    /// one real interactable element.
    pub fn back() -> UiElement {
        UiElement {
            text: "Back".to_string(),
            content_desc: "Back".to_string(),
            resource_id: BACK_RESOURCE_ID.to_string(),
            clickable: true,
            visible: true,
            ..UiElement::default()
        }
    }

    pub fn is_back(&self) -> bool {
        self.resource_id == BACK_RESOURCE_ID
    }

    pub(crate) fn is_container(&self) -> bool {
        VIEW_GROUP_CLASSES.contains(&self.class.as_str())
    }

    pub fn is_editable(&self) -> bool {
        self.class == "android.widget.EditText"
    }

    pub fn is_swipeable(&self) -> bool {
        self.class.ends_with("ViewPager")
    }

    /// Scrollable and editable views also report `clickable`; they are
    /// classified by their stronger capability instead.
    pub fn is_clickable_view(&self) -> bool {
        self.clickable && !self.is_container() && !self.is_editable()
    }

    pub fn is_long_clickable_view(&self) -> bool {
        self.long_clickable && !self.is_container() && !self.is_editable()
    }

    pub fn is_scrollable_view(&self) -> bool {
        self.scrollable && !self.is_swipeable()
    }

    /// Trailing segment of the resource id, underscores spaced out, so it can
    /// be compared against report phrasing ("menu_save_item" -> "menu save item").
    pub fn resource_id_name(&self) -> String {
        self.resource_id
            .rsplit('/')
            .next()
            .unwrap_or("")
            .replace('_', " ")
            .trim()
            .to_string()
    }

    /// Canonical attribute rendering for identity hashing.
    ///
    /// Field order is fixed and documented here so hashes stay stable across
    /// implementations. Volatile fields are neutralized: `focused` is omitted
    /// entirely, and `text` is blanked when it shows a time of day (clock
    /// widgets would otherwise mint a fresh state every minute).
    pub fn canonical_attrs(&self) -> String {
        let text = if TIME_OF_DAY_RE.is_match(&self.text) {
            ""
        } else {
            self.text.as_str()
        };
        format!(
            "bounds={} checkable={} checked={} class={} clickable={} content-desc={} \
             enabled={} focusable={} long-clickable={} package={} password={} \
             resource-id={} scrollable={} selected={} text={} visible={}",
            self.bounds.render(),
            self.checkable,
            self.checked,
            self.class,
            self.clickable,
            self.content_desc,
            self.enabled,
            self.focusable,
            self.long_clickable,
            self.package,
            self.password,
            self.resource_id,
            self.scrollable,
            self.selected,
            text,
            self.visible,
        )
    }
}
