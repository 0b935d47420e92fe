//! Structural UI model for a live app screen.
//!
//! A device-automation layer dumps the screen hierarchy; this crate turns it
//! into typed elements and trees, classifies which elements can be acted on,
//! recovers the text surfaces around them, and reduces a snapshot to a
//! canonical signature stable under non-semantic churn.

pub mod element;
pub mod text;
pub mod tree;

pub use element::{Bounds, UiElement, BACK_RESOURCE_ID};
pub use text::word_similarity;
pub use tree::{UiNode, UiTarget, UiTree};
