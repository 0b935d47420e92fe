//! Step-to-reproduce (S2R) records.
//!
//! The upstream extraction pipeline turns a natural-language bug report into
//! an ordered sequence of steps, each carrying one or more candidate UI-action
//! interpretations. This crate owns that record schema: parsing, validation,
//! the no-op sentinel, and decomposition into single-variant steps.

pub mod parse;
pub mod types;

pub use parse::{load_steps, parse_steps, ParseError};
pub use types::{ActionType, ActionVariant, Step};
