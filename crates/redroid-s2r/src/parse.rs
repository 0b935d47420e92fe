use std::fs;
use std::path::Path;

use crate::types::Step;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("S2R JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("S2R file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid step at index {index}: {reason}")]
    Invalid { index: i32, reason: String },
}

/// Parse an ordered S2R sequence from the extraction pipeline's JSON output.
///
/// Rejects records that break the step invariants: a real step must have a
/// positive index and a non-empty sentence (the empty sentence is reserved
/// for the in-engine no-op sentinel).
pub fn parse_steps(json: &str) -> Result<Vec<Step>, ParseError> {
    let steps: Vec<Step> = serde_json::from_str(json)?;
    for step in &steps {
        if step.sentence.is_empty() {
            return Err(ParseError::Invalid {
                index: step.index,
                reason: "empty sentence (reserved for the no-op sentinel)".to_string(),
            });
        }
        if step.index < 1 {
            return Err(ParseError::Invalid {
                index: step.index,
                reason: "step index must be >= 1".to_string(),
            });
        }
    }
    Ok(steps)
}

pub fn load_steps(path: &Path) -> Result<Vec<Step>, ParseError> {
    let json = fs::read_to_string(path)?;
    parse_steps(&json)
}
