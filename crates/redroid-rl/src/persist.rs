//! Run artifact sinks.
//!
//! Every step, the evolving Q-table, per-epoch rewards, and the successful
//! action sequence are handed to a [`RunSink`]. Sink faults are real I/O
//! errors and surface to the caller, unlike environment faults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::action::ActionRecord;
use crate::agent::QTableDump;
use crate::reward::RewardBreakdown;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("artifact io: {0}")]
    Io(#[from] std::io::Error),
    #[error("artifact encoding: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything known about one executed step, for post-run auditing.
#[derive(Debug, Clone, Serialize)]
pub struct StepArtifact {
    pub epoch: u32,
    pub step: u32,
    pub action: ActionRecord,
    pub reward: RewardBreakdown,
    /// Canonical string of the state the action was taken from.
    pub state: String,
}

pub trait RunSink {
    fn record_step(&mut self, artifact: &StepArtifact) -> Result<(), SinkError>;
    fn persist_q_table(&mut self, dump: &QTableDump) -> Result<(), SinkError>;
    fn persist_rewards(&mut self, rewards: &[f64]) -> Result<(), SinkError>;
    fn export_success(&mut self, executed: &[ActionRecord]) -> Result<(), SinkError>;
}

/// Writes each artifact as one JSON file in a directory.
pub struct JsonDirSink {
    dir: PathBuf,
}

impl JsonDirSink {
    pub fn new(dir: impl AsRef<Path>) -> Result<JsonDirSink, SinkError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(JsonDirSink { dir })
    }

    fn write<T: Serialize>(&self, name: &str, value: &T) -> Result<(), SinkError> {
        let json = serde_json::to_vec_pretty(value)?;
        fs::write(self.dir.join(name), json)?;
        Ok(())
    }
}

impl RunSink for JsonDirSink {
    fn record_step(&mut self, artifact: &StepArtifact) -> Result<(), SinkError> {
        let name = format!("epoch_{}_step_{}.json", artifact.epoch, artifact.step);
        self.write(&name, artifact)
    }

    fn persist_q_table(&mut self, dump: &QTableDump) -> Result<(), SinkError> {
        self.write("q_table.json", dump)
    }

    fn persist_rewards(&mut self, rewards: &[f64]) -> Result<(), SinkError> {
        self.write("rewards.json", &rewards)
    }

    fn export_success(&mut self, executed: &[ActionRecord]) -> Result<(), SinkError> {
        self.write("success_action_seq.json", &executed)
    }
}

/// Discards everything. For tests and dry runs.
pub struct NullSink;

impl RunSink for NullSink {
    fn record_step(&mut self, _: &StepArtifact) -> Result<(), SinkError> {
        Ok(())
    }

    fn persist_q_table(&mut self, _: &QTableDump) -> Result<(), SinkError> {
        Ok(())
    }

    fn persist_rewards(&mut self, _: &[f64]) -> Result<(), SinkError> {
        Ok(())
    }

    fn export_success(&mut self, _: &[ActionRecord]) -> Result<(), SinkError> {
        Ok(())
    }
}
