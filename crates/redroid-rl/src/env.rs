//! Environment collaborator boundary.
//!
//! The device-automation layer (ADB/uiautomator-equivalent) sits behind this
//! trait. Implementations absorb transient I/O faults internally with
//! bounded retries and degraded fallbacks (empty tree, blank frame) — calls
//! at this boundary never fail, so the training loop only ever sees usable
//! snapshots.

use std::collections::VecDeque;

use redroid_ui::UiTree;

use crate::event::Event;

/// One observation of the device: the UI hierarchy plus an optional visual
/// frame. The frame is opaque to the engine; sinks may persist it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub ui: UiTree,
    pub frame: Option<Vec<u8>>,
}

impl Snapshot {
    /// Degraded observation: dump failed after retries, or the app left the
    /// foreground.
    pub fn empty() -> Snapshot {
        Snapshot {
            ui: UiTree::empty(),
            frame: None,
        }
    }
}

pub trait Environment {
    fn snapshot(&mut self) -> Snapshot;
    fn execute(&mut self, event: &Event);
    /// Crash-signature check against the reference crash log.
    fn is_crashed(&mut self) -> bool;
    fn window_size(&self) -> (u32, u32);
    /// Fresh install/restore plus relaunch.
    fn reset_app(&mut self);
}

/// Scripted collaborator for engine tests: replays a fixed snapshot
/// sequence, reports a crash after a set number of executions, and records
/// everything executed. `reset_app` rewinds the script.
pub struct ScriptedEnvironment {
    script: Vec<Snapshot>,
    queue: VecDeque<Snapshot>,
    crash_after: Option<usize>,
    executed: Vec<Event>,
    window: (u32, u32),
    resets: u32,
}

impl ScriptedEnvironment {
    pub fn new(script: Vec<Snapshot>) -> ScriptedEnvironment {
        ScriptedEnvironment {
            queue: script.clone().into(),
            script,
            crash_after: None,
            executed: Vec::new(),
            window: (1080, 1920),
            resets: 0,
        }
    }

    pub fn crash_after_executions(mut self, n: usize) -> Self {
        self.crash_after = Some(n);
        self
    }

    pub fn with_window(mut self, window: (u32, u32)) -> Self {
        self.window = window;
        self
    }

    pub fn executed(&self) -> &[Event] {
        &self.executed
    }

    pub fn resets(&self) -> u32 {
        self.resets
    }
}

impl Environment for ScriptedEnvironment {
    fn snapshot(&mut self) -> Snapshot {
        self.queue.pop_front().unwrap_or_else(Snapshot::empty)
    }

    fn execute(&mut self, event: &Event) {
        self.executed.push(event.clone());
    }

    fn is_crashed(&mut self) -> bool {
        self.crash_after
            .map_or(false, |n| self.executed.len() >= n)
    }

    fn window_size(&self) -> (u32, u32) {
        self.window
    }

    fn reset_app(&mut self) {
        self.queue = self.script.clone().into();
        self.resets += 1;
    }
}
