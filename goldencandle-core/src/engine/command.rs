//! Operator commands delivered with a tick.

use serde::{Deserialize, Serialize};

use crate::error::CommandError;

/// A discrete operator action. Validated and applied before the tick's evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum Command {
    Pause,
    Resume,
    /// One-based ladder level.
    SkipToLevel(usize),
    AdjustMinCandleSize(f64),
    /// Suppress whatever signal the next evaluation produces.
    IgnoreCurrentAlert,
}

/// What applying a command did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum CommandStatus {
    Applied,
    /// Valid, but the state already matched (e.g. pausing while paused).
    Unchanged,
    Rejected(CommandError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandOutcome {
    pub command: Command,
    pub status: CommandStatus,
}

impl CommandOutcome {
    pub fn new(command: Command, result: Result<bool, CommandError>) -> Self {
        let status = match result {
            Ok(true) => CommandStatus::Applied,
            Ok(false) => CommandStatus::Unchanged,
            Err(err) => CommandStatus::Rejected(err),
        };
        Self { command, status }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self.status, CommandStatus::Rejected(_))
    }
}
