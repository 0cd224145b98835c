//! Command sources for the live pass.
//!
//! The interactive preview maps keys straight to [`CameraCommand`]s; the
//! headless replay and the tests use a [`ScriptedCommands`] timeline.

use std::collections::BTreeMap;

use camtrail_common::error::{CamtrailError, CamtrailResult};
use camtrail_project_model::command::CameraCommand;

/// Yields at most one command per preview iteration.
pub trait CommandSource {
    /// Command pending for this iteration, if any.
    fn poll(&mut self, iteration: u64) -> Option<CameraCommand>;

    /// Whether no command will ever arrive at or after `iteration`.
    fn is_exhausted(&self, iteration: u64) -> bool {
        let _ = iteration;
        false
    }
}

/// Commands keyed by the iteration they fire on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedCommands {
    events: BTreeMap<u64, CameraCommand>,
}

impl ScriptedCommands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `command` on `iteration`, replacing anything already there.
    pub fn at(mut self, iteration: u64, command: CameraCommand) -> Self {
        self.events.insert(iteration, command);
        self
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Parse a command script.
    ///
    /// One `<iteration> <command>` pair per line, where the command is a
    /// script name (`up`, `zoom-in`, `toggle`, ...) or its bound key.
    /// Blank lines and `#` comments are ignored.
    pub fn parse(script: &str) -> CamtrailResult<Self> {
        let mut events = BTreeMap::new();
        for (line_no, line) in script.lines().enumerate() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let mut parts = line.split_whitespace();
            let (Some(iteration), Some(name), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(CamtrailError::config(format!(
                    "script line {}: expected `<iteration> <command>`, got `{line}`",
                    line_no + 1
                )));
            };

            let iteration = iteration.parse::<u64>().map_err(|_| {
                CamtrailError::config(format!(
                    "script line {}: `{iteration}` is not an iteration number",
                    line_no + 1
                ))
            })?;
            let command = CameraCommand::parse(name).ok_or_else(|| {
                CamtrailError::config(format!(
                    "script line {}: unknown command `{name}`",
                    line_no + 1
                ))
            })?;

            if events.insert(iteration, command).is_some() {
                return Err(CamtrailError::config(format!(
                    "script line {}: iteration {iteration} already has a command",
                    line_no + 1
                )));
            }
        }
        Ok(Self { events })
    }
}

impl CommandSource for ScriptedCommands {
    fn poll(&mut self, iteration: u64) -> Option<CameraCommand> {
        self.events.get(&iteration).copied()
    }

    fn is_exhausted(&self, iteration: u64) -> bool {
        self.events.range(iteration..).next().is_none()
    }
}
