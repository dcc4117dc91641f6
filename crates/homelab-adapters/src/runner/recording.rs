//! Recording runner for tests and dry runs.
//!
//! Never spawns anything. Every command is appended to a log, and commands
//! matching a scripted rule get a scripted result; everything else succeeds.

use std::sync::{Arc, Mutex};

use homelab_core::{
    application::{
        ApplicationError,
        ports::{CommandOutput, CommandRunner, CommandSpec},
    },
    error::HomelabResult,
};
use tracing::info;

#[derive(Debug, Clone)]
struct Rule {
    pattern: String,
    output: CommandOutput,
}

#[derive(Debug, Default)]
struct State {
    log: Vec<String>,
    rules: Vec<Rule>,
}

/// In-memory [`CommandRunner`]. Clones share the same log and rules.
#[derive(Debug, Clone, Default)]
pub struct RecordingRunner {
    state: Arc<Mutex<State>>,
    announce: bool,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log each command at info level instead of running it.
    pub fn dry_run() -> Self {
        Self {
            announce: true,
            ..Self::default()
        }
    }

    /// Respond to commands whose display form contains `pattern` with a
    /// failure. Later rules take precedence.
    pub fn fail_on(self, pattern: impl Into<String>, code: i32, stderr: impl Into<String>) -> Self {
        self.respond_to(pattern, CommandOutput::failure(code, stderr))
    }

    /// Respond to matching commands with `output`. Later rules take precedence.
    pub fn respond_to(self, pattern: impl Into<String>, output: CommandOutput) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.rules.push(Rule {
                pattern: pattern.into(),
                output,
            });
        }
        self
    }

    /// Every command seen so far, in order, as displayed.
    pub fn commands(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|state| state.log.clone())
            .unwrap_or_default()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &CommandSpec) -> HomelabResult<CommandOutput> {
        let line = command.to_string();
        if self.announce {
            info!(command = %line, "Would run");
        }

        let mut state = self
            .state
            .lock()
            .map_err(|_| ApplicationError::StoreLockError)?;
        state.log.push(line.clone());

        let output = state
            .rules
            .iter()
            .rev()
            .find(|rule| line.contains(&rule.pattern))
            .map(|rule| rule.output.clone())
            .unwrap_or_else(CommandOutput::success);
        Ok(output)
    }
}
