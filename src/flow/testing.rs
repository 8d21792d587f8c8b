//! Scripted command runner for engine tests

use super::executor::{CommandOutput, CommandRunner, RunError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Barrier;

/// Canned behavior for one command
#[derive(Debug, Clone, Default)]
pub(crate) struct Scripted {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub delay: Option<Duration>,
    pub wait_on_barrier: bool,
    pub launch_error: bool,
}

/// Answers commands from a script table and records what ran.
///
/// Unknown commands succeed with empty output.
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    scripts: HashMap<String, Scripted>,
    barrier: Option<Arc<Barrier>>,
    calls: Mutex<Vec<String>>,
    finished: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(mut self, command: &str, scripted: Scripted) -> Self {
        self.scripts.insert(command.to_string(), scripted);
        self
    }

    pub fn ok(self, command: &str, stdout: &str) -> Self {
        self.script(
            command,
            Scripted {
                stdout: stdout.into(),
                ..Default::default()
            },
        )
    }

    pub fn fail(self, command: &str, exit_code: i32, stderr: &str) -> Self {
        self.script(
            command,
            Scripted {
                stderr: stderr.into(),
                exit_code,
                ..Default::default()
            },
        )
    }

    pub fn with_barrier(mut self, parties: usize) -> Self {
        self.barrier = Some(Arc::new(Barrier::new(parties)));
        self
    }

    /// Commands in the order they started
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Commands in the order they finished
    pub fn finished(&self) -> Vec<String> {
        self.finished.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &str) -> Result<CommandOutput, RunError> {
        self.calls.lock().unwrap().push(command.to_string());
        let scripted = self.scripts.get(command).cloned().unwrap_or_default();

        if scripted.wait_on_barrier {
            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
        }
        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }

        self.finished.lock().unwrap().push(command.to_string());

        if scripted.launch_error {
            return Err(RunError::Spawn {
                command: command.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "scripted launch error"),
            });
        }

        Ok(CommandOutput {
            stdout: scripted.stdout,
            stderr: scripted.stderr,
            exit_code: Some(scripted.exit_code),
            success: scripted.exit_code == 0,
        })
    }
}
