//! Task and group execution

use super::grouping::ExecutionGroup;
use super::report::{TaskFailure, TaskResult};
use crate::config::TaskConfig;
use crate::process::{OutputWaitError, exit_status_code, wait_for_child_output};
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::process::Command;

/// Errors launching or collecting a command. Never escapes task execution.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to collect output of '{command}': {source}")]
    Output {
        command: String,
        #[source]
        source: OutputWaitError,
    },
}

/// Captured outcome of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub success: bool,
}

/// Launches shell commands on behalf of the engine
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion
    async fn run(&self, command: &str) -> Result<CommandOutput, RunError>;
}

/// Runs commands through `sh -c`, inheriting the caller's environment
#[derive(Debug, Clone)]
pub struct ShellRunner {
    working_dir: PathBuf,
}

impl ShellRunner {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str) -> Result<CommandOutput, RunError> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let (stdout, stderr, status) =
            wait_for_child_output(&mut child)
                .await
                .map_err(|source| RunError::Output {
                    command: command.to_string(),
                    source,
                })?;

        Ok(CommandOutput {
            stdout,
            stderr,
            exit_code: exit_status_code(&status),
            success: status.success(),
        })
    }
}

/// Which hook runs after a script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    Success,
    Failure,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookKind::Success => f.write_str("success"),
            HookKind::Failure => f.write_str("failure"),
        }
    }
}

/// Run a hook to completion.
///
/// Hooks are fire-and-forget: the outcome is logged and never returned, so a
/// broken hook cannot change the result of the task or flow that owns it.
pub async fn run_hook(runner: &dyn CommandRunner, owner: &str, kind: HookKind, command: &str) {
    tracing::debug!(owner, hook = %kind, command, "Running hook");

    match runner.run(command).await {
        Ok(output) if output.success => {
            tracing::debug!(owner, hook = %kind, "Hook finished");
        }
        Ok(output) => {
            tracing::warn!(
                owner,
                hook = %kind,
                exit_code = ?output.exit_code,
                stderr = output.stderr.trim(),
                "Hook failed"
            );
        }
        Err(e) => {
            tracing::warn!(owner, hook = %kind, error = %e, "Hook could not be run");
        }
    }
}

/// Run one task's script, then its success or failure hook.
///
/// The returned result always describes the primary script. Launch failures
/// are captured in the result, never propagated.
pub async fn run_task(runner: &dyn CommandRunner, name: &str, task: &TaskConfig) -> TaskResult {
    let start = Instant::now();
    tracing::debug!(task = name, script = %task.script, "Starting task");
    if let Some(condition) = &task.condition {
        tracing::debug!(task = name, condition = %condition, "Task condition is not evaluated, running unconditionally");
    }

    let (output, error) = match runner.run(&task.script).await {
        Ok(output) if output.success => (output, None),
        Ok(output) => {
            let failure = match output.exit_code {
                Some(code) => TaskFailure::Exited { code },
                None => TaskFailure::Terminated,
            };
            (output, Some(failure))
        }
        Err(e) => (
            CommandOutput::default(),
            Some(TaskFailure::Launch {
                message: e.to_string(),
            }),
        ),
    };

    let hook = match error {
        None => task.success.as_deref().map(|c| (HookKind::Success, c)),
        Some(_) => task.failure.as_deref().map(|c| (HookKind::Failure, c)),
    };
    if let Some((kind, command)) = hook {
        run_hook(runner, name, kind, command).await;
    }

    let duration_ms = start.elapsed().as_millis() as u64;
    match &error {
        None => tracing::info!(task = name, duration_ms, "Task succeeded"),
        Some(e) if task.ignore_failure => {
            tracing::warn!(task = name, duration_ms, error = %e, "Task failed (ignored)")
        }
        Some(e) => tracing::error!(task = name, duration_ms, error = %e, "Task failed"),
    }

    TaskResult {
        name: name.to_string(),
        stdout: output.stdout,
        stderr: output.stderr,
        exit_code: output.exit_code,
        duration_ms,
        ignore_failure: task.ignore_failure,
        error,
    }
}

/// Run every member of a group and return results in declared member order.
///
/// A parallel group fans out one tokio task per member and joins all of them;
/// any other group runs its members one at a time.
pub async fn run_group(runner: &Arc<dyn CommandRunner>, group: &ExecutionGroup) -> Vec<TaskResult> {
    let mut results = Vec::with_capacity(group.len());

    if !group.is_parallel() {
        for member in group.members() {
            results.push(run_task(runner.as_ref(), &member.name, &member.task).await);
        }
        return results;
    }

    let mut handles = Vec::with_capacity(group.len());
    for member in group.members() {
        let runner = Arc::clone(runner);
        let name = member.name.clone();
        let task = member.task.clone();

        let handle = tokio::spawn(async move { run_task(runner.as_ref(), &name, &task).await });
        handles.push((member.name.clone(), member.task.ignore_failure, handle));
    }

    // Awaiting in spawn order restores declared order whatever finishes first
    for (name, ignore_failure, handle) in handles {
        match handle.await {
            Ok(result) => results.push(result),
            Err(e) => {
                tracing::error!(task = %name, error = %e, "Task aborted");
                results.push(TaskResult::aborted(name, ignore_failure, e.to_string()));
            }
        }
    }

    results
}
