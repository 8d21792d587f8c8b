//! Task results and the flow-level report built from them

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Why a task's primary script is considered failed
#[derive(Debug, Clone, Error, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskFailure {
    #[error("exited with code {code}")]
    Exited { code: i32 },

    #[error("terminated without an exit code")]
    Terminated,

    #[error("failed to launch: {message}")]
    Launch { message: String },

    #[error("aborted: {message}")]
    Aborted { message: String },
}

/// Outcome of a single task, as shown in summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Succeeded,
    Failed,
    FailedIgnored,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Succeeded => f.write_str("succeeded"),
            TaskStatus::Failed => f.write_str("failed"),
            TaskStatus::FailedIgnored => f.write_str("failed (ignored)"),
        }
    }
}

/// Result of running one task's primary script
#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    pub name: String,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub duration_ms: u64,

    /// Copied from the task definition; an ignored failure does not fail the flow
    pub ignore_failure: bool,

    /// Present iff the script exited non-zero or could not be launched
    pub error: Option<TaskFailure>,
}

impl TaskResult {
    /// Result for a task whose execution was lost before it produced output
    pub fn aborted(name: impl Into<String>, ignore_failure: bool, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            duration_ms: 0,
            ignore_failure,
            error: Some(TaskFailure::Aborted {
                message: message.into(),
            }),
        }
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    /// Whether this result makes the flow fail
    pub fn fails_flow(&self) -> bool {
        self.failed() && !self.ignore_failure
    }

    pub fn status(&self) -> TaskStatus {
        match (self.failed(), self.ignore_failure) {
            (false, _) => TaskStatus::Succeeded,
            (true, false) => TaskStatus::Failed,
            (true, true) => TaskStatus::FailedIgnored,
        }
    }
}

/// Aggregated outcome of one flow run
#[derive(Debug, Clone, Serialize)]
pub struct FlowReport {
    pub flow: String,

    /// Results in execution order: group order, then declared order within a group
    pub results: Vec<TaskResult>,

    pub success: bool,

    /// 0 when `success`, otherwise 1
    pub exit_code: i32,

    pub duration_ms: u64,

    /// Referenced tasks with no definition in any record, left out of the run
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl FlowReport {
    pub fn from_results(flow: impl Into<String>, results: Vec<TaskResult>, duration: Duration) -> Self {
        let success = !results.iter().any(TaskResult::fails_flow);
        Self {
            flow: flow.into(),
            results,
            success,
            exit_code: if success { 0 } else { 1 },
            duration_ms: duration.as_millis() as u64,
            skipped: Vec::new(),
        }
    }

    pub fn succeeded_count(&self) -> usize {
        self.results.iter().filter(|r| !r.failed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.failed()).count()
    }
}

#[cfg(test)]
impl FlowReport {
    pub fn task(&self, name: &str) -> Option<&TaskResult> {
        self.results.iter().find(|r| r.name == name)
    }
}
