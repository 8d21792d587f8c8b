//! Configuration record types: tasks, flows, and the record that holds them

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Record version, written either as a string (`"1.0.0"`) or a bare number
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ConfigVersion {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ConfigVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigVersion::Integer(v) => write!(f, "{}", v),
            ConfigVersion::Float(v) => write!(f, "{}", v),
            ConfigVersion::Text(v) => f.write_str(v),
        }
    }
}

/// A named unit of work
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskConfig {
    /// Shell command run via `sh -c`
    pub script: String,

    /// Hook run after the script exits successfully
    pub success: Option<String>,

    /// Hook run after the script fails
    pub failure: Option<String>,

    /// A failure of this task does not fail the flow
    #[serde(default)]
    pub ignore_failure: bool,

    /// May run concurrently with adjacent parallel tasks
    #[serde(default)]
    pub parallel: bool,

    /// Reserved; never evaluated
    #[serde(rename = "if")]
    pub condition: Option<String>,
}

/// A named, ordered list of task references
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FlowConfig {
    /// Task names in declaration order
    #[serde(default)]
    pub tasks: Vec<String>,

    /// Hook run after the whole flow succeeds
    pub success: Option<String>,

    /// Hook run after the flow fails
    pub failure: Option<String>,
}

/// One configuration file's worth of tasks and flows.
///
/// Extra top-level keys, such as YAML anchor holders, are ignored. Tasks and
/// flows still reject unknown fields.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfigRecord {
    pub version: Option<ConfigVersion>,

    #[serde(default)]
    pub tasks: HashMap<String, TaskConfig>,

    #[serde(default)]
    pub flows: HashMap<String, FlowConfig>,

    /// File this record was loaded from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl ConfigRecord {
    /// Validate the record, collecting every problem rather than stopping at the first
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let mut task_names: Vec<_> = self.tasks.keys().collect();
        task_names.sort();
        for name in task_names {
            let task = &self.tasks[name];
            if task.script.trim().is_empty() {
                errors.push(format!("task '{}' has an empty 'script'", name));
            }
            check_hook(&mut errors, "task", name, "success", task.success.as_deref());
            check_hook(&mut errors, "task", name, "failure", task.failure.as_deref());
        }

        let mut flow_names: Vec<_> = self.flows.keys().collect();
        flow_names.sort();
        for name in flow_names {
            let flow = &self.flows[name];
            if flow.tasks.iter().any(|t| t.trim().is_empty()) {
                errors.push(format!("flow '{}' references an empty task name", name));
            }
            check_hook(&mut errors, "flow", name, "success", flow.success.as_deref());
            check_hook(&mut errors, "flow", name, "failure", flow.failure.as_deref());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Flow names in this record, sorted
    pub fn flow_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.flows.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn check_hook(errors: &mut Vec<String>, kind: &str, owner: &str, hook: &str, command: Option<&str>) {
    if let Some(command) = command {
        if command.trim().is_empty() {
            errors.push(format!("{} '{}' has an empty '{}' hook", kind, owner, hook));
        }
    }
}
