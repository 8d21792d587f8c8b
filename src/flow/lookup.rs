//! Flow and task lookup across every record in a bundle

use crate::config::{ConfigBundle, ConfigRecord, TaskConfig};
use std::collections::HashMap;

/// First record, in bundle order, that defines `flow_name`
pub fn find_flow<'a>(flow_name: &str, bundle: &'a ConfigBundle) -> Option<&'a ConfigRecord> {
    bundle
        .records()
        .iter()
        .find(|record| record.flows.contains_key(flow_name))
}

/// Task definitions resolved for one flow
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedTasks {
    tasks: HashMap<String, TaskConfig>,
}

impl ResolvedTasks {
    pub fn get(&self, name: &str) -> Option<&TaskConfig> {
        self.tasks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Names from `task_names` with no definition, in order, without duplicates
    pub fn missing(&self, task_names: &[String]) -> Vec<String> {
        let mut missing: Vec<String> = Vec::new();
        for name in task_names {
            if !self.contains(name) && !missing.contains(name) {
                missing.push(name.clone());
            }
        }
        missing
    }
}

/// Resolve `task_names` against every record in the bundle.
///
/// Records are merged in bundle order, so when several records define the
/// same task the last one wins. Undefined names are absent from the result.
pub fn resolve_tasks(task_names: &[String], bundle: &ConfigBundle) -> ResolvedTasks {
    let mut tasks = HashMap::new();

    for record in bundle.records() {
        for name in task_names {
            if let Some(task) = record.tasks.get(name) {
                tasks.insert(name.clone(), task.clone());
            }
        }
    }

    ResolvedTasks { tasks }
}
