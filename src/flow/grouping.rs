//! Partition a flow's task sequence into execution groups

use super::lookup::ResolvedTasks;
use crate::config::TaskConfig;

/// A task scheduled in a group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMember {
    pub name: String,
    pub task: TaskConfig,
}

/// Adjacent tasks that share one concurrency treatment.
///
/// Never empty. Whether the group runs in parallel is decided by its first
/// member alone.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionGroup {
    members: Vec<GroupMember>,
}

impl ExecutionGroup {
    fn start(member: GroupMember) -> Self {
        Self {
            members: vec![member],
        }
    }

    pub fn members(&self) -> &[GroupMember] {
        &self.members
    }

    pub fn is_parallel(&self) -> bool {
        self.members.first().is_some_and(|m| m.task.parallel)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }
}

/// Group `task_names` in declaration order.
///
/// A task joins the most recent group only when that group's first member and
/// the task are both parallel; otherwise it starts a new group. Names without
/// a resolved definition are skipped and never create a group.
pub fn group_tasks(task_names: &[String], resolved: &ResolvedTasks) -> Vec<ExecutionGroup> {
    let mut groups: Vec<ExecutionGroup> = Vec::new();

    for name in task_names {
        let Some(task) = resolved.get(name) else {
            continue;
        };

        let member = GroupMember {
            name: name.clone(),
            task: task.clone(),
        };

        match groups.last_mut() {
            Some(current) if current.is_parallel() && task.parallel => {
                current.members.push(member);
            }
            _ => groups.push(ExecutionGroup::start(member)),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigBundle, ConfigRecord};
    use crate::flow::lookup::resolve_tasks;

    /// Resolve `(name, parallel)` pairs through a single-record bundle
    fn resolved(tasks: &[(&str, bool)]) -> ResolvedTasks {
        let record = ConfigRecord {
            tasks: tasks
                .iter()
                .map(|(name, parallel)| {
                    (
                        name.to_string(),
                        TaskConfig {
                            script: format!("echo {}", name),
                            parallel: *parallel,
                            ..Default::default()
                        },
                    )
                })
                .collect(),
            ..Default::default()
        };
        let names: Vec<String> = tasks.iter().map(|(n, _)| n.to_string()).collect();
        resolve_tasks(&names, &ConfigBundle::new(vec![record]))
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|n| n.to_string()).collect()
    }

    fn shape(groups: &[ExecutionGroup]) -> Vec<Vec<&str>> {
        groups.iter().map(|g| g.names()).collect()
    }

    #[test]
    fn test_sequential_tasks_get_own_groups() {
        let tasks = resolved(&[("a", false), ("b", false), ("c", false)]);
        let groups = group_tasks(&names(&["a", "b", "c"]), &tasks);

        assert_eq!(shape(&groups), vec![vec!["a"], vec!["b"], vec!["c"]]);
        assert!(groups.iter().all(|g| !g.is_parallel()));
    }

    #[test]
    fn test_alternating_never_merges() {
        let tasks = resolved(&[("a", true), ("b", false), ("c", true), ("d", false)]);
        let groups = group_tasks(&names(&["a", "b", "c", "d"]), &tasks);

        assert_eq!(groups.len(), 4);
        assert!(groups.iter().all(|g| g.len() == 1));
    }

    #[test]
    fn test_parallel_run_merges_and_closes() {
        let tasks = resolved(&[("a", true), ("b", true), ("c", true), ("d", false), ("e", true)]);
        let groups = group_tasks(&names(&["a", "b", "c", "d", "e"]), &tasks);

        assert_eq!(
            shape(&groups),
            vec![vec!["a", "b", "c"], vec!["d"], vec!["e"]]
        );
        assert!(groups[0].is_parallel());
        assert!(!groups[1].is_parallel());
    }

    #[test]
    fn test_sequential_first_member_blocks_merge() {
        let tasks = resolved(&[("build", false), ("test", true), ("lint", true)]);
        let groups = group_tasks(&names(&["build", "test", "lint"]), &tasks);

        assert_eq!(shape(&groups), vec![vec!["build"], vec!["test", "lint"]]);
    }

    #[test]
    fn test_missing_task_skipped() {
        let tasks = resolved(&[("a", true), ("b", true), ("c", false)]);
        let groups = group_tasks(&names(&["ghost", "a", "ghost", "b", "c", "ghost"]), &tasks);

        assert_eq!(shape(&groups), vec![vec!["a", "b"], vec!["c"]]);
    }

    #[test]
    fn test_only_missing_tasks_yields_no_groups() {
        let tasks = resolved(&[]);
        let groups = group_tasks(&names(&["ghost", "phantom"]), &tasks);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_repeated_task_keeps_declaration_order() {
        let tasks = resolved(&[("a", true), ("b", false)]);
        let groups = group_tasks(&names(&["a", "a", "b", "a"]), &tasks);

        assert_eq!(shape(&groups), vec![vec!["a", "a"], vec!["b"], vec!["a"]]);
    }
}
