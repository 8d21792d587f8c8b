//! Flow runner - orchestrates lookup, grouping, execution, and aggregation

use super::executor::{CommandRunner, HookKind, ShellRunner, run_group, run_hook};
use super::grouping::{ExecutionGroup, group_tasks};
use super::lookup::{find_flow, resolve_tasks};
use super::report::FlowReport;
use crate::config::{ConfigBundle, FlowConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Everything needed to execute a flow, computed without running anything
#[derive(Debug, Clone)]
pub struct FlowPlan {
    pub name: String,
    pub flow: FlowConfig,
    pub groups: Vec<ExecutionGroup>,

    /// Referenced task names with no definition in any record
    pub missing: Vec<String>,
}

impl FlowPlan {
    /// Number of tasks that will run
    pub fn task_count(&self) -> usize {
        self.groups.iter().map(ExecutionGroup::len).sum()
    }
}

/// Look up `flow_name`, resolve its tasks, and group them.
///
/// Returns `None` when no record defines the flow.
pub fn plan_flow(flow_name: &str, bundle: &ConfigBundle) -> Option<FlowPlan> {
    let Some(record) = find_flow(flow_name, bundle) else {
        tracing::warn!(flow = flow_name, "Flow not defined in any record, nothing to run");
        return None;
    };
    let flow = record.flows.get(flow_name)?.clone();

    let resolved = resolve_tasks(&flow.tasks, bundle);
    let groups = group_tasks(&flow.tasks, &resolved);
    let missing = resolved.missing(&flow.tasks);

    tracing::debug!(
        flow = flow_name,
        source = ?record.source,
        resolved = resolved.len(),
        groups = groups.len(),
        "Planned flow"
    );

    Some(FlowPlan {
        name: flow_name.to_string(),
        flow,
        groups,
        missing,
    })
}

/// Flow runner
pub struct FlowRunner {
    runner: Arc<dyn CommandRunner>,
}

impl FlowRunner {
    /// Create a runner that launches commands through `runner`
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Create a runner that executes scripts with `sh -c` in `working_dir`
    pub fn with_shell(working_dir: &Path) -> Self {
        Self::new(Arc::new(ShellRunner::new(working_dir)))
    }

    /// Run a flow by name.
    ///
    /// An unknown flow is a silent no-op and yields `None`.
    pub async fn run(&self, flow_name: &str, bundle: &ConfigBundle) -> Option<FlowReport> {
        let plan = plan_flow(flow_name, bundle)?;
        Some(self.run_plan(&plan).await)
    }

    /// Execute a planned flow. Groups run strictly one after another.
    async fn run_plan(&self, plan: &FlowPlan) -> FlowReport {
        for name in &plan.missing {
            tracing::warn!(flow = %plan.name, task = %name, "Task not defined in any record, skipping");
        }

        let start = Instant::now();
        let total = plan.groups.len();
        let mut results = Vec::with_capacity(plan.task_count());

        for (index, group) in plan.groups.iter().enumerate() {
            tracing::info!(
                flow = %plan.name,
                group = index + 1,
                total,
                parallel = group.is_parallel(),
                tasks = ?group.names(),
                "Running group"
            );

            let group_results = run_group(&self.runner, group).await;
            results.extend(group_results);
        }

        let mut report = FlowReport::from_results(plan.name.clone(), results, start.elapsed());
        report.skipped = plan.missing.clone();
        tracing::info!(
            flow = %report.flow,
            success = report.success,
            succeeded = report.succeeded_count(),
            failed = report.failed_count(),
            duration_ms = report.duration_ms,
            "Flow finished"
        );

        self.run_flow_hook(&plan.flow, &report).await;
        report
    }

    /// Run the flow-level success or failure hook, if configured
    async fn run_flow_hook(&self, flow: &FlowConfig, report: &FlowReport) {
        let hook = if report.success {
            flow.success.as_deref().map(|c| (HookKind::Success, c))
        } else {
            flow.failure.as_deref().map(|c| (HookKind::Failure, c))
        };

        if let Some((kind, command)) = hook {
            run_hook(self.runner.as_ref(), &report.flow, kind, command).await;
        }
    }
}
