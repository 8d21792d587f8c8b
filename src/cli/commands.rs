//! CLI command implementations
//!
//! Each command returns the process exit code; only `main` exits.

use super::output::{OutputEvent, OutputHandler};
use crate::config::ConfigBundle;
use crate::flow::{FlowRunner, plan_flow};

/// Run a flow and report it. An unknown flow is a no-op that exits 0.
pub async fn run_flow(
    flow_name: &str,
    bundle: &ConfigBundle,
    runner: &FlowRunner,
    handler: &dyn OutputHandler,
) -> i32 {
    handler.emit(OutputEvent::Debug {
        message: format!("Looking up flow '{}' in {} records", flow_name, bundle.records().len()),
    });

    let Some(report) = runner.run(flow_name, bundle).await else {
        handler.emit(OutputEvent::FlowNotFound {
            name: flow_name.to_string(),
        });
        return 0;
    };

    handler.report(&report);
    report.exit_code
}

/// Show how a flow would be grouped without running it
pub fn show_plan(flow_name: &str, bundle: &ConfigBundle, handler: &dyn OutputHandler) -> i32 {
    let Some(plan) = plan_flow(flow_name, bundle) else {
        handler.emit(OutputEvent::FlowNotFound {
            name: flow_name.to_string(),
        });
        return 0;
    };

    handler.emit(OutputEvent::Info {
        message: format!(
            "Flow '{}': {} tasks in {} groups",
            plan.name,
            plan.task_count(),
            plan.groups.len()
        ),
    });

    for (index, group) in plan.groups.iter().enumerate() {
        let mode = if group.is_parallel() {
            "parallel"
        } else {
            "sequential"
        };
        handler.emit(OutputEvent::Info {
            message: format!("  {}. [{}] {}", index + 1, mode, group.names().join(", ")),
        });
    }

    if !plan.missing.is_empty() {
        handler.emit(OutputEvent::Info {
            message: format!("  skipped (not defined): {}", plan.missing.join(", ")),
        });
    }

    0
}

/// List flows per record, in bundle order
pub fn list_flows(bundle: &ConfigBundle, handler: &dyn OutputHandler) {
    for (index, record) in bundle.records().iter().enumerate() {
        let source = record
            .source
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("record {}", index + 1));

        let version = record
            .version
            .as_ref()
            .map(|v| format!(" (version {})", v))
            .unwrap_or_default();

        handler.emit(OutputEvent::Info {
            message: format!("{}{}", source, version),
        });

        let names = record.flow_names();
        if names.is_empty() {
            handler.emit(OutputEvent::Info {
                message: "  (no flows)".into(),
            });
        }
        for name in names {
            handler.emit(OutputEvent::Info {
                message: format!("  {} - {} tasks", name, record.flows[name].tasks.len()),
            });
        }
    }
}
