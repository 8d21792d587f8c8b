//! Flow execution engine for vorta
//!
//! This module handles:
//! - Flow lookup and task resolution across configuration records
//! - Grouping of adjacent parallel tasks
//! - Task execution with success/failure hooks
//! - Result aggregation into a `FlowReport`
//!
//! # Example
//!
//! ```ignore
//! use vorta::config::ConfigBundle;
//! use vorta::flow::FlowRunner;
//!
//! let bundle = ConfigBundle::load(Path::new("."))?;
//! let runner = FlowRunner::with_shell(Path::new("."));
//!
//! if let Some(report) = runner.run("ci", &bundle).await {
//!     std::process::exit(report.exit_code);
//! }
//! ```

mod executor;
mod grouping;
mod lookup;
mod report;
mod runner;
#[cfg(test)]
mod testing;

#[allow(unused_imports)]
pub use executor::{CommandOutput, CommandRunner, RunError, ShellRunner};
#[allow(unused_imports)]
pub use grouping::{ExecutionGroup, GroupMember};
pub use report::{FlowReport, TaskStatus};
#[allow(unused_imports)]
pub use report::{TaskFailure, TaskResult};
pub use runner::{FlowRunner, plan_flow};
