//! CLI module for vorta
//!
//! This module provides:
//! - Command implementations (flow, plan, flows)
//! - Output handlers (console, JSON, quiet)
//!
//! # Example
//!
//! ```ignore
//! use vorta::cli::{commands, output};
//!
//! let handler = output::create_handler(output::OutputMode::Console, false);
//! let exit_code = commands::run_flow("ci", &bundle, &runner, &*handler).await;
//! ```

pub mod commands;
pub mod output;

pub use commands::{list_flows, run_flow, show_plan};
pub use output::{OutputMode, create_handler};
