//! Output handlers for CLI commands
//!
//! Supports console (pretty), JSON, and quiet output modes.

use crate::flow::{FlowReport, TaskStatus};
use crate::process::OutputStream;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Output mode for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Console,
    Json,
    Quiet,
}

impl OutputMode {
    /// Parse from string; unknown values fall back to console
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "quiet" => Self::Quiet,
            _ => Self::Console,
        }
    }
}

/// Events emitted around a flow run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum OutputEvent {
    FlowNotFound {
        name: String,
    },
    Info {
        message: String,
    },
    Debug {
        message: String,
    },
}

/// Output handler trait
pub trait OutputHandler: Send + Sync {
    /// Emit an event
    fn emit(&self, event: OutputEvent);

    /// Write the final flow report
    fn report(&self, report: &FlowReport);
}

/// Console output handler
pub struct ConsoleHandler {
    debug: bool,
}

impl ConsoleHandler {
    /// Create a new console handler
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    fn format_duration(ms: u64) -> String {
        if ms < 1000 {
            format!("{}ms", ms)
        } else {
            format!("{:.1}s", ms as f64 / 1000.0)
        }
    }

    fn status_mark(status: TaskStatus) -> &'static str {
        match status {
            TaskStatus::Succeeded => "✓",
            TaskStatus::Failed => "✗",
            TaskStatus::FailedIgnored => "!",
        }
    }

    /// Pick the stream and text for an event, or `None` to stay silent
    fn route_event(&self, event: OutputEvent) -> Option<(OutputStream, String)> {
        match event {
            // already logged; an unknown flow is a silent no-op on the console
            OutputEvent::FlowNotFound { .. } => None,
            OutputEvent::Info { message } => Some((OutputStream::Stdout, message)),
            OutputEvent::Debug { message } if self.debug => {
                Some((OutputStream::Stderr, format!("[debug] {}", message)))
            }
            OutputEvent::Debug { .. } => None,
        }
    }

    /// Render a report: per-task output, per-task summary, then the flow summary
    fn format_report(report: &FlowReport) -> String {
        let mut out = String::new();

        for result in &report.results {
            let _ = writeln!(out, "── {}", result.name);
            if !result.stdout.is_empty() {
                out.push_str(&result.stdout);
                if !result.stdout.ends_with('\n') {
                    out.push('\n');
                }
            }
            if let Some(ref error) = result.error {
                if !result.stderr.trim().is_empty() {
                    out.push_str("stderr:\n");
                    for line in result.stderr.trim_end().lines() {
                        let _ = writeln!(out, "  {}", line);
                    }
                }
                let _ = writeln!(out, "error: {}", error);
            }
        }

        if !report.results.is_empty() {
            out.push('\n');
        }
        for result in &report.results {
            let status = result.status();
            let _ = writeln!(out, "{} {} {}", Self::status_mark(status), result.name, status);
        }

        out.push('\n');
        let duration = Self::format_duration(report.duration_ms);
        if report.success {
            let _ = writeln!(
                out,
                "✓ Flow '{}' completed successfully ({} tasks in {})",
                report.flow,
                report.results.len(),
                duration
            );
        } else {
            let _ = writeln!(
                out,
                "✗ Flow '{}' failed: {} of {} tasks failed ({})",
                report.flow,
                report.results.iter().filter(|r| r.fails_flow()).count(),
                report.results.len(),
                duration
            );
        }

        out
    }
}

impl OutputHandler for ConsoleHandler {
    fn emit(&self, event: OutputEvent) {
        match self.route_event(event) {
            Some((OutputStream::Stdout, line)) => println!("{}", line),
            Some((OutputStream::Stderr, line)) => eprintln!("{}", line),
            None => {}
        }
    }

    fn report(&self, report: &FlowReport) {
        print!("{}", Self::format_report(report));
    }
}

/// JSON output handler
pub struct JsonHandler {
    pretty: bool,
}

impl JsonHandler {
    /// Create a new JSON handler
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render<T: Serialize>(&self, value: &T) -> serde_json::Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }

    fn print_json<T: Serialize>(&self, value: &T) {
        match self.render(value) {
            Ok(s) => println!("{}", s),
            Err(e) => tracing::error!(error = %e, "Failed to serialize output"),
        }
    }
}

impl OutputHandler for JsonHandler {
    fn emit(&self, event: OutputEvent) {
        if matches!(event, OutputEvent::Debug { .. }) {
            return;
        }
        self.print_json(&event);
    }

    fn report(&self, report: &FlowReport) {
        self.print_json(report);
    }
}

/// Quiet handler: prints only the failing tasks and nothing else
pub struct QuietHandler;

impl QuietHandler {
    fn format_failures(report: &FlowReport) -> String {
        let mut out = String::new();
        for result in report.results.iter().filter(|r| r.fails_flow()) {
            if let Some(ref error) = result.error {
                let _ = writeln!(out, "✗ {}: {}", result.name, error);
            }
        }
        out
    }
}

impl OutputHandler for QuietHandler {
    fn emit(&self, event: OutputEvent) {
        if let OutputEvent::Info { message } = event {
            println!("{}", message);
        }
    }

    fn report(&self, report: &FlowReport) {
        eprint!("{}", Self::format_failures(report));
    }
}

/// Create an output handler based on mode
pub fn create_handler(mode: OutputMode, debug: bool) -> Box<dyn OutputHandler> {
    match mode {
        OutputMode::Console => Box::new(ConsoleHandler::new(debug)),
        OutputMode::Json => Box::new(JsonHandler::new(true)),
        OutputMode::Quiet => Box::new(QuietHandler),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::flow::{TaskFailure, TaskResult};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Mock handler for testing
    #[derive(Default)]
    pub(crate) struct MockHandler {
        events: Arc<Mutex<Vec<OutputEvent>>>,
        reports: Arc<Mutex<Vec<FlowReport>>>,
    }

    impl MockHandler {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<OutputEvent> {
            self.events.lock().unwrap().clone()
        }

        pub fn reports(&self) -> Vec<FlowReport> {
            self.reports.lock().unwrap().clone()
        }

        pub fn info_messages(&self) -> Vec<String> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    OutputEvent::Info { message } => Some(message),
                    _ => None,
                })
                .collect()
        }
    }

    impl OutputHandler for MockHandler {
        fn emit(&self, event: OutputEvent) {
            self.events.lock().unwrap().push(event);
        }

        fn report(&self, report: &FlowReport) {
            self.reports.lock().unwrap().push(report.clone());
        }
    }

    fn result(name: &str, stdout: &str, error: Option<TaskFailure>, ignore: bool) -> TaskResult {
        TaskResult {
            name: name.into(),
            stdout: stdout.into(),
            stderr: if error.is_some() { "bad things\n".into() } else { String::new() },
            exit_code: None,
            duration_ms: 0,
            ignore_failure: ignore,
            error,
        }
    }

    #[test]
    fn test_output_mode_parse() {
        assert_eq!(OutputMode::parse("json"), OutputMode::Json);
        assert_eq!(OutputMode::parse("QUIET"), OutputMode::Quiet);
        assert_eq!(OutputMode::parse("console"), OutputMode::Console);
        assert_eq!(OutputMode::parse("unknown"), OutputMode::Console);
    }

    #[test]
    fn test_console_format_duration() {
        assert_eq!(ConsoleHandler::format_duration(500), "500ms");
        assert_eq!(ConsoleHandler::format_duration(1000), "1.0s");
        assert_eq!(ConsoleHandler::format_duration(2500), "2.5s");
    }

    #[test]
    fn test_format_successful_report() {
        let report = FlowReport::from_results(
            "ci",
            vec![result("build", "built", None, false), result("test", "ok\n", None, false)],
            Duration::from_millis(1200),
        );

        let text = ConsoleHandler::format_report(&report);
        assert!(text.contains("── build\nbuilt\n"));
        assert!(text.contains("✓ build succeeded"));
        assert!(text.contains("✓ test succeeded"));
        assert!(text.contains("Flow 'ci' completed successfully (2 tasks in 1.2s)"));
        assert!(!text.contains("stderr:"));
    }

    #[test]
    fn test_format_failed_report() {
        let report = FlowReport::from_results(
            "ci",
            vec![
                result("build", "", None, false),
                result("lint", "", Some(TaskFailure::Exited { code: 1 }), false),
                result("flaky", "", Some(TaskFailure::Exited { code: 2 }), true),
            ],
            Duration::from_millis(40),
        );

        let text = ConsoleHandler::format_report(&report);
        assert!(text.contains("stderr:\n  bad things\n"));
        assert!(text.contains("error: exited with code 1"));
        assert!(text.contains("✗ lint failed"));
        assert!(text.contains("! flaky failed (ignored)"));
        assert!(text.contains("Flow 'ci' failed: 1 of 3 tasks failed (40ms)"));

        // per-task details come before summaries, flow summary last
        let details = text.find("── lint").unwrap();
        let summary = text.find("✗ lint failed").unwrap();
        let flow = text.find("Flow 'ci'").unwrap();
        assert!(details < summary && summary < flow);
    }

    #[test]
    fn test_mock_handler_captures_events() {
        let handler = MockHandler::new();

        handler.emit(OutputEvent::FlowNotFound { name: "ci".into() });
        handler.emit(OutputEvent::Info {
            message: "hello".into(),
        });

        assert_eq!(handler.events().len(), 2);
        assert_eq!(handler.info_messages(), vec!["hello"]);
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_value(OutputEvent::FlowNotFound {
            name: "deploy".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "FlowNotFound");
        assert_eq!(json["name"], "deploy");
    }

    #[test]
    fn test_console_routes_events() {
        let console = ConsoleHandler::new(false);
        assert_eq!(
            console.route_event(OutputEvent::Info {
                message: "hello".into()
            }),
            Some((OutputStream::Stdout, "hello".to_string()))
        );
        assert_eq!(
            console.route_event(OutputEvent::FlowNotFound { name: "deploy".into() }),
            None
        );
        assert_eq!(
            console.route_event(OutputEvent::Debug {
                message: "trace".into()
            }),
            None
        );

        let debug = ConsoleHandler::new(true);
        assert_eq!(
            debug.route_event(OutputEvent::Debug {
                message: "trace".into()
            }),
            Some((OutputStream::Stderr, "[debug] trace".to_string()))
        );
    }

    #[test]
    fn test_json_handler_render() {
        let event = OutputEvent::Info {
            message: "hi".into(),
        };

        let compact = JsonHandler::new(false).render(&event).unwrap();
        assert_eq!(compact, r#"{"type":"Info","message":"hi"}"#);

        let pretty = JsonHandler::new(true).render(&event).unwrap();
        assert!(pretty.contains('\n'));
        assert_eq!(
            serde_json::from_str::<OutputEvent>(&pretty).unwrap(),
            event
        );
    }

    #[test]
    fn test_quiet_handler_lists_only_flow_failures() {
        let report = FlowReport::from_results(
            "ci",
            vec![
                result("build", "", None, false),
                result("lint", "", Some(TaskFailure::Exited { code: 1 }), false),
                result("flaky", "", Some(TaskFailure::Exited { code: 2 }), true),
            ],
            Duration::ZERO,
        );

        assert_eq!(
            QuietHandler::format_failures(&report),
            "✗ lint: exited with code 1\n"
        );
    }

    #[test]
    fn test_quiet_handler_silent_on_success() {
        let report = FlowReport::from_results("ci", vec![result("build", "", None, false)], Duration::ZERO);
        assert!(QuietHandler::format_failures(&report).is_empty());
    }
}
