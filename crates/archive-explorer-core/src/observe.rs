//! Optional debug output for components.
//!
//! Components take an `Option<Arc<dyn DebugSink>>` and call it only when
//! present. Nothing in the core depends on a sink for correctness.

use std::sync::Arc;

use parking_lot::Mutex;

/// Capability interface for debug output.
pub trait DebugSink: Send + Sync {
    fn log(&self, message: &str);

    /// Run `body` with its output grouped under `label`.
    fn group(&self, label: &str, body: &mut dyn FnMut());

    fn table(&self, headers: &[&str], rows: &[Vec<String>]);
}

pub type SharedSink = Arc<dyn DebugSink>;

/// Forwards everything to `tracing` at debug level. The CLI uses it when
/// `RUST_LOG` enables debug output and `--debug` is off.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DebugSink for TracingSink {
    fn log(&self, message: &str) {
        tracing::debug!("{}", message);
    }

    fn group(&self, label: &str, body: &mut dyn FnMut()) {
        let span = tracing::debug_span!("group", label = %label);
        let _guard = span.enter();
        body();
    }

    fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        tracing::debug!("{}", headers.join(" | "));
        for row in rows {
            tracing::debug!("{}", row.join(" | "));
        }
    }
}

/// Keeps every line in memory. Handy in tests and for post-mortem dumps.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
    depth: Mutex<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    fn push(&self, line: String) {
        let indent = "  ".repeat(*self.depth.lock());
        self.lines.lock().push(format!("{}{}", indent, line));
    }
}

impl DebugSink for RecordingSink {
    fn log(&self, message: &str) {
        self.push(message.to_string());
    }

    fn group(&self, label: &str, body: &mut dyn FnMut()) {
        self.push(format!("[{}]", label));
        *self.depth.lock() += 1;
        body();
        *self.depth.lock() -= 1;
    }

    fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        self.push(headers.join(" | "));
        for row in rows {
            self.push(row.join(" | "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_indents_groups() {
        let sink = RecordingSink::new();
        sink.log("top");
        sink.group("outer", &mut || {
            sink.log("inside");
        });
        sink.table(&["a", "b"], &[vec!["1".into(), "2".into()]]);
        assert_eq!(
            sink.lines(),
            vec!["top", "[outer]", "  inside", "a | b", "1 | 2"]
        );
    }

    #[test]
    fn test_tracing_sink_runs_group_body() {
        let sink = TracingSink;
        let mut ran = false;
        sink.log("top");
        sink.group("outer", &mut || ran = true);
        sink.table(&["a"], &[vec!["1".into()]]);
        assert!(ran);
    }
}
