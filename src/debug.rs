//! Debug output on stderr.
//!
//! Enabled with `--debug` or `[display] debug = true`. Lines go to
//! **stderr** so stdout stays clean for scripts, and group labels are bold
//! only when stderr is a terminal.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};

use archive_explorer_core::observe::DebugSink;

#[derive(Debug)]
pub struct StderrSink {
    depth: AtomicUsize,
    styled: bool,
}

impl Default for StderrSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StderrSink {
    pub fn new() -> Self {
        Self {
            depth: AtomicUsize::new(0),
            styled: atty::is(atty::Stream::Stderr),
        }
    }

    fn write(&self, text: &str) {
        let indent = "  ".repeat(self.depth.load(Ordering::Relaxed));
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "[debug] {}{}", indent, text);
        let _ = err.flush();
    }
}

/// Left-aligned columns, each as wide as its longest cell.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let render = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render(headers.to_vec())];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in rows {
        lines.push(render(row.iter().map(String::as_str).collect()));
    }
    lines
}

impl DebugSink for StderrSink {
    fn log(&self, message: &str) {
        self.write(message);
    }

    fn group(&self, label: &str, body: &mut dyn FnMut()) {
        if self.styled {
            self.write(&format!("\x1b[1m{}\x1b[0m", label));
        } else {
            self.write(label);
        }
        self.depth.fetch_add(1, Ordering::Relaxed);
        body();
        self.depth.fetch_sub(1, Ordering::Relaxed);
    }

    fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        for line in format_table(headers, rows) {
            self.write(&line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_table_aligns_columns() {
        let lines = format_table(
            &["len", "trigger", "message"],
            &[
                vec!["0".into(), "auto".into(), "".into()],
                vec!["12".into(), "manual".into(), "Showing manual search results".into()],
            ],
        );
        assert_eq!(lines[0], "len | trigger | message");
        assert_eq!(lines[1], "----+---------+------------------------------");
        assert_eq!(lines[2], "0   | auto");
        assert_eq!(lines[3], "12  | manual  | Showing manual search results");
    }

    #[test]
    fn test_group_restores_depth() {
        let sink = StderrSink::new();
        sink.group("outer", &mut || sink.log("inside"));
        assert_eq!(sink.depth.load(Ordering::Relaxed), 0);
    }
}
