//! Where the display components write.
//!
//! Views print through a [`Console`] so the same rendering code drives the
//! terminal and the tests. Output is line-oriented.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Debug)]
enum Target {
    Stdout,
    Buffer(Mutex<Vec<String>>),
}

/// A cheap, cloneable output handle.
#[derive(Debug, Clone)]
pub struct Console {
    target: Arc<Target>,
}

impl Console {
    pub fn stdout() -> Self {
        Self {
            target: Arc::new(Target::Stdout),
        }
    }

    /// Collects lines in memory instead of printing them.
    pub fn buffer() -> Self {
        Self {
            target: Arc::new(Target::Buffer(Mutex::new(Vec::new()))),
        }
    }

    pub fn line(&self, text: impl AsRef<str>) {
        let text = text.as_ref();
        match self.target.as_ref() {
            Target::Stdout => {
                let mut out = std::io::stdout().lock();
                let _ = writeln!(out, "{}", text);
            }
            Target::Buffer(lines) if text.is_empty() => lines.lock().push(String::new()),
            Target::Buffer(lines) => {
                lines.lock().extend(text.lines().map(str::to_string));
            }
        }
    }

    pub fn blank(&self) {
        self.line("");
    }

    /// Buffered lines so far; always empty for stdout.
    pub fn lines(&self) -> Vec<String> {
        match self.target.as_ref() {
            Target::Stdout => Vec::new(),
            Target::Buffer(lines) => lines.lock().clone(),
        }
    }

    /// Buffered output joined with newlines.
    pub fn text(&self) -> String {
        self.lines().join("\n")
    }

    pub fn clear(&self) {
        if let Target::Buffer(lines) = self.target.as_ref() {
            lines.lock().clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_splits_multiline_text() {
        let console = Console::buffer();
        console.line("one\ntwo");
        console.blank();
        assert_eq!(console.lines(), vec!["one", "two", ""]);

        let clone = console.clone();
        clone.line("three");
        assert_eq!(console.lines().len(), 4);
        console.clear();
        assert!(clone.text().is_empty());
    }
}
