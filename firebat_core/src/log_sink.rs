//! # Log Sink
//!
//! The in-app log console. Each call to [`LogSink::log`] (or the
//! [`log_line!`](crate::log_line) macro) becomes one timestamped line:
//!
//! ```text
//! [14:03:07] Open Fireball with /tmp/a.out
//! ```
//!
//! Arguments are rendered individually and joined with single spaces:
//! strings verbatim, numbers and booleans as literals, absent values as
//! `null`, anything else as compact JSON.
//!
//! The sink keeps at most `capacity` entries and evicts the oldest first.
//! Every entry is also emitted as a `tracing` event.
//!
//! ## Example
//!
//! ```rust
//! use firebat_core::log_line;
//! use firebat_core::log_sink::LogSink;
//!
//! let mut sink = LogSink::new(100);
//! log_line!(sink, "Section Analyzation Success", 3, "sections");
//! assert!(sink.latest().unwrap().ends_with("Section Analyzation Success 3 sections"));
//! ```

use std::collections::VecDeque;

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use serde_json::Value;

/// Shown by the collapsed log bar before anything was logged
pub const PLACEHOLDER: &str = "Log Shows Here";

/// Default number of retained entries
pub const DEFAULT_CAPACITY: usize = 1000;

/// Render one log argument as text.
pub fn render_arg<T: Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(Value::String(s)) => s,
        Ok(other) => other.to_string(),
        Err(e) => format!("<unrenderable: {}>", e),
    }
}

/// Log one line built from heterogeneous arguments.
///
/// Each argument only needs to implement `Serialize`.
#[macro_export]
macro_rules! log_line {
    ($sink:expr, $($arg:expr),+ $(,)?) => {
        $sink.log([$($crate::log_sink::render_arg(&$arg)),+])
    };
}

#[derive(Debug, Clone)]
pub struct LogSink {
    entries: VecDeque<String>,
    capacity: usize,
    expanded: bool,
}

impl Default for LogSink {
    fn default() -> Self {
        LogSink::new(DEFAULT_CAPACITY)
    }
}

impl LogSink {
    pub fn new(capacity: usize) -> Self {
        LogSink {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
            expanded: false,
        }
    }

    /// Append one entry made of already-rendered parts.
    pub fn log<I, S>(&mut self, parts: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let message = join_parts(parts);
        tracing::info!(target: "firebat::log", "{}", message);
        self.push(format_entry(&Local::now(), &message));
    }

    fn push(&mut self, entry: String) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Entries, oldest first
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.entries.iter().map(String::as_str)
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    /// Text for the collapsed log bar
    pub fn headline(&self) -> &str {
        self.latest().unwrap_or(PLACEHOLDER)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
    }
}

fn join_parts<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut message = String::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            message.push(' ');
        }
        message.push_str(part.as_ref());
    }
    message
}

fn format_entry<Tz: TimeZone>(now: &DateTime<Tz>, message: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("[{}] {}", now.format("%H:%M:%S"), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use regex::Regex;
    use serde_json::json;

    #[test]
    fn test_open_message_format() {
        let mut sink = LogSink::default();
        log_line!(sink, "Open Fireball with", "/tmp/x");

        let pattern = Regex::new(r"^\[\d{1,2}:\d{2}:\d{2}.*\] Open Fireball with /tmp/x\s*$").unwrap();
        assert_eq!(sink.len(), 1);
        assert!(pattern.is_match(sink.latest().unwrap()), "{:?}", sink.latest());
    }

    #[test]
    fn test_render_heterogeneous_args() {
        assert_eq!(render_arg("text"), "text");
        assert_eq!(render_arg(&42u64), "42");
        assert_eq!(render_arg(&true), "true");
        assert_eq!(render_arg(&Option::<String>::None), "null");
        assert_eq!(render_arg(&json!({ "a": [1, 2] })), r#"{"a":[1,2]}"#);
        assert_eq!(render_arg(&vec![16u64, 32]), "[16,32]");
    }

    #[test]
    fn test_format_entry_uses_wall_clock() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 9, 5, 7).unwrap();
        assert_eq!(format_entry(&at, "hello world"), "[09:05:07] hello world");
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut sink = LogSink::new(2);
        log_line!(sink, "one");
        log_line!(sink, "two");
        log_line!(sink, "three");

        let entries: Vec<&str> = sink.entries().collect();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].ends_with("two"));
        assert!(entries[1].ends_with("three"));
    }

    #[test]
    fn test_headline_and_expand() {
        let mut sink = LogSink::new(0);
        assert_eq!(sink.capacity(), 1);
        assert_eq!(sink.headline(), PLACEHOLDER);
        assert!(sink.is_empty());

        log_line!(sink, "Decompile Success", vec![4096u64]);
        assert!(sink.headline().ends_with("Decompile Success [4096]"));

        assert!(!sink.is_expanded());
        sink.toggle_expanded();
        assert!(sink.is_expanded());
    }
}
