//! Events sent from the worker to whoever renders the run.
//!
//! The worker is the only producer; per run, events arrive in processing
//! order and exactly one terminal event (`Success`, `Failure` or
//! `Cancelled`) comes last.

use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanProgress {
    pub processed: usize,
    /// Fixed by the count pass. Files added or removed between the two passes
    /// are not re-counted, so `processed` may end below or above it.
    pub total: usize,
    pub current_file: String,
}

impl ScanProgress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            100.0 * self.processed as f64 / self.total as f64
        }
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Warn,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct LogMessage {
    pub level: LogLevel,
    pub text: String,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Progress(ScanProgress),
    Log(LogMessage),
    Success { entry_count: usize, output: PathBuf },
    Failure { message: String },
    Cancelled { entries_written: usize },
}

impl Event {
    pub fn info(text: impl Into<String>) -> Self {
        Event::Log(LogMessage { level: LogLevel::Info, text: text.into() })
    }

    pub fn warn(text: impl Into<String>) -> Self {
        Event::Log(LogMessage { level: LogLevel::Warn, text: text.into() })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::Success { .. } | Event::Failure { .. } | Event::Cancelled { .. })
    }
}

/// How a run ended. Mirrors the terminal event.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Completed { entry_count: usize },
    Failed { message: String },
    Cancelled { entries_written: usize },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Completed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_events() {
        assert!(!Event::info("x").is_terminal());
        assert!(!Event::Progress(ScanProgress::default()).is_terminal());
        assert!(Event::Cancelled { entries_written: 3 }.is_terminal());
        assert!(Event::Failure { message: "disk full".into() }.is_terminal());
    }

    #[test]
    fn events_serialize_tagged() {
        let ev = Event::Progress(ScanProgress { processed: 1, total: 2, current_file: "a".into() });
        let v: serde_json::Value = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["event"], "progress");
        assert_eq!(v["processed"], 1);
        let v = serde_json::to_value(Event::warn("w")).unwrap();
        assert_eq!(v["event"], "log");
        assert_eq!(v["level"], "warn");
    }

    #[test]
    fn percent_of_empty_run_is_full() {
        assert_eq!(ScanProgress::default().percent(), 100.0);
    }
}
