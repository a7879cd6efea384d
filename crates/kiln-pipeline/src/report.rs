//! Per-task reports and the fault-isolation channel.
//!
//! Transformation steps run inside an error channel: a failure is recorded
//! on the report and logged, and the task keeps going with the remaining
//! inputs. This is what keeps one malformed source file from failing a whole
//! build.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// A recorded, non-fatal transformation failure.
#[derive(Debug, Clone)]
pub struct TransformFailure {
    /// File that failed to transform
    pub file: PathBuf,
    /// Pipeline stage that failed ("compile", "parse", "encode", ...)
    pub stage: &'static str,
    /// Underlying error message
    pub message: String,
}

impl std::fmt::Display for TransformFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}]: {}",
            self.file.display(),
            self.stage,
            self.message
        )
    }
}

/// Outcome of one pipeline task run.
#[derive(Debug, Clone)]
pub struct TaskReport {
    /// Task name ("styles", "scripts", "images", ...)
    pub task: &'static str,
    /// Files written to the destination tree
    pub written: Vec<PathBuf>,
    /// Inputs skipped as unchanged (images only)
    pub unchanged: usize,
    /// Recorded transformation failures
    pub failures: Vec<TransformFailure>,
    /// Wall-clock task duration
    pub duration: Duration,
}

impl TaskReport {
    /// Create an empty report for a task.
    pub fn new(task: &'static str) -> Self {
        Self {
            task,
            written: Vec::new(),
            unchanged: 0,
            failures: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Record a written output file.
    pub fn wrote(&mut self, path: impl Into<PathBuf>) {
        self.written.push(path.into());
    }

    /// Record a non-fatal transformation failure and log it.
    ///
    /// The stream stays open: callers continue with the remaining inputs.
    pub fn record_failure(&mut self, file: &Path, stage: &'static str, message: impl ToString) {
        let failure = TransformFailure {
            file: file.to_path_buf(),
            stage,
            message: message.to_string(),
        };
        tracing::warn!(task = self.task, %failure, "transform failed; continuing");
        self.failures.push(failure);
    }

    /// True when every input transformed cleanly.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_collects_failures() {
        let mut report = TaskReport::new("styles");
        assert!(report.is_clean());

        report.record_failure(Path::new("app/scss/bad.scss"), "compile", "unexpected `{`");
        assert!(!report.is_clean());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].stage, "compile");
    }

    #[test]
    fn test_failure_display() {
        let failure = TransformFailure {
            file: PathBuf::from("a.scss"),
            stage: "compile",
            message: "boom".to_string(),
        };
        let text = failure.to_string();
        assert!(text.contains("a.scss"));
        assert!(text.contains("compile"));
        assert!(text.contains("boom"));
    }
}
