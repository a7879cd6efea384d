//! Formatting utilities for sizes, durations, and task summaries.

use kiln_pipeline::TaskReport;
use owo_colors::OwoColorize;
use std::time::Duration;

/// Format file size in human-readable format.
///
/// # Examples
///
/// ```
/// use kiln_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// assert_eq!(format_size(1_048_576), "1.00 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format duration in human-readable format.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use kiln_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    }
}

/// Print a summary line per task report, with its recorded transform
/// failures listed underneath.
pub fn print_task_reports(reports: &[TaskReport]) {
    for report in reports {
        let mut line = format!(
            "{}: {} file(s) written in {}",
            report.task,
            report.written.len(),
            format_duration(report.duration)
        );
        if report.unchanged > 0 {
            line.push_str(&format!(", {} unchanged", report.unchanged));
        }

        if report.is_clean() {
            eprintln!("{} {}", "✓".green().bold(), line);
        } else {
            eprintln!(
                "{} {} ({} failed)",
                "⚠".yellow().bold(),
                line,
                report.failures.len()
            );
            for failure in &report.failures {
                eprintln!("    {}", failure.to_string().yellow());
            }
        }
    }
}
