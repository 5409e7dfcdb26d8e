//! Run reporting: per-file results and the run summary, in text or JSON.
//!
//! The JSON form is a stable machine contract: `status` comes first, field
//! order is fixed by declaration order, and reports are emitted in the
//! deterministic target order. Absent optional fields mean "not applicable".

use std::io::{self, Write};
use std::path::PathBuf;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::ExitStatus;

/// Schema version for the JSON report envelope.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Report Types
// ============================================================================

/// Output rendering selected on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-oriented lines on stdout.
    #[default]
    Text,
    /// One JSON envelope on stdout.
    Json,
}

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileStatus {
    /// Already sorted; nothing written.
    Clean,
    /// Rewritten in place (or would be, under `--diff`).
    Changed,
    /// `--check` found the file unsorted.
    CheckFailed,
    /// A file-level skip directive excluded it.
    Skipped,
    /// Could not be processed; see `message`.
    Failed,
}

/// Result for one target file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
    /// Failure detail; present only for `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Unified diff of the pending change; present only under `--diff`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

impl FileReport {
    pub fn new(path: PathBuf, status: FileStatus) -> Self {
        FileReport {
            path,
            status,
            message: None,
            diff: None,
        }
    }

    pub fn failed(path: PathBuf, message: impl Into<String>) -> Self {
        FileReport {
            path,
            status: FileStatus::Failed,
            message: Some(message.into()),
            diff: None,
        }
    }
}

/// Aggregate result of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// `ok`, `dirty`, or `failed`; first field by contract.
    pub status: &'static str,
    pub schema_version: &'static str,
    pub files_scanned: usize,
    pub files_changed: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub reports: Vec<FileReport>,
}

impl RunSummary {
    /// Build the summary from per-file reports in target order.
    pub fn from_reports(reports: Vec<FileReport>) -> Self {
        let count = |status: FileStatus| reports.iter().filter(|r| r.status == status).count();
        let changed = count(FileStatus::Changed) + count(FileStatus::CheckFailed);
        let failed = count(FileStatus::Failed);
        let status = if failed > 0 {
            "failed"
        } else if count(FileStatus::CheckFailed) > 0 {
            "dirty"
        } else {
            "ok"
        };
        RunSummary {
            status,
            schema_version: SCHEMA_VERSION,
            files_scanned: reports.len(),
            files_changed: changed,
            files_skipped: count(FileStatus::Skipped),
            files_failed: failed,
            reports,
        }
    }

    /// The process exit status this run maps to.
    pub fn exit_status(&self) -> ExitStatus {
        if self.status == "ok" {
            ExitStatus::Clean
        } else {
            ExitStatus::Dirty
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Write the run report to `writer` in the selected format.
pub fn emit(summary: &RunSummary, format: OutputFormat, writer: &mut impl Write) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, summary)?;
            writeln!(writer)
        }
        OutputFormat::Text => emit_text(summary, writer),
    }
}

fn emit_text(summary: &RunSummary, writer: &mut impl Write) -> io::Result<()> {
    for report in &summary.reports {
        let path = report.path.display();
        match report.status {
            FileStatus::Clean => {}
            FileStatus::Changed => match &report.diff {
                Some(diff) => write!(writer, "{}", diff)?,
                None => writeln!(writer, "Fixing {}", path)?,
            },
            FileStatus::CheckFailed => writeln!(
                writer,
                "ERROR: {} imports are incorrectly sorted and/or formatted",
                path
            )?,
            FileStatus::Skipped => writeln!(writer, "Skipped {}", path)?,
            FileStatus::Failed => writeln!(
                writer,
                "ERROR: {} {}",
                path,
                report.message.as_deref().unwrap_or("unknown failure")
            )?,
        }
    }
    writeln!(
        writer,
        "{} files scanned, {} changed, {} skipped, {} failed",
        summary.files_scanned, summary.files_changed, summary.files_skipped, summary.files_failed
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RunSummary {
        RunSummary::from_reports(vec![
            FileReport::new(PathBuf::from("a.py"), FileStatus::Clean),
            FileReport::new(PathBuf::from("b.py"), FileStatus::Changed),
            FileReport::failed(PathBuf::from("c.py"), "parse error at line 3"),
        ])
    }

    mod summary {
        use super::*;

        #[test]
        fn counts_and_status() {
            let summary = sample();
            assert_eq!(summary.status, "failed");
            assert_eq!(summary.files_scanned, 3);
            assert_eq!(summary.files_changed, 1);
            assert_eq!(summary.files_failed, 1);
        }

        #[test]
        fn clean_run_is_ok() {
            let summary = RunSummary::from_reports(vec![FileReport::new(
                PathBuf::from("a.py"),
                FileStatus::Clean,
            )]);
            assert_eq!(summary.status, "ok");
            assert_eq!(summary.exit_status(), ExitStatus::Clean);
        }

        #[test]
        fn check_failure_is_dirty() {
            let summary = RunSummary::from_reports(vec![FileReport::new(
                PathBuf::from("a.py"),
                FileStatus::CheckFailed,
            )]);
            assert_eq!(summary.status, "dirty");
            assert_eq!(summary.exit_status(), ExitStatus::Dirty);
        }
    }

    mod emission {
        use super::*;

        #[test]
        fn json_envelope_leads_with_status() {
            let mut buf = Vec::new();
            emit(&sample(), OutputFormat::Json, &mut buf).unwrap();
            let text = String::from_utf8(buf).unwrap();
            assert!(text.trim_start().starts_with("{\n  \"status\""));
            let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
            assert_eq!(parsed["schema_version"], "1");
            assert_eq!(parsed["reports"][2]["status"], "failed");
        }

        #[test]
        fn text_mode_reports_changes_and_failures() {
            let mut buf = Vec::new();
            emit(&sample(), OutputFormat::Text, &mut buf).unwrap();
            let text = String::from_utf8(buf).unwrap();
            assert!(text.contains("Fixing b.py"));
            assert!(text.contains("ERROR: c.py parse error at line 3"));
            assert!(!text.contains("a.py\n"));
            assert!(text.contains("3 files scanned, 1 changed, 0 skipped, 1 failed"));
        }

        #[test]
        fn diff_text_replaces_the_fixing_line() {
            let mut report = FileReport::new(PathBuf::from("b.py"), FileStatus::Changed);
            report.diff = Some("--- a/b.py\n+++ b/b.py\n".to_string());
            let summary = RunSummary::from_reports(vec![report]);
            let mut buf = Vec::new();
            emit(&summary, OutputFormat::Text, &mut buf).unwrap();
            let text = String::from_utf8(buf).unwrap();
            assert!(text.contains("--- a/b.py"));
            assert!(!text.contains("Fixing"));
        }
    }
}
