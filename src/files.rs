//! File discovery and the parallel per-file runner.
//!
//! Targets named on the command line are files or directories; directories
//! are walked recursively for Python sources. The discovered list is sorted
//! so reports and diffs come out in a stable order regardless of filesystem
//! iteration or worker scheduling. Files are processed in parallel; each
//! file is independent, so a failure in one never blocks the rest.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::classify::SectionResolver;
use crate::config::Config;
use crate::diff::unified_diff;
use crate::error::SortError;
use crate::format::sort_source;
use crate::output::{FileReport, FileStatus, RunSummary};

// ============================================================================
// Run Mode
// ============================================================================

/// What to do with a file whose imports are out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Rewrite the file in place.
    Write,
    /// Report it without writing (exit status carries the verdict).
    Check,
    /// Print a unified diff without writing.
    Diff,
}

// ============================================================================
// Discovery
// ============================================================================

/// Extensions treated as Python source when walking directories.
const PYTHON_EXTENSIONS: &[&str] = &["py", "pyi", "pyx"];

fn is_python_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| PYTHON_EXTENSIONS.contains(&e))
}

/// Expand command-line targets into a sorted, de-duplicated file list.
///
/// Files named explicitly are taken as-is; only directory walks filter by
/// extension. A missing target is an error rather than a silent no-op.
pub fn collect_targets(paths: &[PathBuf]) -> Result<Vec<PathBuf>, SortError> {
    let mut targets = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(|e| {
                    SortError::io(
                        path.display().to_string(),
                        e.into_io_error()
                            .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
                    )
                })?;
                if entry.file_type().is_file() && is_python_file(entry.path()) {
                    targets.push(entry.path().to_path_buf());
                }
            }
        } else if path.is_file() {
            targets.push(path.clone());
        } else {
            return Err(SortError::io(
                path.display().to_string(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
            ));
        }
    }
    targets.sort();
    targets.dedup();
    Ok(targets)
}

// ============================================================================
// Runner
// ============================================================================

/// Process every target and aggregate the results in target order.
pub fn process_files(
    targets: &[PathBuf],
    config: &Config,
    resolver: &SectionResolver,
    mode: RunMode,
) -> RunSummary {
    let reports: Vec<FileReport> = targets
        .par_iter()
        .map(|path| process_one(path, config, resolver, mode))
        .collect();
    RunSummary::from_reports(reports)
}

/// Process one file; never panics, all failures become a `Failed` report.
fn process_one(
    path: &Path,
    config: &Config,
    resolver: &SectionResolver,
    mode: RunMode,
) -> FileReport {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => return FileReport::failed(path.to_path_buf(), err.to_string()),
    };

    let outcome = match sort_source(&source, config, resolver) {
        Ok(outcome) => outcome,
        Err(err) => return FileReport::failed(path.to_path_buf(), err.to_string()),
    };

    if outcome.skipped {
        return FileReport::new(path.to_path_buf(), FileStatus::Skipped);
    }
    if !outcome.changed {
        return FileReport::new(path.to_path_buf(), FileStatus::Clean);
    }

    match mode {
        RunMode::Check => FileReport::new(path.to_path_buf(), FileStatus::CheckFailed),
        RunMode::Diff => {
            let mut report = FileReport::new(path.to_path_buf(), FileStatus::Changed);
            report.diff = Some(unified_diff(
                &path.display().to_string(),
                &source,
                &outcome.output,
            ));
            report
        }
        RunMode::Write => match write_atomic(path, &outcome.output) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "rewrote imports");
                FileReport::new(path.to_path_buf(), FileStatus::Changed)
            }
            Err(err) => FileReport::failed(path.to_path_buf(), err.to_string()),
        },
    }
}

/// Replace the file through a same-directory temporary so a crash mid-write
/// never leaves a truncated source file.
fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp~");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, content)?;
    match fs::rename(&tmp, path) {
        Ok(()) => Ok(()),
        Err(err) => {
            let _ = fs::remove_file(&tmp);
            Err(err)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn run(targets: &[PathBuf], mode: RunMode) -> RunSummary {
        let config = Config::default();
        let resolver = SectionResolver::new(&config);
        process_files(targets, &config, &resolver, mode)
    }

    mod discovery {
        use super::*;

        #[test]
        fn directories_walk_to_python_files_only() {
            let dir = TempDir::new().unwrap();
            write(&dir, "a.py", "");
            write(&dir, "b.txt", "");
            write(&dir, "pkg/c.pyi", "");
            write(&dir, "pkg/d.pyx", "");
            let targets = collect_targets(&[dir.path().to_path_buf()]).unwrap();
            let names: Vec<String> = targets
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect();
            assert_eq!(names, vec!["a.py", "c.pyi", "d.pyx"]);
        }

        #[test]
        fn explicit_files_bypass_the_extension_filter() {
            let dir = TempDir::new().unwrap();
            let script = write(&dir, "tool", "import os\n");
            let targets = collect_targets(&[script.clone()]).unwrap();
            assert_eq!(targets, vec![script]);
        }

        #[test]
        fn missing_target_is_an_error() {
            assert!(collect_targets(&[PathBuf::from("/no/such/path.py")]).is_err());
        }

        #[test]
        fn duplicate_targets_collapse() {
            let dir = TempDir::new().unwrap();
            let file = write(&dir, "a.py", "");
            let targets = collect_targets(&[file.clone(), file.clone()]).unwrap();
            assert_eq!(targets.len(), 1);
        }
    }

    mod runner {
        use super::*;

        #[test]
        fn write_mode_rewrites_in_place() {
            let dir = TempDir::new().unwrap();
            let file = write(&dir, "a.py", "import sys\nimport os\n");
            let summary = run(&[file.clone()], RunMode::Write);
            assert_eq!(summary.status, "ok");
            assert_eq!(summary.files_changed, 1);
            assert_eq!(fs::read_to_string(&file).unwrap(), "import os\nimport sys\n");
        }

        #[test]
        fn check_mode_never_writes() {
            let dir = TempDir::new().unwrap();
            let source = "import sys\nimport os\n";
            let file = write(&dir, "a.py", source);
            let summary = run(&[file.clone()], RunMode::Check);
            assert_eq!(summary.status, "dirty");
            assert_eq!(fs::read_to_string(&file).unwrap(), source);
        }

        #[test]
        fn diff_mode_reports_without_writing() {
            let dir = TempDir::new().unwrap();
            let source = "import sys\nimport os\n";
            let file = write(&dir, "a.py", source);
            let summary = run(&[file.clone()], RunMode::Diff);
            let diff = summary.reports[0].diff.as_deref().unwrap();
            assert!(diff.contains("+import os"));
            assert_eq!(fs::read_to_string(&file).unwrap(), source);
        }

        #[test]
        fn clean_files_are_left_alone() {
            let dir = TempDir::new().unwrap();
            let file = write(&dir, "a.py", "import os\n");
            let summary = run(&[file], RunMode::Write);
            assert_eq!(summary.files_changed, 0);
            assert_eq!(summary.status, "ok");
        }

        #[test]
        fn unreadable_file_fails_without_stopping_the_run() {
            let dir = TempDir::new().unwrap();
            let good = write(&dir, "a.py", "import sys\nimport os\n");
            let bad = dir.path().join("missing.py");
            let summary = run(&[good, bad], RunMode::Check);
            assert_eq!(summary.files_failed, 1);
            assert_eq!(summary.files_changed, 1);
            assert_eq!(summary.status, "failed");
        }

        #[test]
        fn skip_file_directive_reports_skipped() {
            let dir = TempDir::new().unwrap();
            let file = write(&dir, "a.py", "# isort:skip_file\nimport sys\nimport os\n");
            let summary = run(&[file], RunMode::Write);
            assert_eq!(summary.files_skipped, 1);
            assert_eq!(summary.status, "ok");
        }

        #[test]
        fn reports_come_back_in_target_order() {
            let dir = TempDir::new().unwrap();
            let a = write(&dir, "a.py", "import os\n");
            let b = write(&dir, "b.py", "import os\n");
            let summary = run(&[a.clone(), b.clone()], RunMode::Check);
            assert_eq!(summary.reports[0].path, a);
            assert_eq!(summary.reports[1].path, b);
        }
    }
}
