//! Binary entry point for the impsort CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Sort imports in place
//! impsort src/
//!
//! # Verify without writing (exit 1 when anything is unsorted)
//! impsort --check src/
//!
//! # Preview the changes as a unified diff
//! impsort --diff app.py
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use impsort::config::{Config, PythonVersion, SortOrder, WrapMode};
use impsort::error::{ExitStatus, SortError};
use impsort::files::{self, RunMode};
use impsort::output::{self, OutputFormat};
use impsort::SectionResolver;

// ============================================================================
// CLI Structure
// ============================================================================

/// Sort Python imports deterministically.
///
/// Rewrites each file's leading import block: imports are grouped into
/// sections, ordered, merged, and wrapped to the configured line length.
/// Everything outside the import block is left untouched.
#[derive(Parser, Debug)]
#[command(name = "impsort", version, about = "Sort Python imports deterministically")]
struct Cli {
    /// Files or directories to process; directories are walked for
    /// .py/.pyi/.pyx files.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Report unsorted files without writing; exit 1 if any are found.
    #[arg(long, conflicts_with = "diff")]
    check: bool,

    /// Print unified diffs of pending changes without writing.
    #[arg(long)]
    diff: bool,

    /// Maximum physical line length.
    #[arg(long, default_value_t = 79)]
    line_length: usize,

    /// Layout for statements exceeding the line length.
    #[arg(long, value_enum, default_value = "grid")]
    multi_line: WrapMode,

    /// Primary comparator for import order within a section.
    #[arg(long, value_enum, default_value = "alphabetical")]
    sort_order: SortOrder,

    /// Target Python version (keys the standard-library table).
    #[arg(long, value_enum, default_value = "py311")]
    python_version: PythonVersion,

    /// Compare module names case-sensitively.
    #[arg(long)]
    case_sensitive: bool,

    /// Sort straight and from-imports together instead of straight-first.
    #[arg(long)]
    force_sort_within_sections: bool,

    /// Emit one imported name per from-statement.
    #[arg(long)]
    force_single_line: bool,

    /// Keep aliased names in the shared name list instead of splitting them
    /// into their own statements.
    #[arg(long)]
    combine_as: bool,

    /// Combine each section's plain straight imports into one statement.
    #[arg(long)]
    combine_straight_imports: bool,

    /// Add a trailing comma after the final name in parenthesized layouts.
    #[arg(long)]
    trailing_comma: bool,

    /// Wrap hanging-indent statements with backslashes instead of
    /// parentheses.
    #[arg(long)]
    no_parentheses: bool,

    /// Blank lines between import sections.
    #[arg(long, default_value_t = 1)]
    lines_between_sections: usize,

    /// Allow the import block to span a single blank-line gap.
    #[arg(long)]
    span_blank_lines: bool,

    /// Module prefix classified as first-party (repeatable).
    #[arg(long = "known-first-party", value_name = "MODULE")]
    known_first_party: Vec<String>,

    /// Module prefix pinned to third-party (repeatable).
    #[arg(long = "known-third-party", value_name = "MODULE")]
    known_third_party: Vec<String>,

    /// Extra module treated as standard library (repeatable).
    #[arg(long = "extra-standard-library", value_name = "MODULE")]
    extra_standard_library: Vec<String>,

    /// Module pinned before the rest of its section (repeatable).
    #[arg(long = "force-to-top", value_name = "MODULE")]
    force_to_top: Vec<String>,

    /// Module prefix carved out into its own trailing section (repeatable).
    #[arg(long = "forced-separate", value_name = "PREFIX")]
    forced_separate: Vec<String>,

    /// Explicit section override in `<module>=<section>` form (repeatable).
    #[arg(long = "section-override", value_name = "MODULE=SECTION", value_parser = parse_section_override)]
    section_overrides: Vec<(String, String)>,

    /// Report format.
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Log level for tracing output.
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Parse a section override in `<module>=<section>` format.
fn parse_section_override(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((module, section)) if !module.is_empty() && !section.is_empty() => {
            Ok((module.to_string(), section.to_string()))
        }
        _ => Err(format!(
            "invalid section override '{}', expected '<module>=<section>' (e.g., 'mylib=FIRSTPARTY')",
            s
        )),
    }
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl Cli {
    fn to_config(&self) -> Config {
        Config {
            line_length: self.line_length,
            wrap_mode: self.multi_line,
            sort_order: self.sort_order,
            python_version: self.python_version,
            case_sensitive: self.case_sensitive,
            force_sort_within_sections: self.force_sort_within_sections,
            force_single_line: self.force_single_line,
            combine_as: self.combine_as,
            combine_straight_imports: self.combine_straight_imports,
            include_trailing_comma: self.trailing_comma,
            use_parentheses: !self.no_parentheses,
            blank_lines_between_sections: self.lines_between_sections,
            span_blank_lines: self.span_blank_lines,
            known_first_party: self.known_first_party.iter().cloned().collect(),
            known_third_party: self.known_third_party.iter().cloned().collect(),
            extra_standard_library: self.extra_standard_library.iter().cloned().collect(),
            force_to_top: self.force_to_top.iter().cloned().collect(),
            forced_separate: self.forced_separate.clone(),
            section_overrides: self.section_overrides.iter().cloned().collect(),
            ..Config::default()
        }
    }

    fn run_mode(&self) -> RunMode {
        if self.check {
            RunMode::Check
        } else if self.diff {
            RunMode::Diff
        } else {
            RunMode::Write
        }
    }
}

// ============================================================================
// Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.log_level);

    match run(cli) {
        Ok(status) => ExitCode::from(status.code()),
        Err(err) => {
            let _ = writeln!(io::stderr(), "error: {}", err);
            ExitCode::from(err.exit_status().code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute one run and map it to an exit status.
fn run(cli: Cli) -> Result<ExitStatus, SortError> {
    let config = cli.to_config();
    config.validate()?;
    let resolver = SectionResolver::new(&config);

    let targets = files::collect_targets(&cli.paths)?;
    tracing::info!(targets = targets.len(), "collected targets");

    let summary = files::process_files(&targets, &config, &resolver, cli.run_mode());
    output::emit(&summary, cli.format, &mut io::stdout())
        .map_err(|err| SortError::internal(format!("failed to write report: {}", err)))?;

    Ok(summary.exit_status())
}
