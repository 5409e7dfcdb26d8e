//! Run configuration for the sorting pipeline.
//!
//! A `Config` is built once per run, validated, and then shared read-only by
//! every processing unit. The CLI maps its flags onto these fields; loading
//! configuration from project files or environments is a collaborator concern
//! and stays outside this crate's core.

use std::collections::{BTreeMap, BTreeSet};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::SortError;

// ============================================================================
// Section Names
// ============================================================================

/// Built-in section name: `from __future__ import ...`.
pub const FUTURE: &str = "FUTURE";
/// Built-in section name: standard library modules.
pub const STDLIB: &str = "STDLIB";
/// Built-in section name: third-party packages (the default bucket).
pub const THIRDPARTY: &str = "THIRDPARTY";
/// Built-in section name: known project-local package roots.
pub const FIRSTPARTY: &str = "FIRSTPARTY";
/// Built-in section name: relative imports.
pub const LOCALFOLDER: &str = "LOCALFOLDER";

/// The default section order.
pub fn default_sections() -> Vec<String> {
    vec![
        FUTURE.to_string(),
        STDLIB.to_string(),
        THIRDPARTY.to_string(),
        FIRSTPARTY.to_string(),
        LOCALFOLDER.to_string(),
    ]
}

// ============================================================================
// Closed Choice Enums
// ============================================================================

/// Multi-line layout strategy applied when a statement exceeds the width
/// limit. A closed set: each variant implements the same render contract
/// (names, indent, width, trailing-comma flag -> lines).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum WrapMode {
    /// Names packed left-to-right, new row when the next name would
    /// overflow, aligned under the opening parenthesis.
    #[default]
    Grid,
    /// Exactly one name per line, aligned under the opening parenthesis.
    Vertical,
    /// Header on the first line, continuation lines at a fixed indent;
    /// parenthesized, or joined with backslashes when `use_parentheses`
    /// is off.
    HangingIndent,
    /// One name per line at a fixed indent, trailing comma after every
    /// name, closing parenthesis on its own line.
    VerticalHangingIndent,
    /// Grid packing inside parentheses opened on their own line; the
    /// closing parenthesis shares the last row.
    VerticalGrid,
    /// Like vertical-grid, but the closing parenthesis gets its own line.
    VerticalGridGrouped,
    /// Emit the single long line unchanged, annotated with a suppression
    /// marker so line-length linters ignore it.
    Noqa,
}

/// Primary comparator for ordering import groups within a section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Lexicographic by module key (case sensitivity is a separate flag).
    #[default]
    Alphabetical,
    /// By rendered single-line length, ascending.
    Length,
    /// By rendered single-line length, descending.
    LengthDescending,
    /// Numeric substrings compared as integers, text compared
    /// case-insensitively.
    Natural,
}

/// Target Python version, used to key the known-standard-library set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
pub enum PythonVersion {
    #[serde(rename = "py38")]
    #[value(name = "py38")]
    Py38,
    #[serde(rename = "py39")]
    #[value(name = "py39")]
    Py39,
    #[serde(rename = "py310")]
    #[value(name = "py310")]
    Py310,
    #[serde(rename = "py311")]
    #[value(name = "py311")]
    #[default]
    Py311,
    #[serde(rename = "py312")]
    #[value(name = "py312")]
    Py312,
    #[serde(rename = "py313")]
    #[value(name = "py313")]
    Py313,
}

// ============================================================================
// Config
// ============================================================================

/// Immutable run configuration.
///
/// Created once, validated, and shared read-only across all files processed
/// in a run. All collection fields use ordered containers so that iteration
/// order (and therefore output) is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Section order. Forced-separate groups are appended after these.
    pub sections: Vec<String>,
    /// Module path prefixes classified as FIRSTPARTY.
    pub known_first_party: BTreeSet<String>,
    /// Module path prefixes pinned to THIRDPARTY (overrides the stdlib set).
    pub known_third_party: BTreeSet<String>,
    /// Extra module names treated as standard library.
    pub extra_standard_library: BTreeSet<String>,
    /// Explicit per-module section overrides (module prefix -> section name).
    pub section_overrides: BTreeMap<String, String>,
    /// Prefix patterns carved out into their own sections, emitted after the
    /// configured sections in pattern order.
    pub forced_separate: Vec<String>,
    /// Modules pinned before the comparator-ordered remainder of a section.
    pub force_to_top: BTreeSet<String>,
    /// Python version keying the known-standard-library set.
    pub python_version: PythonVersion,
    /// Primary comparator for group order.
    pub sort_order: SortOrder,
    /// Compare module keys case-sensitively.
    pub case_sensitive: bool,
    /// Sort straight and from-imports together instead of straight-first.
    pub force_sort_within_sections: bool,
    /// Emit one imported name per from-statement.
    pub force_single_line: bool,
    /// Merge aliased names into the shared name list instead of emitting
    /// each as its own statement.
    pub combine_as: bool,
    /// Combine a section's plain (unaliased) straight imports into one
    /// `import a, b, c` statement.
    pub combine_straight_imports: bool,
    /// Wrap mode for statements exceeding `line_length`.
    pub wrap_mode: WrapMode,
    /// Maximum physical line length.
    pub line_length: usize,
    /// Indent unit for hanging layouts.
    pub indent: String,
    /// Add a trailing comma after the final name in paren layouts (the
    /// vertical-hanging-indent mode always emits one).
    pub include_trailing_comma: bool,
    /// Use parentheses for hanging-indent wrapping instead of backslashes.
    pub use_parentheses: bool,
    /// Blank lines between sections that both have at least one member.
    pub blank_lines_between_sections: usize,
    /// Permit a single blank-line-separated continuation of the import
    /// region.
    pub span_blank_lines: bool,
    /// Comment tokens excluding one statement from reordering.
    pub skip_directives: Vec<String>,
    /// Comment tokens excluding a whole file from processing.
    pub skip_file_directives: Vec<String>,
    /// Marker appended by the no-wrap suppression mode.
    pub line_suppression_marker: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sections: default_sections(),
            known_first_party: BTreeSet::new(),
            known_third_party: BTreeSet::new(),
            extra_standard_library: BTreeSet::new(),
            section_overrides: BTreeMap::new(),
            forced_separate: Vec::new(),
            force_to_top: BTreeSet::new(),
            python_version: PythonVersion::default(),
            sort_order: SortOrder::default(),
            case_sensitive: false,
            force_sort_within_sections: false,
            force_single_line: false,
            combine_as: false,
            combine_straight_imports: false,
            wrap_mode: WrapMode::default(),
            line_length: 79,
            indent: "    ".to_string(),
            include_trailing_comma: false,
            use_parentheses: true,
            blank_lines_between_sections: 1,
            span_blank_lines: false,
            skip_directives: vec!["isort:skip".to_string(), "isort: skip".to_string()],
            skip_file_directives: vec![
                "isort:skip_file".to_string(),
                "isort: skip_file".to_string(),
            ],
            line_suppression_marker: "# NOQA".to_string(),
        }
    }
}

impl Config {
    /// Validate invariants the pipeline relies on.
    pub fn validate(&self) -> Result<(), SortError> {
        if self.sections.is_empty() {
            return Err(SortError::invalid_config("sections must not be empty"));
        }
        let unique: BTreeSet<&String> = self.sections.iter().collect();
        if unique.len() != self.sections.len() {
            return Err(SortError::invalid_config("duplicate section name"));
        }
        if self.line_length == 0 {
            return Err(SortError::invalid_config("line_length must be positive"));
        }
        if self.indent.is_empty() {
            return Err(SortError::invalid_config("indent must not be empty"));
        }
        for name in self.section_overrides.values() {
            if !self.sections.iter().any(|s| s == name) {
                return Err(SortError::invalid_config(format!(
                    "section override targets unknown section '{}'",
                    name
                )));
            }
        }
        Ok(())
    }

    /// The full emission order: configured sections, then forced-separate
    /// groups in pattern order. Fixed once per run; never changes during
    /// processing.
    pub fn section_order(&self) -> Vec<String> {
        let mut order = self.sections.clone();
        for pattern in &self.forced_separate {
            if !order.iter().any(|s| s == pattern) {
                order.push(pattern.clone());
            }
        }
        order
    }

    /// True if the comment text carries a per-statement skip directive.
    pub fn is_skip_comment(&self, comment: &str) -> bool {
        // skip_file directives also contain the skip token as a substring;
        // check them first so a skip_file marker is not misread.
        if self.is_skip_file_comment(comment) {
            return false;
        }
        self.skip_directives.iter().any(|d| comment.contains(d))
    }

    /// True if the comment text carries a file-level skip directive.
    pub fn is_skip_file_comment(&self, comment: &str) -> bool {
        self.skip_file_directives.iter().any(|d| comment.contains(d))
    }
}

// ============================================================================
// Tests
// ============================================================================
