//! Per-buffer pipeline: extract, classify, order, render, splice.
//!
//! This is the seam the file runner and the tests drive: one source buffer
//! in, one sorted buffer out, no filesystem involvement. Everything outside
//! the import region is preserved byte-for-byte, including the line-ending
//! convention and the presence or absence of a final newline.

use crate::classify::SectionResolver;
use crate::config::Config;
use crate::order::arrange;
use crate::parse::{parse_block, BlockEntry, ImportStatement, ParseOutcome};
use crate::render::render_block;
use crate::error::SortError;

// ============================================================================
// Outcome
// ============================================================================

/// Result of sorting one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutcome {
    /// The full output buffer.
    pub output: String,
    /// True if `output` differs from the input.
    pub changed: bool,
    /// True if a file-level skip directive suppressed processing.
    pub skipped: bool,
}

impl SortOutcome {
    fn unchanged(source: &str, skipped: bool) -> Self {
        SortOutcome {
            output: source.to_string(),
            changed: false,
            skipped,
        }
    }
}

// ============================================================================
// Entry Point
// ============================================================================

/// Sort the import block of one source buffer.
pub fn sort_source(
    source: &str,
    config: &Config,
    resolver: &SectionResolver,
) -> Result<SortOutcome, SortError> {
    let crlf = source.contains("\r\n");
    let final_newline = source.ends_with('\n');
    let lines = split_lines(source);

    let block = match parse_block(&lines, config)? {
        ParseOutcome::NoImports => return Ok(SortOutcome::unchanged(source, false)),
        ParseOutcome::SkipFile => {
            tracing::debug!("file-level skip directive; leaving buffer untouched");
            return Ok(SortOutcome::unchanged(source, true));
        }
        ParseOutcome::Block(block) => block,
    };

    let statement_count = block.statements().count();
    let rendered = render_entries(block.entries, config, resolver);
    tracing::debug!(
        statements = statement_count,
        region_start = block.start_line + 1,
        "sorted import block"
    );

    let mut out_lines: Vec<String> = Vec::with_capacity(lines.len());
    out_lines.extend(lines[..block.start_line].iter().map(|l| l.to_string()));
    out_lines.extend(rendered);
    out_lines.extend(lines[block.end_line..].iter().map(|l| l.to_string()));

    let ending = if crlf { "\r\n" } else { "\n" };
    let mut output = out_lines.join(ending);
    if final_newline {
        output.push_str(ending);
    }

    let changed = output != source;
    Ok(SortOutcome {
        output,
        changed,
        skipped: false,
    })
}

// ============================================================================
// Internals
// ============================================================================

/// Universal-newline split; line endings are re-applied on output.
fn split_lines(source: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = source
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();
    if source.ends_with('\n') {
        lines.pop();
    }
    lines
}

/// Render the block's entries. Verbatim entries split the block into
/// independently ordered segments: a skipped statement is a fence no other
/// statement may cross.
fn render_entries(
    entries: Vec<BlockEntry>,
    config: &Config,
    resolver: &SectionResolver,
) -> Vec<String> {
    let mut out = Vec::new();
    let mut run: Vec<ImportStatement> = Vec::new();
    for entry in entries {
        match entry {
            BlockEntry::Statement(stmt) => run.push(stmt),
            BlockEntry::Verbatim(text) => {
                flush_run(&mut run, &mut out, config, resolver);
                out.extend(text.split('\n').map(String::from));
            }
        }
    }
    flush_run(&mut run, &mut out, config, resolver);
    out
}

fn flush_run(
    run: &mut Vec<ImportStatement>,
    out: &mut Vec<String>,
    config: &Config,
    resolver: &SectionResolver,
) {
    if run.is_empty() {
        return;
    }
    let classified = run
        .drain(..)
        .map(|stmt| (resolver.resolve(&stmt), stmt))
        .collect();
    let arranged = arrange(classified, config);
    out.extend(render_block(&arranged, config));
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sort(source: &str, config: &Config) -> SortOutcome {
        let resolver = SectionResolver::new(config);
        sort_source(source, config, &resolver).unwrap()
    }

    fn sort_default(source: &str) -> SortOutcome {
        sort(source, &Config::default())
    }

    mod basic {
        use super::*;

        #[test]
        fn sections_ordered_and_separated() {
            let out = sort_default("import sys\nimport requests\nimport os\n\nprint(1)\n");
            assert_eq!(
                out.output,
                "import os\nimport sys\n\nimport requests\n\nprint(1)\n"
            );
            assert!(out.changed);
        }

        #[test]
        fn sorted_input_reports_unchanged() {
            let source = "import os\nimport sys\n";
            let out = sort_default(source);
            assert_eq!(out.output, source);
            assert!(!out.changed);
        }

        #[test]
        fn idempotent_on_its_own_output() {
            let first = sort_default("import sys\nfrom os import path, sep\nimport os\n");
            let second = sort_default(&first.output);
            assert_eq!(first.output, second.output);
            assert!(!second.changed);
        }

        #[test]
        fn code_before_and_after_preserved() {
            let source = "#!/usr/bin/env python\n\"\"\"Doc.\"\"\"\nimport sys\nimport os\n\n\ndef main():\n    pass\n";
            let out = sort_default(source);
            assert_eq!(
                out.output,
                "#!/usr/bin/env python\n\"\"\"Doc.\"\"\"\nimport os\nimport sys\n\n\ndef main():\n    pass\n"
            );
        }

        #[test]
        fn buffer_without_imports_untouched() {
            let source = "x = 1\nimport os\n";
            let out = sort_default(source);
            assert_eq!(out.output, source);
            assert!(!out.changed);
            assert!(!out.skipped);
        }
    }

    mod skip_directives {
        use super::*;

        #[test]
        fn file_level_skip_suppresses_everything() {
            let source = "# isort:skip_file\nimport sys\nimport os\n";
            let out = sort_default(source);
            assert_eq!(out.output, source);
            assert!(out.skipped);
            assert!(!out.changed);
        }

        #[test]
        fn skipped_statement_fences_the_block() {
            let source = "import z\nimport a  # isort:skip\nimport y\nimport b\n";
            let out = sort_default(source);
            assert_eq!(
                out.output,
                "import z\nimport a  # isort:skip\nimport b\nimport y\n"
            );
        }
    }

    mod preservation {
        use super::*;

        #[test]
        fn crlf_endings_survive() {
            let out = sort_default("import sys\r\nimport os\r\n");
            assert_eq!(out.output, "import os\r\nimport sys\r\n");
        }

        #[test]
        fn missing_final_newline_survives() {
            let out = sort_default("import sys\nimport os");
            assert_eq!(out.output, "import os\nimport sys");
        }

        #[test]
        fn comments_travel_with_their_statement() {
            let source = "# system bits\nimport sys\nimport os\n";
            let out = sort_default(source);
            assert_eq!(out.output, "import os\n# system bits\nimport sys\n");
        }
    }

    mod multiline_input {
        use super::*;

        #[test]
        fn parenthesized_import_reflows() {
            let source = "from os.path import (join,\n    dirname)\nimport sys\n";
            let out = sort_default(source);
            assert_eq!(out.output, "import sys\nfrom os.path import dirname, join\n");
        }

        #[test]
        fn overlong_result_wraps_per_config() {
            let config = Config {
                line_length: 30,
                ..Config::default()
            };
            let source = "from mypackage import delta, alpha, charlie, bravo\n";
            let out = sort(source, &config);
            assert_eq!(
                out.output,
                "from mypackage import (alpha,\n                       bravo,\n                       charlie,\n                       delta)\n"
            );
        }
    }

    mod merging_and_duplicates {
        use super::*;

        #[test]
        fn same_module_from_imports_merge() {
            let out = sort_default("from os import sep\nfrom os import path\n");
            assert_eq!(out.output, "from os import path, sep\n");
        }

        #[test]
        fn exact_duplicates_collapse() {
            let out = sort_default("import os\nimport os\n");
            assert_eq!(out.output, "import os\n");
        }
    }
}
