//! Rendering: ordered sections back into physical source lines.
//!
//! The renderer is the only place that decides between the single-line and
//! wrapped forms: a statement whose full line (trailing comment included)
//! fits the width limit is emitted as one line, anything longer is handed to
//! the configured layout in [`crate::wrap`].

use crate::config::Config;
use crate::order::SectionedImports;
use crate::parse::{ImportKind, ImportStatement};
use crate::wrap::{self, WrapInput};

// ============================================================================
// Single-Line Forms
// ============================================================================

/// The canonical single-line rendering, trailing comment excluded.
///
/// This is also the length-sort key, so it must be deterministic for every
/// statement shape.
pub fn single_line(stmt: &ImportStatement) -> String {
    match stmt.kind {
        ImportKind::Straight => match &stmt.alias {
            Some(alias) => format!("import {} as {}", stmt.module_path, alias),
            None => format!("import {}", stmt.module_path),
        },
        ImportKind::From => {
            let names = if stmt.is_star {
                "*".to_string()
            } else {
                stmt.names
                    .iter()
                    .map(|n| n.render())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            format!("{}{}", from_header(stmt), names)
        }
    }
}

/// `"from {dots}{module} import "`.
fn from_header(stmt: &ImportStatement) -> String {
    format!(
        "from {}{} import ",
        ".".repeat(stmt.relative_level),
        stmt.module_path
    )
}

fn with_comment(code: &str, comment: Option<&str>) -> String {
    match comment {
        Some(comment) => format!("{}  {}", code, comment),
        None => code.to_string(),
    }
}

// ============================================================================
// Statement Rendering
// ============================================================================

/// Render one statement: leading comment lines, then the statement itself in
/// single-line or wrapped form.
fn statement_lines(stmt: &ImportStatement, config: &Config) -> Vec<String> {
    let mut lines = stmt.leading_comments.clone();

    let code = single_line(stmt);
    let full = with_comment(&code, stmt.trailing_comment.as_deref());
    if full.chars().count() <= config.line_length {
        lines.push(full);
        return lines;
    }

    let wrappable = stmt.kind == ImportKind::From && !stmt.is_star;
    let header = from_header(stmt);
    let input = WrapInput {
        header: &header,
        names: if wrappable {
            stmt.names.iter().map(|n| n.render()).collect()
        } else {
            Vec::new()
        },
        trailing_comment: stmt.trailing_comment.as_deref(),
        single_line: &full,
    };
    lines.extend(wrap::wrap(&input, config));
    lines
}

// ============================================================================
// Section and Block Rendering
// ============================================================================

/// Render one section's statements, applying straight-import combining.
fn section_lines(stmts: &[ImportStatement], config: &Config) -> Vec<String> {
    if !config.combine_straight_imports {
        return stmts
            .iter()
            .flat_map(|stmt| statement_lines(stmt, config))
            .collect();
    }

    // Plain (unaliased) straight imports collapse into one statement at the
    // position of the first; aliased straights and from-imports keep their
    // own lines.
    let plains: Vec<&ImportStatement> = stmts
        .iter()
        .filter(|s| s.kind == ImportKind::Straight && s.alias.is_none())
        .collect();
    if plains.len() < 2 {
        return stmts
            .iter()
            .flat_map(|stmt| statement_lines(stmt, config))
            .collect();
    }

    let mut lines = Vec::new();
    let mut combined_emitted = false;
    for stmt in stmts {
        if stmt.kind == ImportKind::Straight && stmt.alias.is_none() {
            if !combined_emitted {
                lines.extend(combined_straight_lines(&plains, config));
                combined_emitted = true;
            }
            continue;
        }
        lines.extend(statement_lines(stmt, config));
    }
    lines
}

fn combined_straight_lines(plains: &[&ImportStatement], config: &Config) -> Vec<String> {
    let mut lines = Vec::new();
    for stmt in plains {
        lines.extend(stmt.leading_comments.iter().cloned());
    }

    let code = format!(
        "import {}",
        plains
            .iter()
            .map(|s| s.module_path.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    let comment = plains
        .iter()
        .filter_map(|s| s.trailing_comment.as_deref())
        .fold(None::<String>, |acc, next| match acc {
            Some(joined) => Some(format!(
                "{}; {}",
                joined,
                next.trim_start_matches('#').trim_start()
            )),
            None => Some(next.to_string()),
        });

    let full = with_comment(&code, comment.as_deref());
    if full.chars().count() <= config.line_length {
        lines.push(full);
    } else {
        // Not parenthesizable; the layout passes it through (or adds the
        // suppression marker).
        let input = WrapInput {
            header: "",
            names: Vec::new(),
            trailing_comment: comment.as_deref(),
            single_line: &full,
        };
        lines.extend(wrap::wrap(&input, config));
    }
    lines
}

/// Render the whole arranged block: sections in order, separated by the
/// configured number of blank lines.
pub fn render_block(sectioned: &SectionedImports, config: &Config) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, (_, stmts)) in sectioned.sections.iter().enumerate() {
        if i > 0 {
            for _ in 0..config.blank_lines_between_sections {
                lines.push(String::new());
            }
        }
        lines.extend(section_lines(stmts, config));
    }
    lines
}

// ============================================================================
// Tests
// ============================================================================
