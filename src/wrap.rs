//! Multi-line layout strategies for overlong statements.
//!
//! Each `WrapMode` maps the same inputs (header, rendered name units, width,
//! indent, trailing-comma flag) to a sequence of physical lines. The caller
//! decides *whether* to wrap; this module only decides *how*. Layouts aim for
//! the width limit but never drop content to meet it: a single name longer
//! than the limit still gets emitted on its own overlong line.
//!
//! Comment placement is fixed per layout family: parenthesized layouts carry
//! the statement's trailing comment on the first physical line (inside the
//! parentheses is legal), the backslash layout carries it on the last line
//! (a comment may not follow a line continuation).

use crate::config::{Config, WrapMode};

// ============================================================================
// Input
// ============================================================================

/// Everything a layout needs, pre-rendered by the caller.
#[derive(Debug)]
pub struct WrapInput<'a> {
    /// Statement text up to the name list, including the trailing space
    /// (`"from os.path import "`).
    pub header: &'a str,
    /// Rendered name units (`"join"`, `"dirname as dn"`), already ordered.
    pub names: Vec<String>,
    /// Trailing comment, `#` prefix included.
    pub trailing_comment: Option<&'a str>,
    /// The full single-line rendering, used by the no-wrap layout.
    pub single_line: &'a str,
}

// ============================================================================
// Dispatch
// ============================================================================

/// Lay out one overlong statement per the configured mode.
///
/// Statements with no name list (straight imports, star imports) cannot be
/// parenthesized; they pass through unchanged except under the suppression
/// layout.
pub fn wrap(input: &WrapInput<'_>, config: &Config) -> Vec<String> {
    if config.wrap_mode == WrapMode::Noqa {
        return vec![suppressed_line(input, config)];
    }
    if input.names.is_empty() {
        return vec![input.single_line.to_string()];
    }
    match config.wrap_mode {
        WrapMode::Grid => grid(input, config),
        WrapMode::Vertical => vertical(input, config),
        WrapMode::HangingIndent => hanging_indent(input, config),
        WrapMode::VerticalHangingIndent => vertical_hanging_indent(input, config),
        WrapMode::VerticalGrid => vertical_grid(input, config, false),
        WrapMode::VerticalGridGrouped => vertical_grid(input, config, true),
        WrapMode::Noqa => unreachable!("handled above"),
    }
}

// ============================================================================
// Layouts
// ============================================================================

/// Names packed left-to-right inside parentheses opened on the first line,
/// continuation rows aligned under the opening parenthesis.
fn grid(input: &WrapInput<'_>, config: &Config) -> Vec<String> {
    let open = format!("{}(", input.header);
    let continuation = " ".repeat(display_width(&open));
    let units = comma_units(&input.names, closer(config));
    let mut lines = fill(&units, open, &continuation, config.line_length);
    attach_comment(&mut lines, input.trailing_comment, CommentLine::First);
    lines
}

/// Exactly one name per line, aligned under the opening parenthesis.
fn vertical(input: &WrapInput<'_>, config: &Config) -> Vec<String> {
    let open = format!("{}(", input.header);
    let continuation = " ".repeat(display_width(&open));
    let units = comma_units(&input.names, closer(config));

    let mut lines = Vec::with_capacity(units.len());
    for (i, unit) in units.iter().enumerate() {
        if i == 0 {
            lines.push(format!("{}{}", open, unit));
        } else {
            lines.push(format!("{}{}", continuation, unit));
        }
    }
    attach_comment(&mut lines, input.trailing_comment, CommentLine::First);
    lines
}

/// Header plus packed names at a fixed one-indent continuation. With
/// `use_parentheses` the rows sit inside parentheses opened on the first
/// line; without it they are joined with backslash continuations.
fn hanging_indent(input: &WrapInput<'_>, config: &Config) -> Vec<String> {
    if config.use_parentheses {
        let open = format!("{}(", input.header);
        let units = comma_units(&input.names, closer(config));
        let mut lines = fill(&units, open, &config.indent, config.line_length);
        attach_comment(&mut lines, input.trailing_comment, CommentLine::First);
        return lines;
    }
    let units = comma_units(&input.names, "");
    // Reserve room for the " \" continuation suffix.
    let width = config.line_length.saturating_sub(2);
    let mut lines = fill(&units, input.header.to_string(), &config.indent, width);
    let last = lines.len() - 1;
    for line in &mut lines[..last] {
        line.push_str(" \\");
    }
    attach_comment(&mut lines, input.trailing_comment, CommentLine::Last);
    lines
}

/// Parenthesis opened on its own line, one name per line at a fixed indent,
/// a trailing comma after every name, closing parenthesis alone. The
/// trailing comma here is unconditional: it is what keeps this layout stable
/// when names are added or removed.
fn vertical_hanging_indent(input: &WrapInput<'_>, config: &Config) -> Vec<String> {
    let mut lines = vec![format!("{}(", input.header)];
    for name in &input.names {
        lines.push(format!("{}{},", config.indent, name));
    }
    lines.push(")".to_string());
    attach_comment(&mut lines, input.trailing_comment, CommentLine::First);
    lines
}

/// Parenthesis opened on its own line, names grid-packed at a fixed indent.
/// `grouped` gives the closing parenthesis its own line instead of sharing
/// the last row.
fn vertical_grid(input: &WrapInput<'_>, config: &Config, grouped: bool) -> Vec<String> {
    let last_suffix = if grouped {
        if config.include_trailing_comma {
            ","
        } else {
            ""
        }
    } else {
        closer(config)
    };
    let units = comma_units(&input.names, last_suffix);

    let mut lines = vec![format!("{}(", input.header)];
    lines.extend(fill(
        &units,
        config.indent.clone(),
        &config.indent,
        config.line_length,
    ));
    if grouped {
        lines.push(")".to_string());
    }
    attach_comment(&mut lines, input.trailing_comment, CommentLine::First);
    lines
}

/// Emit the single line unchanged, annotated with the suppression marker
/// unless one is already present.
fn suppressed_line(input: &WrapInput<'_>, config: &Config) -> String {
    let line = input.single_line;
    if line.contains(&config.line_suppression_marker) {
        line.to_string()
    } else {
        format!("{}  {}", line, config.line_suppression_marker)
    }
}

// ============================================================================
// Shared Machinery
// ============================================================================

/// What closes the name list in paren layouts that share the last row.
fn closer(config: &Config) -> &'static str {
    if config.include_trailing_comma {
        ",)"
    } else {
        ")"
    }
}

/// Name units with separator commas baked in; the last unit gets `suffix`.
fn comma_units(names: &[String], suffix: &str) -> Vec<String> {
    let last = names.len() - 1;
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if i == last {
                format!("{}{}", name, suffix)
            } else {
                format!("{},", name)
            }
        })
        .collect()
}

/// Greedy row packing: units flow left-to-right separated by single spaces,
/// starting a new row at `continuation` when the next unit would exceed
/// `width`. A unit too long for an empty row is emitted anyway.
fn fill(units: &[String], first: String, continuation: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = first;
    let mut row_empty = true;
    for unit in units {
        let needed = display_width(unit) + if row_empty { 0 } else { 1 };
        if !row_empty && display_width(&current) + needed > width {
            lines.push(std::mem::replace(&mut current, continuation.to_string()));
            row_empty = true;
        }
        if !row_empty {
            current.push(' ');
        }
        current.push_str(unit);
        row_empty = false;
    }
    lines.push(current);
    lines
}

enum CommentLine {
    First,
    Last,
}

fn attach_comment(lines: &mut [String], comment: Option<&str>, placement: CommentLine) {
    let Some(comment) = comment else { return };
    let index = match placement {
        CommentLine::First => 0,
        CommentLine::Last => lines.len() - 1,
    };
    lines[index].push_str("  ");
    lines[index].push_str(comment);
}

/// Width in characters, not bytes. Identifiers are rarely non-ASCII but the
/// limit is a column count.
fn display_width(text: &str) -> usize {
    text.chars().count()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(header: &'a str, names: &[&str], single: &'a str) -> WrapInput<'a> {
        WrapInput {
            header,
            names: names.iter().map(|n| n.to_string()).collect(),
            trailing_comment: None,
            single_line: single,
        }
    }

    fn libs() -> Vec<&'static str> {
        vec!["lib1", "lib2", "lib3", "lib4", "lib5", "lib6"]
    }

    fn config(mode: WrapMode, width: usize) -> Config {
        Config {
            wrap_mode: mode,
            line_length: width,
            ..Config::default()
        }
    }

    mod grid {
        use super::*;

        #[test]
        fn packs_rows_aligned_under_the_paren() {
            let config = config(WrapMode::Grid, 50);
            let out = wrap(&input("from third_party import ", &libs(), ""), &config);
            assert_eq!(
                out,
                vec![
                    "from third_party import (lib1, lib2, lib3, lib4,",
                    "                         lib5, lib6)",
                ]
            );
        }

        #[test]
        fn trailing_comma_precedes_the_closer() {
            let mut config = config(WrapMode::Grid, 100);
            config.include_trailing_comma = true;
            let out = wrap(&input("from m import ", &["a", "b"], ""), &config);
            assert_eq!(out, vec!["from m import (a, b,)"]);
        }

        #[test]
        fn single_overlong_name_still_emits() {
            let config = config(WrapMode::Grid, 10);
            let out = wrap(
                &input("from m import ", &["extraordinarily_long_name"], ""),
                &config,
            );
            assert_eq!(out, vec!["from m import (extraordinarily_long_name)"]);
        }
    }

    mod vertical {
        use super::*;

        #[test]
        fn one_name_per_aligned_line() {
            let config = config(WrapMode::Vertical, 79);
            let out = wrap(&input("from third_party import ", &["lib1", "lib2", "lib3"], ""), &config);
            assert_eq!(
                out,
                vec![
                    "from third_party import (lib1,",
                    "                         lib2,",
                    "                         lib3)",
                ]
            );
        }
    }

    mod hanging_indent {
        use super::*;

        #[test]
        fn parenthesized_rows_at_fixed_indent() {
            let config = config(WrapMode::HangingIndent, 40);
            let out = wrap(&input("from third_party import ", &libs(), ""), &config);
            assert_eq!(
                out,
                vec![
                    "from third_party import (lib1, lib2,",
                    "    lib3, lib4, lib5, lib6)",
                ]
            );
        }

        #[test]
        fn parenthesized_comment_lands_on_the_first_line() {
            let config = config(WrapMode::HangingIndent, 40);
            let mut req = input("from third_party import ", &libs(), "");
            req.trailing_comment = Some("# note");
            let out = wrap(&req, &config);
            assert!(out[0].ends_with("# note"));
        }

        #[test]
        fn backslash_continuations_without_parentheses() {
            let mut config = config(WrapMode::HangingIndent, 40);
            config.use_parentheses = false;
            let out = wrap(&input("from third_party import ", &libs(), ""), &config);
            assert_eq!(
                out,
                vec![
                    "from third_party import lib1, lib2, \\",
                    "    lib3, lib4, lib5, lib6",
                ]
            );
        }

        #[test]
        fn backslash_comment_lands_on_the_final_line() {
            let mut config = config(WrapMode::HangingIndent, 40);
            config.use_parentheses = false;
            let mut req = input("from third_party import ", &libs(), "");
            req.trailing_comment = Some("# note");
            let out = wrap(&req, &config);
            assert!(out[0].ends_with('\\'));
            assert!(out.last().unwrap().ends_with("# note"));
        }
    }

    mod vertical_hanging_indent {
        use super::*;

        #[test]
        fn one_name_per_line_with_unconditional_trailing_comma() {
            let config = config(WrapMode::VerticalHangingIndent, 79);
            let out = wrap(&input("from m import ", &["alpha", "beta"], ""), &config);
            assert_eq!(out, vec!["from m import (", "    alpha,", "    beta,", ")"]);
        }

        #[test]
        fn comment_follows_the_open_paren() {
            let config = config(WrapMode::VerticalHangingIndent, 79);
            let mut req = input("from m import ", &["alpha"], "");
            req.trailing_comment = Some("# why");
            let out = wrap(&req, &config);
            assert_eq!(out[0], "from m import (  # why");
        }
    }

    mod vertical_grid {
        use super::*;

        #[test]
        fn packs_below_an_own_line_paren() {
            let config = config(WrapMode::VerticalGrid, 30);
            let out = wrap(&input("from third_party import ", &libs(), ""), &config);
            assert_eq!(
                out,
                vec![
                    "from third_party import (",
                    "    lib1, lib2, lib3, lib4,",
                    "    lib5, lib6)",
                ]
            );
        }

        #[test]
        fn grouped_closer_gets_its_own_line() {
            let config = config(WrapMode::VerticalGridGrouped, 30);
            let out = wrap(&input("from third_party import ", &libs(), ""), &config);
            assert_eq!(
                out,
                vec![
                    "from third_party import (",
                    "    lib1, lib2, lib3, lib4,",
                    "    lib5, lib6",
                    ")",
                ]
            );
        }
    }

    mod suppression {
        use super::*;

        #[test]
        fn marker_appended_to_the_unchanged_line() {
            let config = config(WrapMode::Noqa, 20);
            let single = "from m import a, b, c, d, e";
            let out = wrap(&input("from m import ", &["a"], single), &config);
            assert_eq!(out, vec!["from m import a, b, c, d, e  # NOQA"]);
        }

        #[test]
        fn existing_marker_is_not_duplicated() {
            let config = config(WrapMode::Noqa, 20);
            let single = "from m import a  # NOQA";
            let out = wrap(&input("from m import ", &["a"], single), &config);
            assert_eq!(out, vec!["from m import a  # NOQA"]);
        }

        #[test]
        fn straight_imports_get_the_marker_too() {
            let config = config(WrapMode::Noqa, 10);
            let single = "import very.long.module.path";
            let out = wrap(&input("", &[], single), &config);
            assert_eq!(out, vec!["import very.long.module.path  # NOQA"]);
        }
    }

    mod nameless_statements {
        use super::*;

        #[test]
        fn pass_through_under_paren_layouts() {
            let config = config(WrapMode::Grid, 10);
            let out = wrap(&input("", &[], "import a.b.c.d.e.f"), &config);
            assert_eq!(out, vec!["import a.b.c.d.e.f"]);
        }
    }
}
