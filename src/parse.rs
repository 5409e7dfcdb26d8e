//! Statement parser: extracts the contiguous import block from a buffer.
//!
//! The parser works in two layers:
//!
//! 1. **Region scanning** walks physical lines, finds where the import block
//!    begins and ends, joins logically-continued statements (parentheses or
//!    trailing backslash), and attaches comments.
//! 2. **Statement parsing** runs a winnow grammar over each joined logical
//!    line to produce [`ImportStatement`] records.
//!
//! ## Grammar
//!
//! ```text
//! <statement> := "import" <module> ["as" <ident>] ("," <module> ["as" <ident>])*
//!              | "from" <dots>? <module>? "import" ("*" | "(" <names> ","? ")" | <names>)
//! <names>     := <ident> ["as" <ident>] ("," <ident> ["as" <ident>])*
//! <module>    := <ident> ("." <ident>)*
//! ```
//!
//! Everything outside the import region is preserved byte-for-byte by the
//! caller; a parse failure leaves the whole buffer untouched.

use winnow::ascii::{multispace0, multispace1};
use winnow::combinator::{alt, delimited, opt, preceded, separated};
use winnow::error::{ErrMode, ParserError};
use winnow::prelude::*;
use winnow::token::take_while;
use winnow::ModalResult;

use crate::config::Config;
use crate::error::SortError;

// ============================================================================
// Data Model
// ============================================================================

/// A name imported via `from ... import`, with optional alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedName {
    /// The imported name (`*` for star imports).
    pub name: String,
    /// Optional alias (`as ...`).
    pub alias: Option<String>,
}

impl ImportedName {
    /// Create a new imported name without an alias.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    /// Create a new imported name with an alias.
    pub fn with_alias(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    /// Render this name as it appears in source (`name` or `name as alias`).
    pub fn render(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} as {}", self.name, alias),
            None => self.name.clone(),
        }
    }
}

/// Statement shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import module [as alias]`
    Straight,
    /// `from module import name, ...`
    From,
}

/// One logical import statement.
///
/// Invariants: `names` is empty iff this is a straight import; `is_star`
/// implies exactly one synthetic name `*` and disables name-level sorting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    /// Statement shape.
    pub kind: ImportKind,
    /// Dotted module path; empty for `from . import x`.
    pub module_path: String,
    /// Count of leading dots; 0 for absolute imports.
    pub relative_level: usize,
    /// Alias for straight imports (`import numpy as np`).
    pub alias: Option<String>,
    /// Names imported from the module; empty for straight imports.
    pub names: Vec<ImportedName>,
    /// True for `from module import *`.
    pub is_star: bool,
    /// Raw comment lines attached above the statement, in source order.
    pub leading_comments: Vec<String>,
    /// Comment on the statement's final physical line, if any.
    pub trailing_comment: Option<String>,
    /// First-appearance index within the block; the deterministic tie-break.
    pub first_seen: usize,
}

impl ImportStatement {
    /// The top-level component of the module path (`os.path` -> `os`).
    pub fn top_level(&self) -> &str {
        match self.module_path.find('.') {
            Some(dot) => &self.module_path[..dot],
            None => &self.module_path,
        }
    }

    /// True for relative imports (`from . import x`, `from ..pkg import y`).
    pub fn is_relative(&self) -> bool {
        self.relative_level > 0
    }

    /// The module path with leading dots restored, used as a sort key.
    pub fn dotted_path(&self) -> String {
        let mut path = ".".repeat(self.relative_level);
        path.push_str(&self.module_path);
        path
    }
}

/// One entry of the extracted block: a parsed statement, or text excluded
/// from reordering that must be re-emitted verbatim in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockEntry {
    /// A statement participating in classification and ordering.
    Statement(ImportStatement),
    /// Raw physical lines of a skip-directive statement (joined with `\n`,
    /// no trailing newline).
    Verbatim(String),
}

/// The full import block extracted from one contiguous region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBlock {
    /// Entries in source order.
    pub entries: Vec<BlockEntry>,
    /// First line of the region (0-indexed, inclusive).
    pub start_line: usize,
    /// One past the last line of the region (exclusive).
    pub end_line: usize,
}

impl ImportBlock {
    /// All parsed statements, ignoring verbatim entries.
    pub fn statements(&self) -> impl Iterator<Item = &ImportStatement> {
        self.entries.iter().filter_map(|entry| match entry {
            BlockEntry::Statement(stmt) => Some(stmt),
            BlockEntry::Verbatim(_) => None,
        })
    }
}

/// Result of scanning a buffer for an import block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// No import block exists; the buffer is a valid no-op.
    NoImports,
    /// A file-level skip directive was found; nothing to do.
    SkipFile,
    /// An import block was extracted.
    Block(ImportBlock),
}

// ============================================================================
// Region Scanning
// ============================================================================

/// Scan `lines` for the contiguous import region and parse it.
pub fn parse_block(lines: &[&str], config: &Config) -> Result<ParseOutcome, SortError> {
    let mut scanner = Scanner {
        lines,
        config,
        index: 0,
    };
    scanner.run()
}

struct Scanner<'a> {
    lines: &'a [&'a str],
    config: &'a Config,
    index: usize,
}

impl<'a> Scanner<'a> {
    fn run(&mut self) -> Result<ParseOutcome, SortError> {
        match self.scan_prelude()? {
            PreludeResult::SkipFile => Ok(ParseOutcome::SkipFile),
            PreludeResult::NoImports => Ok(ParseOutcome::NoImports),
            PreludeResult::ImportAt(first_import) => self.scan_region(first_import),
        }
    }

    /// Walk past the shebang, encoding comment, module docstring, blank
    /// lines, and leading comments, looking for the first import statement.
    fn scan_prelude(&mut self) -> Result<PreludeResult, SortError> {
        let mut seen_docstring = false;
        while self.index < self.lines.len() {
            let trimmed = self.lines[self.index].trim();
            if trimmed.is_empty() {
                self.index += 1;
            } else if let Some(comment) = trimmed.strip_prefix('#') {
                if self.config.is_skip_file_comment(comment) {
                    return Ok(PreludeResult::SkipFile);
                }
                self.index += 1;
            } else if !seen_docstring && is_string_start(trimmed) {
                let end = self.consume_string(self.index)?;
                let text: String = self.lines[self.index..end].join("\n");
                if self.config.skip_file_directives.iter().any(|d| text.contains(d)) {
                    return Ok(PreludeResult::SkipFile);
                }
                seen_docstring = true;
                self.index = end;
            } else if is_import_start(trimmed) {
                return Ok(PreludeResult::ImportAt(self.index));
            } else {
                return Ok(PreludeResult::NoImports);
            }
        }
        Ok(PreludeResult::NoImports)
    }

    /// Scan the import region starting at the statement on `first_import`.
    fn scan_region(&mut self, first_import: usize) -> Result<ParseOutcome, SortError> {
        // Comments directly above the first import (no blank line between)
        // belong to the block. The shebang and encoding declaration stay put.
        let mut start = first_import;
        while start > 0 {
            let prev = self.lines[start - 1].trim();
            if !prev.starts_with('#') || is_header_comment(start - 1, prev) {
                break;
            }
            start -= 1;
        }

        let mut entries: Vec<BlockEntry> = Vec::new();
        let mut pending_comments: Vec<String> = Vec::new();
        for line in &self.lines[start..first_import] {
            pending_comments.push(line.trim().to_string());
        }

        let mut index = first_import;
        let mut end = first_import;
        let mut stmt_index = 0usize;
        let mut bridged_blank = false;

        while index < self.lines.len() {
            let trimmed = self.lines[index].trim();

            if trimmed.is_empty() {
                if self.config.span_blank_lines && !bridged_blank {
                    // Permit a single blank-line-separated continuation when
                    // the next non-blank line resumes the import region.
                    let mut peek = index;
                    while peek < self.lines.len() && self.lines[peek].trim().is_empty() {
                        peek += 1;
                    }
                    if peek < self.lines.len() && is_import_start(self.lines[peek].trim()) {
                        bridged_blank = true;
                        index = peek;
                        continue;
                    }
                }
                break;
            }

            if trimmed.starts_with('#') {
                pending_comments.push(trimmed.to_string());
                index += 1;
                continue;
            }

            if !is_import_start(trimmed) {
                break;
            }

            let next = self.collect_logical(index)?;
            let physical = &self.lines[index..next];
            let (code, inline_comments, trailing) = strip_comments(physical);

            let statement_comments: Vec<&String> =
                inline_comments.iter().chain(trailing.iter()).collect();
            let skipped = statement_comments
                .iter()
                .any(|c| self.config.is_skip_comment(c));

            if skipped {
                let mut raw: Vec<&str> = Vec::new();
                // Leading comments travel with the skipped statement.
                let pending: Vec<String> = std::mem::take(&mut pending_comments);
                let mut text = pending.join("\n");
                raw.extend(physical.iter().copied());
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&raw.join("\n"));
                entries.push(BlockEntry::Verbatim(text));
            } else {
                let mut parsed = parse_statement_text(&code, index + 1)?;
                let mut leading = std::mem::take(&mut pending_comments);
                leading.extend(inline_comments.iter().map(|c| format!("# {}", c.trim())));
                if let Some(first) = parsed.first_mut() {
                    first.leading_comments = leading;
                    first.trailing_comment = trailing.clone();
                }
                for stmt in &mut parsed {
                    stmt.first_seen = stmt_index;
                    stmt_index += 1;
                }
                entries.extend(parsed.into_iter().map(BlockEntry::Statement));
            }

            index = next;
            end = next;
        }

        // Comments pending at the break stay with the code that follows the
        // region; `end` never advanced past them.
        Ok(ParseOutcome::Block(ImportBlock {
            entries,
            start_line: start,
            end_line: end,
        }))
    }

    /// Collect the physical lines of one logical statement starting at
    /// `index`, tracking parenthesis depth and backslash continuation.
    /// Returns the index one past the statement's last line.
    fn collect_logical(&self, index: usize) -> Result<usize, SortError> {
        let mut depth: i32 = 0;
        let mut j = index;
        loop {
            if j >= self.lines.len() {
                return if depth > 0 {
                    Err(SortError::parse(index + 1, "unbalanced parenthesis in import"))
                } else {
                    Err(SortError::parse(index + 1, "unterminated line continuation"))
                };
            }
            let line = self.lines[j];
            let code = code_portion(line);
            for ch in code.chars() {
                match ch {
                    '(' => depth += 1,
                    ')' => depth -= 1,
                    _ => {}
                }
                if depth < 0 {
                    return Err(SortError::parse(
                        j + 1,
                        "unbalanced ')' in import statement",
                    ));
                }
            }
            let continued = depth == 0 && code.trim_end().ends_with('\\');
            j += 1;
            if depth == 0 && !continued {
                return Ok(j);
            }
        }
    }

    /// Consume a (possibly triple-quoted, possibly multi-line) string
    /// expression starting at `index`; returns the index one past its end.
    fn consume_string(&self, index: usize) -> Result<usize, SortError> {
        let trimmed = self.lines[index].trim();
        let body = trimmed.trim_start_matches(|c: char| "rbfuRBFU".contains(c));
        let delim = if body.starts_with("\"\"\"") {
            "\"\"\""
        } else if body.starts_with("'''") {
            "'''"
        } else if body.starts_with('"') {
            "\""
        } else {
            "'"
        };
        let after_open = &body[delim.len()..];
        if after_open.contains(delim) {
            return Ok(index + 1);
        }
        if delim.len() == 1 {
            // A single-quoted string must close on its own line.
            return Err(SortError::parse(index + 1, "unterminated string literal"));
        }
        for (offset, line) in self.lines[index + 1..].iter().enumerate() {
            if line.contains(delim) {
                return Ok(index + 1 + offset + 1);
            }
        }
        Err(SortError::parse(index + 1, "unterminated docstring"))
    }
}

enum PreludeResult {
    SkipFile,
    NoImports,
    ImportAt(usize),
}

/// True if the trimmed line begins an import statement.
fn is_import_start(trimmed: &str) -> bool {
    for keyword in ["import", "from"] {
        if let Some(rest) = trimmed.strip_prefix(keyword) {
            if rest.starts_with(|c: char| c.is_whitespace()) {
                return true;
            }
        }
    }
    false
}

/// True if this comment is a file header (shebang or encoding declaration)
/// that must stay at the top of the file.
fn is_header_comment(line_index: usize, trimmed: &str) -> bool {
    line_index <= 1 && (trimmed.starts_with("#!") || trimmed.contains("coding"))
}

/// True if the trimmed line starts a string literal expression.
fn is_string_start(trimmed: &str) -> bool {
    let body = trimmed.trim_start_matches(|c: char| "rbfuRBFU".contains(c));
    body.starts_with('"') || body.starts_with('\'')
}

/// The portion of a physical line before any comment.
fn code_portion(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Split a statement's physical lines into joined code text, inline comments
/// from continuation lines, and the statement's trailing comment.
///
/// The trailing comment sits on the final physical line or, for a wrapped
/// statement, on the first (parenthesized layouts place it after the open
/// paren). Recognizing both keeps rendering and re-parsing a closed loop.
fn strip_comments(physical: &[&str]) -> (String, Vec<String>, Option<String>) {
    let mut code = String::new();
    let mut comments: Vec<(usize, String)> = Vec::new();
    let last = physical.len() - 1;
    for (i, line) in physical.iter().enumerate() {
        let comment = line.find('#').map(|pos| line[pos + 1..].trim().to_string());
        let mut part = code_portion(line).trim().to_string();
        if let Some(stripped) = part.strip_suffix('\\') {
            part = stripped.trim_end().to_string();
        }
        if !code.is_empty() && !part.is_empty() {
            code.push(' ');
        }
        code.push_str(&part);
        if let Some(text) = comment {
            comments.push((i, text));
        }
    }

    let trailing_at = if comments.iter().any(|(i, _)| *i == last) {
        Some(last)
    } else if last > 0 && comments.iter().any(|(i, _)| *i == 0) {
        Some(0)
    } else {
        None
    };
    let mut inline: Vec<String> = Vec::new();
    let mut trailing: Option<String> = None;
    for (i, text) in comments {
        if Some(i) == trailing_at {
            trailing = Some(format!("# {}", text));
        } else {
            inline.push(text);
        }
    }
    (code, inline, trailing)
}

// ============================================================================
// Statement Grammar (winnow)
// ============================================================================

/// Parse one logical statement's code text. Straight imports naming several
/// modules split into one statement per module.
pub fn parse_statement_text(text: &str, line: usize) -> Result<Vec<ImportStatement>, SortError> {
    statement
        .parse(text.trim())
        .map_err(|e| SortError::parse(line, format!("malformed import: {}", e)))
}

fn statement(input: &mut &str) -> ModalResult<Vec<ImportStatement>> {
    alt((from_import, straight_import)).parse_next(input)
}

fn straight_import(input: &mut &str) -> ModalResult<Vec<ImportStatement>> {
    preceded((keyword("import"), multispace1), module_as_list).parse_next(input)
}

fn module_as_list(input: &mut &str) -> ModalResult<Vec<ImportStatement>> {
    let modules: Vec<(String, Option<String>)> =
        separated(1.., module_as, (multispace0, ',', multispace0)).parse_next(input)?;
    let _ = multispace0.parse_next(input)?;
    Ok(modules
        .into_iter()
        .map(|(module_path, alias)| ImportStatement {
            kind: ImportKind::Straight,
            module_path,
            relative_level: 0,
            alias,
            names: Vec::new(),
            is_star: false,
            leading_comments: Vec::new(),
            trailing_comment: None,
            first_seen: 0,
        })
        .collect())
}

fn from_import(input: &mut &str) -> ModalResult<Vec<ImportStatement>> {
    let _ = (keyword("from"), multispace1).parse_next(input)?;
    let dots: &str = take_while(0.., |c| c == '.').parse_next(input)?;
    let relative_level = dots.len();
    let module: Option<String> = opt(dotted_name).parse_next(input)?;
    if relative_level == 0 && module.is_none() {
        return Err(ErrMode::from_input(input));
    }
    let _ = (multispace0, keyword("import"), multispace0).parse_next(input)?;

    let (names, is_star) = alt((
        '*'.map(|_| (vec![ImportedName::new("*")], true)),
        paren_name_list.map(|names| (names, false)),
        bare_name_list.map(|names| (names, false)),
    ))
    .parse_next(input)?;
    let _ = multispace0.parse_next(input)?;

    Ok(vec![ImportStatement {
        kind: ImportKind::From,
        module_path: module.unwrap_or_default(),
        relative_level,
        alias: None,
        names,
        is_star,
        leading_comments: Vec::new(),
        trailing_comment: None,
        first_seen: 0,
    }])
}

fn paren_name_list(input: &mut &str) -> ModalResult<Vec<ImportedName>> {
    delimited(
        ('(', multispace0),
        bare_name_list,
        (multispace0, opt((',', multispace0)), ')'),
    )
    .parse_next(input)
}

fn bare_name_list(input: &mut &str) -> ModalResult<Vec<ImportedName>> {
    separated(1.., name_as, (multispace0, ',', multispace0)).parse_next(input)
}

fn name_as(input: &mut &str) -> ModalResult<ImportedName> {
    let name = identifier(input)?;
    let alias = opt(preceded((multispace1, keyword("as"), multispace1), identifier))
        .parse_next(input)?;
    Ok(ImportedName { name, alias })
}

fn module_as(input: &mut &str) -> ModalResult<(String, Option<String>)> {
    let module = dotted_name(input)?;
    let alias = opt(preceded((multispace1, keyword("as"), multispace1), identifier))
        .parse_next(input)?;
    Ok((module, alias))
}

fn dotted_name(input: &mut &str) -> ModalResult<String> {
    let parts: Vec<String> = separated(1.., identifier, '.').parse_next(input)?;
    Ok(parts.join("."))
}

fn identifier(input: &mut &str) -> ModalResult<String> {
    let word: &str =
        take_while(1.., |c: char| c.is_alphanumeric() || c == '_').parse_next(input)?;
    if word.starts_with(|c: char| c.is_numeric()) {
        return Err(ErrMode::from_input(input));
    }
    Ok(word.to_string())
}

/// Match `word` only at a keyword boundary (not a prefix of an identifier).
fn keyword(word: &'static str) -> impl FnMut(&mut &str) -> ModalResult<()> {
    move |input: &mut &str| {
        let checkpoint = *input;
        let matched: &str =
            take_while(1.., |c: char| c.is_alphanumeric() || c == '_').parse_next(input)?;
        if matched == word {
            Ok(())
        } else {
            *input = checkpoint;
            Err(ErrMode::from_input(input))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
