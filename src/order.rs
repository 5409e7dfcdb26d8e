//! Ordering engine: grouping, merging, and deterministic total ordering.
//!
//! Given classified statements, produces one ordered sequence per section in
//! the fixed section order. Statements are never mutated after
//! classification except by merging/splitting here; individual fields other
//! than `names` and comments are preserved.
//!
//! Ties under the configured comparator break by original first-appearance
//! order (all sorts are stable over the first-seen sequence), which makes
//! re-running the engine on its own output a fixed point.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::config::{Config, SortOrder};
use crate::parse::{ImportKind, ImportStatement};
use crate::render;

// ============================================================================
// Output Shape
// ============================================================================

/// Ordered statements per section, in the fixed emission order.
/// Sections with no members are omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionedImports {
    pub sections: Vec<(String, Vec<ImportStatement>)>,
}

// ============================================================================
// Arrangement
// ============================================================================

/// Arrange classified statements into ordered sections.
pub fn arrange(classified: Vec<(String, ImportStatement)>, config: &Config) -> SectionedImports {
    let mut by_section: HashMap<String, Vec<ImportStatement>> = HashMap::new();
    for (section, stmt) in classified {
        by_section.entry(section).or_default().push(stmt);
    }

    let mut sections = Vec::new();
    for name in config.section_order() {
        if let Some(stmts) = by_section.remove(&name) {
            sections.push((name, arrange_section(stmts, config)));
        }
    }
    // The resolver only emits names from the emission order; anything else
    // would be silently dropped, so fail loudly in debug builds.
    debug_assert!(by_section.is_empty(), "unplaced sections: {:?}", by_section.keys());

    SectionedImports { sections }
}

/// Order one section: merge, sort names, split per configuration, then
/// apply the group comparator.
fn arrange_section(stmts: Vec<ImportStatement>, config: &Config) -> Vec<ImportStatement> {
    let mut stmts = merge_from_imports(stmts, config);
    for stmt in &mut stmts {
        sort_names(stmt, config);
    }
    let stmts = split_statements(stmts, config);
    order_statements(stmts, config)
}

// ============================================================================
// Merging
// ============================================================================

/// Merge multiple `from X import ...` of the identical `X` into one
/// statement and collapse duplicate straight imports, preserving first-seen
/// comments. Star imports never merge, and `import a` / `import a.b` stay
/// distinct statements by construction: their module paths differ.
fn merge_from_imports(stmts: Vec<ImportStatement>, config: &Config) -> Vec<ImportStatement> {
    let mut out: Vec<ImportStatement> = Vec::new();
    let mut index_of: HashMap<String, usize> = HashMap::new();

    for stmt in stmts {
        let key = match stmt.kind {
            ImportKind::From if !stmt.is_star => Some(format!("from:{}", module_key(&stmt, config))),
            // Straight duplicates are only duplicates under the same alias.
            ImportKind::Straight => Some(format!(
                "import:{}:{}",
                stmt.module_path,
                stmt.alias.as_deref().unwrap_or("")
            )),
            _ => None,
        };
        if let Some(key) = key {
            if let Some(&i) = index_of.get(&key) {
                let target = &mut out[i];
                target.names.extend(stmt.names);
                target.leading_comments.extend(stmt.leading_comments);
                target.trailing_comment =
                    join_trailing(target.trailing_comment.take(), stmt.trailing_comment);
                continue;
            }
            index_of.insert(key, out.len());
        }
        out.push(stmt);
    }

    for stmt in &mut out {
        dedupe_names(stmt);
    }
    out
}

fn join_trailing(first: Option<String>, second: Option<String>) -> Option<String> {
    match (first, second) {
        (Some(a), Some(b)) => {
            let b_text = b.trim_start_matches('#').trim_start();
            Some(format!("{}; {}", a, b_text))
        }
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}

/// Drop duplicate (name, alias) pairs, keeping the first occurrence.
fn dedupe_names(stmt: &mut ImportStatement) {
    let mut seen: Vec<(String, Option<String>)> = Vec::new();
    stmt.names.retain(|n| {
        let key = (n.name.clone(), n.alias.clone());
        if seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });
}

// ============================================================================
// Name Sorting
// ============================================================================

/// Sort a statement's imported names. Aliases sort together with their base
/// name as one unit; `*` is the only name when present and never reorders.
fn sort_names(stmt: &mut ImportStatement, config: &Config) {
    if stmt.is_star {
        return;
    }
    if config.case_sensitive {
        stmt.names.sort_by(|a, b| a.name.cmp(&b.name));
    } else {
        stmt.names
            .sort_by(|a, b| fold(&a.name).cmp(&fold(&b.name)).then_with(|| a.name.cmp(&b.name)));
    }
}

// ============================================================================
// Splitting
// ============================================================================

/// Apply `force_single_line` (one name per statement) or, failing that,
/// the `combine_as` rule (aliased names split into standalone statements).
fn split_statements(stmts: Vec<ImportStatement>, config: &Config) -> Vec<ImportStatement> {
    if config.force_single_line {
        return stmts
            .into_iter()
            .flat_map(|stmt| explode_names(stmt, |_| true))
            .collect();
    }
    if !config.combine_as {
        return stmts
            .into_iter()
            .flat_map(|stmt| explode_names(stmt, |name| name.1))
            .collect();
    }
    stmts
}

/// Split out every name for which `select((index, aliased))` is true into
/// its own single-name statement. Comments stay with the first statement
/// emitted for the module.
fn explode_names<F>(stmt: ImportStatement, select: F) -> Vec<ImportStatement>
where
    F: Fn((usize, bool)) -> bool,
{
    if stmt.kind != ImportKind::From || stmt.is_star || stmt.names.len() <= 1 {
        return vec![stmt];
    }

    let mut kept = Vec::new();
    let mut split_off = Vec::new();
    for (i, name) in stmt.names.iter().enumerate() {
        if select((i, name.alias.is_some())) {
            split_off.push(name.clone());
        } else {
            kept.push(name.clone());
        }
    }
    if split_off.is_empty() || (kept.is_empty() && split_off.len() == 1) {
        return vec![stmt];
    }

    let mut out = Vec::new();
    let mut template = stmt.clone();
    template.leading_comments = Vec::new();
    template.trailing_comment = None;

    if !kept.is_empty() {
        let mut base = stmt.clone();
        base.names = kept;
        out.push(base);
    }
    for (i, name) in split_off.into_iter().enumerate() {
        let mut single = template.clone();
        single.names = vec![name];
        if out.is_empty() && i == 0 {
            single.leading_comments = stmt.leading_comments.clone();
            single.trailing_comment = stmt.trailing_comment.clone();
        }
        out.push(single);
    }
    out
}

// ============================================================================
// Group Ordering
// ============================================================================

/// Order a section's statements.
fn order_statements(stmts: Vec<ImportStatement>, config: &Config) -> Vec<ImportStatement> {
    if config.force_sort_within_sections {
        sort_run(stmts, config)
    } else {
        // Straight imports precede from-imports; each kind sorts on its own.
        let (straight, from): (Vec<_>, Vec<_>) = stmts
            .into_iter()
            .partition(|stmt| stmt.kind == ImportKind::Straight);
        let mut out = sort_run(straight, config);
        out.extend(sort_run(from, config));
        out
    }
}

/// Sort one run: force-to-top pins first, then the configured comparator.
/// `sort_by` is stable, so equal keys retain first-seen order.
fn sort_run(stmts: Vec<ImportStatement>, config: &Config) -> Vec<ImportStatement> {
    let (mut pinned, mut rest): (Vec<_>, Vec<_>) = stmts
        .into_iter()
        .partition(|stmt| config.force_to_top.contains(&stmt.dotted_path()));
    pinned.sort_by(|a, b| compare(a, b, config));
    rest.sort_by(|a, b| compare(a, b, config));
    pinned.extend(rest);
    pinned
}

/// The configured comparator, with deterministic secondary keys: straight
/// imports rank before from-imports of the same module, and single-name
/// statements of one module order by their name.
fn compare(a: &ImportStatement, b: &ImportStatement, config: &Config) -> Ordering {
    let key_a = module_key(a, config);
    let key_b = module_key(b, config);
    let primary = match config.sort_order {
        SortOrder::Alphabetical => key_a.cmp(&key_b),
        SortOrder::Natural => natural_cmp(&key_a, &key_b),
        SortOrder::Length => rendered_len(a)
            .cmp(&rendered_len(b))
            .then_with(|| key_a.cmp(&key_b)),
        SortOrder::LengthDescending => rendered_len(b)
            .cmp(&rendered_len(a))
            .then_with(|| key_a.cmp(&key_b)),
    };
    primary
        .then_with(|| kind_rank(a).cmp(&kind_rank(b)))
        .then_with(|| first_name_key(a, config).cmp(&first_name_key(b, config)))
}

/// The grouping/sorting key for a statement's module.
fn module_key(stmt: &ImportStatement, config: &Config) -> String {
    let path = stmt.dotted_path();
    if config.case_sensitive {
        path
    } else {
        fold(&path)
    }
}

fn kind_rank(stmt: &ImportStatement) -> u8 {
    match stmt.kind {
        ImportKind::Straight => 0,
        ImportKind::From => 1,
    }
}

fn first_name_key(stmt: &ImportStatement, config: &Config) -> String {
    match stmt.names.first() {
        Some(name) if config.case_sensitive => name.name.clone(),
        Some(name) => fold(&name.name),
        None => String::new(),
    }
}

fn rendered_len(stmt: &ImportStatement) -> usize {
    render::single_line(stmt).chars().count()
}

fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// Compare with numeric substrings treated as integers (`mod2` < `mod10`).
/// Text chunks compare case-insensitively.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ai = a.chars().peekable();
    let mut bi = b.chars().peekable();
    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) => {
                if ca.is_ascii_digit() && cb.is_ascii_digit() {
                    let na = take_digits(&mut ai);
                    let nb = take_digits(&mut bi);
                    let ord = na
                        .trim_start_matches('0')
                        .len()
                        .cmp(&nb.trim_start_matches('0').len())
                        .then_with(|| na.trim_start_matches('0').cmp(nb.trim_start_matches('0')))
                        .then_with(|| na.cmp(&nb));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                } else {
                    let ord = ca
                        .to_lowercase()
                        .cmp(cb.to_lowercase())
                        .then_with(|| ca.cmp(&cb));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                    ai.next();
                    bi.next();
                }
            }
        }
    }
}

fn take_digits(iter: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(&c) = iter.peek() {
        if c.is_ascii_digit() {
            digits.push(c);
            iter.next();
        } else {
            break;
        }
    }
    digits
}

// ============================================================================
// Tests
// ============================================================================
