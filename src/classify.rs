//! Classifier: assigns each import statement to exactly one section.
//!
//! Classification is an ordered rule chain evaluated first-match-wins, kept
//! as an explicit list so the precedence is visible and each rule is
//! independently testable:
//!
//! 1. Explicit per-module section overrides
//! 2. Forced-separate groups (each pattern is its own section)
//! 3. Relative imports -> LOCALFOLDER
//! 4. Known first-party prefixes -> FIRSTPARTY
//! 5. Known third-party names -> THIRDPARTY (outranks the stdlib table)
//! 6. Known standard library (version-keyed) -> STDLIB
//! 7. `__future__` -> FUTURE
//! 8. Default -> THIRDPARTY
//!
//! The resolver is a pure function of the statement's module path and the
//! configuration. Results for absolute imports are memoized in a
//! read-through concurrent map so that files processed in parallel share
//! decisions; the cache is an internal optimization, not part of the
//! contract.

use std::collections::{BTreeMap, BTreeSet};

use dashmap::DashMap;

use crate::config::{Config, PythonVersion, FIRSTPARTY, FUTURE, LOCALFOLDER, STDLIB, THIRDPARTY};
use crate::parse::ImportStatement;
use crate::stdlib;

// ============================================================================
// Rules
// ============================================================================

/// One predicate -> section mapping in the classification chain.
#[derive(Debug)]
enum Rule {
    /// Exact or prefix match against explicit per-module overrides.
    Overrides(BTreeMap<String, String>),
    /// Prefix match against forced-separate patterns; the matched pattern
    /// becomes the section name.
    ForcedSeparate(Vec<String>),
    /// Relative imports.
    Relative(String),
    /// Prefix match against first-party roots.
    FirstParty(BTreeSet<String>),
    /// Exact or prefix match against known third-party names.
    KnownThirdParty(BTreeSet<String>),
    /// Top-level membership in the standard-library set.
    StandardLibrary {
        version: PythonVersion,
        extra: BTreeSet<String>,
    },
    /// The `__future__` module.
    Future,
    /// Unknown modules become third-party.
    Fallback(String),
}

impl Rule {
    /// Evaluate this rule against a statement; `Some(section)` on match.
    fn section(&self, stmt: &ImportStatement) -> Option<String> {
        match self {
            Rule::Overrides(overrides) => overrides
                .iter()
                .find(|(prefix, _)| prefix_match(&stmt.module_path, prefix))
                .map(|(_, section)| section.clone()),
            Rule::ForcedSeparate(patterns) => patterns
                .iter()
                .find(|pattern| prefix_match(&stmt.module_path, pattern))
                .cloned(),
            Rule::Relative(section) => stmt.is_relative().then(|| section.clone()),
            Rule::FirstParty(roots) => roots
                .iter()
                .any(|root| prefix_match(&stmt.module_path, root))
                .then(|| FIRSTPARTY.to_string()),
            Rule::KnownThirdParty(names) => names
                .iter()
                .any(|name| prefix_match(&stmt.module_path, name))
                .then(|| THIRDPARTY.to_string()),
            Rule::StandardLibrary { version, extra } => {
                let top = stmt.top_level();
                (stdlib::is_standard_library(top, *version) || extra.contains(top))
                    .then(|| STDLIB.to_string())
            }
            Rule::Future => (stmt.top_level() == "__future__").then(|| FUTURE.to_string()),
            Rule::Fallback(section) => Some(section.clone()),
        }
    }
}

/// True if `module` equals `prefix` or starts with `prefix` at a dot
/// boundary (`a.b` matches `a.b` and `a.b.c`, never `a.bc`).
fn prefix_match(module: &str, prefix: &str) -> bool {
    if prefix.is_empty() || module.len() < prefix.len() {
        return false;
    }
    module == prefix
        || (module.starts_with(prefix) && module.as_bytes()[prefix.len()] == b'.')
}

// ============================================================================
// Resolver
// ============================================================================

/// Injected, read-only classification service.
///
/// Built once from the configuration and shared by every processing unit.
/// Safe to share across threads: entries are pure functions of the immutable
/// configuration.
#[derive(Debug)]
pub struct SectionResolver {
    rules: Vec<Rule>,
    cache: DashMap<String, String>,
}

impl SectionResolver {
    /// Build the rule chain from the configuration. Rules targeting a
    /// section absent from the configured order are left out, so every
    /// resolved name appears in the emission order.
    pub fn new(config: &Config) -> Self {
        let has = |name: &str| config.sections.iter().any(|s| s == name);
        let fallback = if has(THIRDPARTY) {
            THIRDPARTY.to_string()
        } else {
            // Degenerate configuration; everything unknown lands in the
            // last configured section.
            config
                .sections
                .last()
                .cloned()
                .unwrap_or_else(|| THIRDPARTY.to_string())
        };

        let mut rules = Vec::new();
        if !config.section_overrides.is_empty() {
            rules.push(Rule::Overrides(config.section_overrides.clone()));
        }
        if !config.forced_separate.is_empty() {
            rules.push(Rule::ForcedSeparate(config.forced_separate.clone()));
        }
        rules.push(Rule::Relative(if has(LOCALFOLDER) {
            LOCALFOLDER.to_string()
        } else {
            fallback.clone()
        }));
        if has(FIRSTPARTY) && !config.known_first_party.is_empty() {
            rules.push(Rule::FirstParty(config.known_first_party.clone()));
        }
        if !config.known_third_party.is_empty() {
            rules.push(Rule::KnownThirdParty(config.known_third_party.clone()));
        }
        if has(STDLIB) {
            rules.push(Rule::StandardLibrary {
                version: config.python_version,
                extra: config.extra_standard_library.clone(),
            });
        }
        if has(FUTURE) {
            rules.push(Rule::Future);
        }
        rules.push(Rule::Fallback(fallback));

        SectionResolver {
            rules,
            cache: DashMap::new(),
        }
    }

    /// Resolve the section for one statement.
    pub fn resolve(&self, stmt: &ImportStatement) -> String {
        let cacheable = !stmt.is_relative() && !stmt.module_path.is_empty();
        if cacheable {
            if let Some(hit) = self.cache.get(&stmt.module_path) {
                return hit.clone();
            }
        }

        let section = self
            .rules
            .iter()
            .find_map(|rule| rule.section(stmt))
            .unwrap_or_else(|| THIRDPARTY.to_string());

        if cacheable {
            tracing::debug!(module = %stmt.module_path, section = %section, "classified");
            self.cache.insert(stmt.module_path.clone(), section.clone());
        }
        section
    }
}

// ============================================================================
// Tests
// ============================================================================
