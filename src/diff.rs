//! Unified diff generation for pending changes.
//!
//! Sorting only ever rewrites one contiguous region of a buffer, so the diff
//! reduces to the lines between the longest common prefix and suffix,
//! emitted as a single hunk with three lines of context.

/// Generate a unified diff between two buffers, or an empty string when they
/// are identical.
pub fn unified_diff(path: &str, old: &str, new: &str) -> String {
    if old == new {
        return String::new();
    }

    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();

    let mut prefix = 0;
    while prefix < old_lines.len()
        && prefix < new_lines.len()
        && old_lines[prefix] == new_lines[prefix]
    {
        prefix += 1;
    }
    let mut suffix = 0;
    while suffix < old_lines.len() - prefix
        && suffix < new_lines.len() - prefix
        && old_lines[old_lines.len() - 1 - suffix] == new_lines[new_lines.len() - 1 - suffix]
    {
        suffix += 1;
    }

    const CONTEXT: usize = 3;
    let start = prefix.saturating_sub(CONTEXT);
    let old_stop = (old_lines.len() - suffix + CONTEXT).min(old_lines.len());
    let new_stop = (new_lines.len() - suffix + CONTEXT).min(new_lines.len());

    let old_count = old_stop - start;
    let new_count = new_stop - start;

    let mut diff = String::new();
    diff.push_str(&format!("--- a/{}\n", path));
    diff.push_str(&format!("+++ b/{}\n", path));
    diff.push_str(&format!(
        "@@ -{},{} +{},{} @@\n",
        if old_count == 0 { start } else { start + 1 },
        old_count,
        if new_count == 0 { start } else { start + 1 },
        new_count,
    ));

    for line in &old_lines[start..prefix] {
        diff.push_str(&format!(" {}\n", line));
    }
    for line in &old_lines[prefix..old_lines.len() - suffix] {
        diff.push_str(&format!("-{}\n", line));
    }
    for line in &new_lines[prefix..new_lines.len() - suffix] {
        diff.push_str(&format!("+{}\n", line));
    }
    for line in &old_lines[old_lines.len() - suffix..old_stop] {
        diff.push_str(&format!(" {}\n", line));
    }

    diff
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_buffers_produce_no_diff() {
        assert!(unified_diff("a.py", "import os\n", "import os\n").is_empty());
    }

    #[test]
    fn single_region_change() {
        let old = "import sys\nimport os\n\nprint(1)\n";
        let new = "import os\nimport sys\n\nprint(1)\n";
        let diff = unified_diff("a.py", old, new);
        assert!(diff.starts_with("--- a/a.py\n+++ b/a.py\n"));
        assert!(diff.contains("@@ -1,4 +1,4 @@"));
        assert!(diff.contains("-import sys\n-import os\n"));
        assert!(diff.contains("+import os\n+import sys\n"));
        assert!(diff.contains(" print(1)\n"));
    }

    #[test]
    fn context_is_limited_to_three_lines() {
        let tail = "a()\nb()\nc()\nd()\ne()\n";
        let old = format!("import z\nimport a\n\n{}", tail);
        let new = format!("import a\nimport z\n\n{}", tail);
        let diff = unified_diff("a.py", &old, &new);
        assert!(diff.contains(" c()\n"));
        assert!(!diff.contains(" d()\n"));
    }

    #[test]
    fn pure_insertion_diffs_cleanly() {
        let old = "import os\n";
        let new = "import os\nimport sys\n";
        let diff = unified_diff("a.py", old, new);
        assert!(diff.contains("+import sys\n"));
        let removals = diff
            .lines()
            .filter(|l| l.starts_with('-') && !l.starts_with("---"))
            .count();
        assert_eq!(removals, 0);
    }
}
