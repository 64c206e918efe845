// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output classification rules per gate type.

use sc_core::GateClassification;

/// Markers that mean the RED suite did not even compile.
const RED_SYNTAX_MARKERS: &[&str] = &[
    "syntax error",
    "import cycle",
    "cannot find package",
    "undefined:",
    "expected ';'",
];

/// Classify a VERIFY_RED run.
///
/// A red gate must fail *for the right reason*: a test that genuinely
/// fails. A clean exit means the test proves nothing (vanity); a
/// compile error means the suite is broken (syntax).
pub(crate) fn classify_red(exit_code: i32, output: &str) -> GateClassification {
    if RED_SYNTAX_MARKERS.iter().any(|m| output.contains(m)) {
        return GateClassification::RejectSyntax;
    }
    if exit_code == 0 {
        return GateClassification::RejectVanity;
    }
    if has_test_failure(output) {
        return GateClassification::Accept;
    }
    GateClassification::RejectFailure
}

/// Exit-code-only classification (REFACTOR, IMPLEMENT, and the GREEN
/// pre-infra stage).
pub(crate) fn classify_exit(exit_code: i32) -> GateClassification {
    if exit_code == 0 {
        GateClassification::Accept
    } else {
        GateClassification::RejectFailure
    }
}

/// True when the output shows a genuine test failure.
pub(crate) fn has_test_failure(output: &str) -> bool {
    output.contains("--- FAIL:") || output.lines().any(|l| l.starts_with("FAIL"))
}

/// Evidence snippet for GREEN/REFACTOR/IMPLEMENT gates: prefer the
/// first failure line, otherwise the leading bytes with a `...` mark.
pub(crate) fn failure_snippet(output: &str, limit: usize) -> String {
    let failure_line = output.lines().find(|l| {
        l.contains("--- FAIL:") || l.starts_with("FAIL") || l.contains("panic:")
    });
    match failure_line {
        Some(line) => head(line, limit).to_string(),
        None => {
            let taken = head(output, limit);
            if taken.len() < output.len() {
                format!("{taken}...")
            } else {
                taken.to_string()
            }
        }
    }
}

/// Evidence snippet for RED gates: the leading bytes, unadorned.
pub(crate) fn head_snippet(output: &str, limit: usize) -> String {
    head(output, limit).to_string()
}

/// Leading `limit` bytes on a char boundary.
fn head(s: &str, limit: usize) -> &str {
    if s.len() <= limit {
        return s;
    }
    let mut end = limit;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
