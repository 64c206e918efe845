// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slugify strings for worktree paths and branch names.

/// Slugify a string for use in worktree directory and branch names.
///
/// Lowercases, replaces any run of non-alphanumeric characters with a
/// single hyphen, and trims leading/trailing hyphens. An input that
/// slugifies to nothing yields `"mission"` so paths stay well-formed.
pub fn slug(input: &str) -> String {
    let lower = input.to_lowercase();

    let mut out = String::with_capacity(lower.len());
    let mut last_was_hyphen = false;
    for ch in lower.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            out.push('-');
            last_was_hyphen = true;
        }
    }

    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "mission".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
#[path = "slug_tests.rs"]
mod tests;
