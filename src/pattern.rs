//! Branch Pattern Resolution
//!
//! Matches configured branch names and `*` wildcards against existing branches

use std::collections::HashSet;

use regex::Regex;

use crate::error::Result;

/// A protected-branch pattern
#[derive(Debug, Clone)]
pub enum BranchPattern {
    /// Must equal a branch name exactly
    Exact(String),

    /// `*` matches any (possibly empty) run of characters
    Wildcard { pattern: String, regex: Regex },
}

impl BranchPattern {
    /// Parse a pattern string
    ///
    /// Everything except `*` is matched literally, so `release.1` does not
    /// match `release-1`.
    ///
    /// # Errors
    /// Returns an error if the derived expression cannot be compiled
    pub fn parse(pattern: &str) -> Result<Self> {
        if !pattern.contains('*') {
            return Ok(BranchPattern::Exact(pattern.to_string()));
        }

        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = Regex::new(&format!("^{body}$"))?;

        Ok(BranchPattern::Wildcard {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as written in configuration
    pub fn as_str(&self) -> &str {
        match self {
            BranchPattern::Exact(name) => name,
            BranchPattern::Wildcard { pattern, .. } => pattern,
        }
    }

    /// Whether the branch name matches this pattern
    pub fn matches(&self, branch: &str) -> bool {
        match self {
            BranchPattern::Exact(name) => name == branch,
            BranchPattern::Wildcard { regex, .. } => regex.is_match(branch),
        }
    }
}

/// Resolve patterns against the branches that exist remotely
///
/// Output follows pattern order, then listing order within a pattern. A
/// branch matched by several patterns is kept at its first position.
///
/// # Errors
/// Returns an error if a pattern cannot be compiled
pub fn resolve_branches<S: AsRef<str>>(patterns: &[S], existing: &[String]) -> Result<Vec<String>> {
    let mut resolved = Vec::new();
    let mut seen = HashSet::new();

    for pattern in patterns {
        let pattern = BranchPattern::parse(pattern.as_ref())?;
        for branch in existing.iter().filter(|b| pattern.matches(b)) {
            if seen.insert(branch.as_str()) {
                resolved.push(branch.clone());
            }
        }
    }

    Ok(resolved)
}
