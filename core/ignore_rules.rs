use log;
#[cfg(feature = "serde_support")]
use serde::Serialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_IGNORE_FILE: &str = ".gitignore";

/// One parsed line of an ignore-rules file.
///
/// `pattern` never carries the leading `!` or the trailing `/`; those are
/// recorded in `is_negated` and `is_directory`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "camelCase"))]
pub struct IgnoreRule {
    pub pattern: String,
    pub is_negated: bool,
    pub is_directory: bool,
}

impl IgnoreRule {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            is_negated: false,
            is_directory: false,
        }
    }

    pub fn negated(mut self) -> Self {
        self.is_negated = true;
        self
    }

    pub fn directory(mut self) -> Self {
        self.is_directory = true;
        self
    }

    pub fn has_wildcard(&self) -> bool {
        self.pattern.contains('*')
    }

    /// Renders the rule back to the line form it was parsed from.
    pub fn to_line(&self) -> String {
        format!(
            "{}{}{}",
            if self.is_negated { "!" } else { "" },
            self.pattern,
            if self.is_directory { "/" } else { "" }
        )
    }
}

/// Reads `<root>/<file_name>` into an ordered rule list.
///
/// A missing file yields no rules. A file that exists but cannot be read is
/// logged and also yields no rules.
pub fn parse_ignore_file(root: &Path, file_name: &str) -> Vec<IgnoreRule> {
    let ignore_path = root.join(file_name);
    if !ignore_path.exists() {
        log::debug!("No ignore file at {}", ignore_path.display());
        return Vec::new();
    }

    match fs::read_to_string(&ignore_path) {
        Ok(content) => {
            let rules = parse_ignore_rules(&content);
            log::debug!(
                "Parsed {} ignore rules from {}",
                rules.len(),
                ignore_path.display()
            );
            rules
        }
        Err(e) => {
            log::warn!(
                "Error reading ignore file '{}': {}. Continuing with no rules.",
                ignore_path.display(),
                e
            );
            Vec::new()
        }
    }
}

pub fn parse_ignore_rules(content: &str) -> Vec<IgnoreRule> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(parse_rule_line)
        .collect()
}

fn parse_rule_line(line: &str) -> IgnoreRule {
    let (is_negated, rest) = match line.strip_prefix('!') {
        Some(stripped) => (true, stripped),
        None => (false, line),
    };
    let (is_directory, rest) = match rest.strip_suffix('/') {
        Some(stripped) => (true, stripped),
        None => (false, rest),
    };
    log::trace!("Parsed ignore rule line: {}", line);
    IgnoreRule {
        pattern: rest.trim().to_string(),
        is_negated,
        is_directory,
    }
}
