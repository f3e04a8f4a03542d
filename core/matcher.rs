use crate::ignore_rules::{DEFAULT_IGNORE_FILE, IgnoreRule};
use globset::{GlobBuilder, GlobMatcher};
use log;
#[cfg(feature = "serde_support")]
use serde::Serialize;
use std::path::{Component, Path};

/// Outcome of evaluating one path against a [`RuleSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "camelCase"))]
pub struct Verdict {
    pub relative_path: String,
    pub ignored: bool,
    pub reason: VerdictReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "camelCase", tag = "kind"))]
pub enum VerdictReason {
    /// No rules were loaded, so every path counts as ignored.
    NoRules,
    /// The ignore-rules file itself is always shown.
    IgnoreFile,
    /// No rule matched.
    Unmatched,
    /// The rule at `index` was the last one to match.
    Rule { index: usize, line: String },
}

/// Ordered ignore rules with their wildcard patterns compiled once.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<IgnoreRule>,
    wildcards: Vec<Option<GlobMatcher>>,
    ignore_file_name: String,
}

impl RuleSet {
    pub fn new(rules: Vec<IgnoreRule>) -> Self {
        let wildcards = rules
            .iter()
            .map(|rule| {
                if rule.has_wildcard() {
                    compile_wildcard(&rule.pattern)
                } else {
                    None
                }
            })
            .collect();
        Self {
            rules,
            wildcards,
            ignore_file_name: DEFAULT_IGNORE_FILE.to_string(),
        }
    }

    pub fn with_ignore_file_name(mut self, name: &str) -> Self {
        self.ignore_file_name = name.to_string();
        self
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_ignored(&self, path: &Path, root: &Path) -> bool {
        self.explain(path, root).ignored
    }

    /// Evaluates every rule in order; each match overwrites the previous
    /// decision with `!is_negated`.
    pub fn explain(&self, path: &Path, root: &Path) -> Verdict {
        let relative_path = normalized_relative_path(path, root);

        if self.rules.is_empty() {
            return Verdict {
                relative_path,
                ignored: true,
                reason: VerdictReason::NoRules,
            };
        }

        if path
            .file_name()
            .is_some_and(|name| name == self.ignore_file_name.as_str())
        {
            return Verdict {
                relative_path,
                ignored: false,
                reason: VerdictReason::IgnoreFile,
            };
        }

        let mut ignored = false;
        let mut last_match = None;
        for (index, rule) in self.rules.iter().enumerate() {
            if self.matches_rule(index, &relative_path, path) {
                log::trace!(
                    "Rule '{}' matched '{}' (negated: {})",
                    rule.to_line(),
                    relative_path,
                    rule.is_negated
                );
                ignored = !rule.is_negated;
                last_match = Some(index);
            }
        }

        let reason = match last_match {
            Some(index) => VerdictReason::Rule {
                index,
                line: self.rules[index].to_line(),
            },
            None => VerdictReason::Unmatched,
        };
        Verdict {
            relative_path,
            ignored,
            reason,
        }
    }

    fn matches_rule(&self, index: usize, relative_path: &str, absolute_path: &Path) -> bool {
        let rule = &self.rules[index];
        let pattern = rule.pattern.as_str();
        if pattern.is_empty() {
            return false;
        }

        if pattern == relative_path {
            return true;
        }

        if relative_path.split('/').any(|segment| segment == pattern) {
            return true;
        }

        // Existence stands in for "is a directory" here.
        if rule.is_directory && !absolute_path.exists() {
            return false;
        }

        if let Some(matcher) = &self.wildcards[index] {
            if matcher.is_match(relative_path) {
                return true;
            }
            if segment_prefixes(relative_path).any(|prefix| matcher.is_match(prefix)) {
                return true;
            }
        }

        relative_path
            .strip_prefix(pattern)
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Convenience wrapper that compiles `rules` for a single query.
pub fn is_ignored(path: &Path, root: &Path, rules: &[IgnoreRule]) -> bool {
    RuleSet::new(rules.to_vec()).is_ignored(path, root)
}

/// Path of `path` relative to `root`, with components joined by `/`.
pub fn normalized_relative_path(path: &Path, root: &Path) -> String {
    let relative = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf());
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// `a`, `a/b`, `a/b/c` for `a/b/c`.
fn segment_prefixes(relative_path: &str) -> impl Iterator<Item = &str> {
    relative_path
        .match_indices('/')
        .map(move |(idx, _)| &relative_path[..idx])
        .chain(std::iter::once(relative_path))
}

/// `*` means any sequence (slashes included); everything else is literal.
fn compile_wildcard(pattern: &str) -> Option<GlobMatcher> {
    let mut glob = String::with_capacity(pattern.len() + 8);
    let mut previous_star = false;
    for ch in pattern.chars() {
        match ch {
            '*' if previous_star => continue,
            '*' => glob.push('*'),
            '?' | '[' | ']' | '{' | '}' | '\\' => {
                glob.push('\\');
                glob.push(ch);
            }
            _ => glob.push(ch),
        }
        previous_star = ch == '*';
    }

    match GlobBuilder::new(&glob)
        .literal_separator(false)
        .backslash_escape(true)
        .build()
    {
        Ok(compiled) => Some(compiled.compile_matcher()),
        Err(e) => {
            log::warn!("Invalid wildcard ignore pattern \"{}\": {}", pattern, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn rule(pattern: &str) -> IgnoreRule {
        IgnoreRule::new(pattern)
    }

    #[test]
    fn empty_rules_ignore_everything() {
        let root = Path::new("/project");
        assert!(is_ignored(&root.join("a.txt"), root, &[]));
        assert!(is_ignored(&root.join("src/main.rs"), root, &[]));
        assert!(is_ignored(&root.join(".gitignore"), root, &[]));
    }

    #[test]
    fn ignore_file_is_never_ignored() {
        let root = Path::new("/project");
        let rules = vec![rule("*"), rule(".gitignore")];
        assert!(!is_ignored(&root.join(".gitignore"), root, &rules));
        assert!(!is_ignored(&root.join("nested/.gitignore"), root, &rules));
        assert!(is_ignored(&root.join("other"), root, &rules));
    }

    #[test]
    fn custom_ignore_file_name_is_protected() {
        let root = Path::new("/project");
        let set = RuleSet::new(vec![rule("*")]).with_ignore_file_name(".xscopeignore");
        assert!(!set.is_ignored(&root.join(".xscopeignore"), root));
        assert!(set.is_ignored(&root.join(".gitignore"), root));
    }

    #[test]
    fn negation_overrides_earlier_directory_rule() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::create_dir_all(root.join("a/c")).unwrap();

        let rules = vec![rule("a").directory(), rule("a/b").negated()];
        assert!(!is_ignored(&root.join("a/b"), root, &rules));
        assert!(is_ignored(&root.join("a/c"), root, &rules));
    }

    #[test]
    fn later_rules_win_regardless_of_specificity() {
        let root = Path::new("/project");
        let rules = vec![rule("logs/debug.log").negated(), rule("*.log")];
        assert!(is_ignored(&root.join("logs/debug.log"), root, &rules));
    }

    #[test]
    fn wildcard_matches_any_depth_but_not_without_dot() {
        let root = Path::new("/project");
        let rules = vec![rule("*.log")];
        assert!(is_ignored(&root.join("app.log"), root, &rules));
        assert!(is_ignored(&root.join("nested/app.log"), root, &rules));
        assert!(!is_ignored(&root.join("applog"), root, &rules));
    }

    #[test]
    fn wildcard_prunes_matching_ancestor() {
        let root = Path::new("/project");
        let rules = vec![rule("tmp*")];
        assert!(is_ignored(&root.join("tmp-cache/deep/file.rs"), root, &rules));
        assert!(!is_ignored(&root.join("src/file.rs"), root, &rules));
    }

    #[test]
    fn wildcard_treats_glob_metacharacters_literally() {
        let root = Path::new("/project");
        let rules = vec![rule("file?[1]*")];
        assert!(is_ignored(&root.join("file?[1].txt"), root, &rules));
        assert!(!is_ignored(&root.join("fileA1.txt"), root, &rules));
    }

    #[test]
    fn repeated_stars_collapse() {
        let root = Path::new("/project");
        let rules = vec![rule("a**b")];
        assert!(is_ignored(&root.join("a/x/b"), root, &rules));
    }

    #[test]
    fn plain_name_matches_any_segment() {
        let root = Path::new("/project");
        let rules = vec![rule("nest")];
        assert!(is_ignored(&root.join("nest"), root, &rules));
        assert!(is_ignored(&root.join("src/nest/mod.rs"), root, &rules));
        assert!(!is_ignored(&root.join("nested"), root, &rules));
    }

    #[test]
    fn multi_segment_pattern_matches_as_prefix() {
        let root = Path::new("/project");
        let rules = vec![rule("docs/api")];
        assert!(is_ignored(&root.join("docs/api"), root, &rules));
        assert!(is_ignored(&root.join("docs/api/index.md"), root, &rules));
        assert!(!is_ignored(&root.join("docs/apis"), root, &rules));
    }

    #[test]
    fn directory_rule_requires_existing_path_past_name_checks() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let rules = vec![rule("out*").directory()];
        // Missing on disk: wildcard and prefix checks are skipped.
        assert!(!is_ignored(&root.join("output"), root, &rules));
        fs::create_dir(root.join("output")).unwrap();
        assert!(is_ignored(&root.join("output"), root, &rules));
    }

    #[test]
    fn directory_rule_name_match_does_not_need_disk() {
        let root = Path::new("/definitely/not/here");
        let rules = vec![rule("build").directory()];
        assert!(is_ignored(&root.join("build"), root, &rules));
    }

    #[test]
    fn unmatched_paths_are_kept() {
        let root = Path::new("/project");
        let rules = vec![rule("target")];
        assert!(!is_ignored(&root.join("src/lib.rs"), root, &rules));
    }

    #[test]
    fn explain_reports_last_matching_rule() {
        let root = Path::new("/project");
        let set = RuleSet::new(vec![rule("*.log"), rule("keep.log").negated()]);
        let verdict = set.explain(&root.join("keep.log"), root);
        assert!(!verdict.ignored);
        assert_eq!(
            verdict.reason,
            VerdictReason::Rule {
                index: 1,
                line: "!keep.log".to_string()
            }
        );
        assert_eq!(set.explain(&root.join("x.txt"), root).reason, VerdictReason::Unmatched);
    }

    #[test]
    fn matching_does_not_mutate_rules() {
        let root = Path::new("/project");
        let rules = vec![rule("a").directory(), rule("*.tmp")];
        let before = rules.clone();
        let set = RuleSet::new(rules);
        let _ = set.is_ignored(&root.join("a/b.tmp"), root);
        assert_eq!(set.rules(), before.as_slice());
    }

    #[test]
    fn relative_path_uses_forward_slashes() {
        let root = Path::new("/project");
        assert_eq!(
            normalized_relative_path(&root.join("a").join("b").join("c.txt"), root),
            "a/b/c.txt"
        );
        assert_eq!(normalized_relative_path(root, root), "");
    }
}
