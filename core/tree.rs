use crate::config::{Config, ListingErrorPolicy, MissingRulesPolicy};
use crate::error::{AppError, Result};
use crate::ignore_rules::{IgnoreRule, parse_ignore_file};
use crate::matcher::{RuleSet, normalized_relative_path};
use log;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE_INDENT: &str = "│   ";
const SPACE_INDENT: &str = "    ";

/// One listed child of the directory currently being rendered.
#[derive(Debug, Clone)]
struct DirectoryEntry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

/// Renders a filtered ASCII tree of a project.
///
/// Ignore rules are parsed once, when the builder is created. Each directory
/// level is listed, stripped of structural exclusions and ignored paths,
/// sorted directories-first and rendered with `├──` / `└──` connectors.
#[derive(Debug)]
pub struct TreeBuilder<'a> {
    root: PathBuf,
    rules: RuleSet,
    config: &'a Config,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(root: &Path, config: &'a Config) -> Self {
        let rules = parse_ignore_file(root, &config.ignore.file_name);
        Self::with_rules(root, rules, config)
    }

    pub fn with_rules(root: &Path, rules: Vec<IgnoreRule>, config: &'a Config) -> Self {
        Self {
            root: root.to_path_buf(),
            rules: RuleSet::new(rules).with_ignore_file_name(&config.ignore.file_name),
            config,
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Renders every level below the root.
    pub fn render(&self) -> Result<String> {
        log::debug!("Rendering tree for {}", self.root.display());
        if self.rules.is_empty() {
            match self.config.ignore.missing_rules {
                MissingRulesPolicy::IgnoreAll => log::info!(
                    "No ignore rules loaded from '{}'; every entry counts as ignored.",
                    self.config.ignore.file_name
                ),
                MissingRulesPolicy::IncludeAll => log::debug!(
                    "No ignore rules loaded; showing all entries not structurally excluded."
                ),
            }
        }
        self.build_tree(&self.root, "")
    }

    /// Renders the subtree under `current`, prefixing each line with `indent`.
    pub fn build_tree(&self, current: &Path, indent: &str) -> Result<String> {
        let depth = normalized_relative_path(current, &self.root)
            .split('/')
            .filter(|segment| !segment.is_empty())
            .count();
        self.build_level(current, indent, depth)
    }

    fn build_level(&self, current: &Path, indent: &str, depth: usize) -> Result<String> {
        if self.config.tree.max_depth.is_some_and(|max| depth >= max) {
            log::trace!("Depth limit reached at {}", current.display());
            return Ok(String::new());
        }

        let entries = match self.list_entries(current) {
            Ok(entries) => entries,
            Err(e) => return self.listing_failure(current, indent, e),
        };

        let last_index = entries.len().saturating_sub(1);
        let render_one = |(index, entry): (usize, &DirectoryEntry)| -> Result<String> {
            let is_last = index == last_index;
            let mut out = String::new();
            out.push_str(indent);
            out.push_str(if is_last { LAST_BRANCH } else { BRANCH });
            out.push_str(&entry.name);
            out.push('\n');
            if entry.is_dir {
                let child_indent =
                    format!("{}{}", indent, if is_last { SPACE_INDENT } else { PIPE_INDENT });
                out.push_str(&self.build_level(&entry.path, &child_indent, depth + 1)?);
            }
            Ok(out)
        };

        let rendered: Vec<String> = if self.config.tree.parallel {
            entries
                .par_iter()
                .enumerate()
                .map(render_one)
                .collect::<Result<_>>()?
        } else {
            entries
                .iter()
                .enumerate()
                .map(render_one)
                .collect::<Result<_>>()?
        };
        Ok(rendered.concat())
    }

    fn list_entries(&self, current: &Path) -> std::io::Result<Vec<DirectoryEntry>> {
        let mut entries = Vec::new();
        for entry_result in fs::read_dir(current)? {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry in {}: {}", current.display(), e);
                    continue;
                }
            };
            // Symlinks report their own type here, so links are never followed.
            let is_dir = match entry.file_type() {
                Ok(file_type) => file_type.is_dir(),
                Err(e) => {
                    log::warn!(
                        "Skipping entry with unknown type {}: {}",
                        entry.path().display(),
                        e
                    );
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();

            if is_dir && self.config.is_structurally_excluded_dir(&name) {
                log::trace!("Structurally excluded: {}", path.display());
                continue;
            }
            if self.applies_rules() && self.rules.is_ignored(&path, &self.root) {
                log::trace!("Ignored by rules: {}", path.display());
                continue;
            }
            entries.push(DirectoryEntry { name, path, is_dir });
        }

        entries.sort_by(|a, b| {
            b.is_dir
                .cmp(&a.is_dir)
                .then_with(|| compare_names(&a.name, &b.name))
        });
        Ok(entries)
    }

    fn applies_rules(&self) -> bool {
        !(self.rules.is_empty()
            && self.config.ignore.missing_rules == MissingRulesPolicy::IncludeAll)
    }

    fn listing_failure(&self, current: &Path, indent: &str, e: std::io::Error) -> Result<String> {
        match self.config.tree.on_listing_error {
            ListingErrorPolicy::Marker => {
                log::warn!("Error reading directory {}: {}", current.display(), e);
                Ok(format!(
                    "{}{}[error reading directory: {}]\n",
                    indent, LAST_BRANCH, e
                ))
            }
            ListingErrorPolicy::Abort => Err(AppError::DirectoryRead {
                path: current.to_path_buf(),
                source: e,
            }),
        }
    }
}

/// Renders the tree under `root` with the rules from its ignore file.
pub fn render_tree(root: &Path, config: &Config) -> Result<String> {
    TreeBuilder::new(root, config).render()
}

/// Case-insensitive first, then lowercase before uppercase, then bytes.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| {
            a.chars()
                .zip(b.chars())
                .find(|(ca, cb)| ca != cb)
                .map_or(Ordering::Equal, |(ca, cb)| {
                    match (ca.is_lowercase(), cb.is_lowercase()) {
                        (true, false) => Ordering::Less,
                        (false, true) => Ordering::Greater,
                        _ => Ordering::Equal,
                    }
                })
        })
        .then_with(|| a.cmp(b))
}
