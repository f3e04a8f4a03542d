use indexmap::IndexMap;
use log;
use serde_json::Value;
#[cfg(feature = "serde_support")]
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;

pub mod tables;

pub const DEFAULT_MANIFEST_FILE: &str = "package.json";

const TYPESCRIPT: &str = "TypeScript";
const JAVASCRIPT: &str = "JavaScript";
const NODE_JS: &str = "Node.js";

/// Where a technology in the stack was first inferred from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[cfg_attr(
    feature = "serde_support",
    serde(rename_all = "camelCase", tag = "kind", content = "from")
)]
pub enum TechSource {
    MarkerFile(String),
    DefaultLanguage,
    Dependency(String),
    Organization(String),
    ScopeInference(String),
    Runtime,
}

impl fmt::Display for TechSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TechSource::MarkerFile(file) => write!(f, "marker file {}", file),
            TechSource::DefaultLanguage => write!(f, "default language"),
            TechSource::Dependency(dep) => write!(f, "dependency {}", dep),
            TechSource::Organization(org) => write!(f, "scope @{}", org),
            TechSource::ScopeInference(org) => write!(f, "multiple @{} packages", org),
            TechSource::Runtime => write!(f, "runtime heuristic"),
        }
    }
}

/// Insertion-ordered, duplicate-free list of technology names.
///
/// The first source that contributes a name is the one kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TechStack {
    entries: IndexMap<String, TechSource>,
}

impl TechStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the name was already present.
    pub fn insert(&mut self, name: impl Into<String>, source: TechSource) -> bool {
        let name = name.into();
        if self.entries.contains_key(&name) {
            log::trace!("Tech '{}' already present, ignoring {}", name, source);
            return false;
        }
        log::trace!("Detected tech '{}' from {}", name, source);
        self.entries.insert(name, source);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TechSource)> {
        self.entries.iter().map(|(name, source)| (name.as_str(), source))
    }

    pub fn source_of(&self, name: &str) -> Option<&TechSource> {
        self.entries.get(name)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn join(&self, separator: &str) -> String {
        self.names().collect::<Vec<_>>().join(separator)
    }
}

/// Serialized as an ordered list of `{ name, source }` records.
#[cfg(feature = "serde_support")]
impl Serialize for TechStack {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Entry<'a> {
            name: &'a str,
            source: &'a TechSource,
        }
        serializer.collect_seq(self.iter().map(|(name, source)| Entry { name, source }))
    }
}

/// Dependency map of a manifest section; keys keep declaration order.
type DependencyMap = serde_json::Map<String, Value>;

#[derive(Debug, Clone)]
pub struct TechStackDetector {
    manifest_file: String,
}

impl Default for TechStackDetector {
    fn default() -> Self {
        Self {
            manifest_file: DEFAULT_MANIFEST_FILE.to_string(),
        }
    }
}

impl TechStackDetector {
    pub fn new(manifest_file: &str) -> Self {
        Self {
            manifest_file: manifest_file.to_string(),
        }
    }

    pub fn detect(&self, project_root: &Path) -> TechStack {
        log::debug!("Detecting tech stack in: {}", project_root.display());
        let mut stack = TechStack::new();

        detect_marker_files(project_root, &mut stack);

        if !stack.contains(TYPESCRIPT) && !stack.contains(JAVASCRIPT) {
            stack.insert(JAVASCRIPT, TechSource::DefaultLanguage);
        }

        let manifest_path = project_root.join(&self.manifest_file);
        if manifest_path.exists() {
            match load_manifest(&manifest_path) {
                Ok(manifest) => detect_from_manifest(&manifest, &mut stack),
                Err(reason) => {
                    log::warn!(
                        "Error parsing {}: {}. Keeping {} technologies detected so far.",
                        manifest_path.display(),
                        reason,
                        stack.len()
                    );
                }
            }
        } else {
            log::debug!("No manifest at {}", manifest_path.display());
        }

        log::debug!("Detected tech stack: {}", stack.join(", "));
        stack
    }
}

pub fn detect_tech_stack(project_root: &Path) -> TechStack {
    TechStackDetector::default().detect(project_root)
}

fn detect_marker_files(project_root: &Path, stack: &mut TechStack) {
    for (file, tech) in tables::CONFIG_FILE_CHECKS {
        if project_root.join(file).exists() {
            stack.insert(*tech, TechSource::MarkerFile((*file).to_string()));
        }
    }
}

fn load_manifest(path: &Path) -> std::result::Result<Value, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("read failed: {}", e))?;
    serde_json::from_str::<Value>(&content).map_err(|e| format!("invalid JSON: {}", e))
}

/// A manifest section that is not an object is treated as absent.
fn manifest_section<'a>(manifest: &'a Value, key: &str) -> Option<&'a DependencyMap> {
    manifest.get(key).and_then(Value::as_object)
}

fn detect_from_manifest(manifest: &Value, stack: &mut TechStack) {
    let empty = DependencyMap::new();
    let dependencies = manifest_section(manifest, "dependencies").unwrap_or(&empty);
    log::trace!("Manifest declares {} runtime dependencies", dependencies.len());

    for dep in dependencies.keys() {
        if let Some(tech) = tables::tech_for_dependency(dep) {
            stack.insert(tech, TechSource::Dependency(dep.clone()));
            continue;
        }

        let Some(org) = organization_of(dep) else {
            continue;
        };

        // An already-present mapped technology falls through to scope inference.
        if let Some(tech) = tables::tech_for_organization(org) {
            if stack.insert(tech, TechSource::Organization(org.to_string())) {
                continue;
            }
        }

        let inferred = capitalize_first_letter(org);
        if stack.contains(&inferred) {
            continue;
        }
        let scope_prefix = format!("@{}/", org);
        let scoped_count = dependencies
            .keys()
            .filter(|name| name.starts_with(&scope_prefix))
            .count();
        if scoped_count > 1 {
            stack.insert(inferred, TechSource::ScopeInference(org.to_string()));
        }
    }

    if uses_node_runtime(manifest, dependencies, stack) {
        stack.insert(NODE_JS, TechSource::Runtime);
    }
}

// Kept as shipped: the Bun/Deno clauses make this true unless both are present.
fn uses_node_runtime(manifest: &Value, dependencies: &DependencyMap, stack: &TechStack) -> bool {
    let engines_node = manifest
        .get("engines")
        .and_then(|engines| engines.get("node"))
        .is_some_and(is_truthy);
    let dev_types_node = manifest_section(manifest, "devDependencies")
        .and_then(|deps| deps.get("@types/node"))
        .is_some_and(is_truthy);
    let types_node = dependencies.get("@types/node").is_some_and(is_truthy);

    engines_node || dev_types_node || types_node || !stack.contains("Bun") || !stack.contains("Deno")
}

/// `@org/pkg` and `@org` give `org`; unscoped names give `None`.
fn organization_of(dep: &str) -> Option<&str> {
    let scoped = dep.strip_prefix('@')?;
    let org = scoped.split('/').next().unwrap_or(scoped);
    if org.is_empty() { None } else { Some(org) }
}

fn capitalize_first_letter(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(root: &Path, name: &str, content: &str) {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn empty_project_defaults_to_javascript() {
        let dir = tempdir().unwrap();
        let stack = detect_tech_stack(dir.path());
        assert_eq!(stack.to_vec(), vec!["JavaScript"]);
        assert_eq!(stack.source_of("JavaScript"), Some(&TechSource::DefaultLanguage));
    }

    #[test]
    fn typescript_marker_suppresses_default_language() {
        let dir = tempdir().unwrap();
        write(dir.path(), "tsconfig.json", "{}");
        write(dir.path(), "vite.config.ts", "");
        let stack = detect_tech_stack(dir.path());
        assert_eq!(stack.to_vec(), vec!["TypeScript", "Vite"]);
    }

    #[test]
    fn marker_duplicates_are_suppressed() {
        let dir = tempdir().unwrap();
        write(dir.path(), "vite.config.ts", "");
        write(dir.path(), "vite.config.js", "");
        let stack = detect_tech_stack(dir.path());
        assert_eq!(stack.to_vec(), vec!["Vite", "JavaScript"]);
        assert_eq!(
            stack.source_of("Vite"),
            Some(&TechSource::MarkerFile("vite.config.ts".to_string()))
        );
    }

    #[test]
    fn typescript_and_react_with_node_runtime() {
        let dir = tempdir().unwrap();
        write(dir.path(), "tsconfig.json", "{}");
        write(
            dir.path(),
            "package.json",
            r#"{"dependencies": {"react": "18.0.0"}}"#,
        );
        let stack = detect_tech_stack(dir.path());
        assert_eq!(stack.to_vec(), vec!["TypeScript", "React", "Node.js"]);
    }

    #[test]
    fn dependencies_follow_declaration_order() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"dependencies": {"zod": "3", "express": "4", "react": "18", "react-dom": "18"}}"#,
        );
        let stack = detect_tech_stack(dir.path());
        assert_eq!(
            stack.to_vec(),
            vec!["JavaScript", "Zod", "Express", "React", "Node.js"]
        );
    }

    #[test]
    fn exact_dependency_beats_scope_table() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"dependencies": {"@reduxjs/toolkit": "2"}}"#,
        );
        let stack = detect_tech_stack(dir.path());
        assert!(stack.contains("Redux Toolkit"));
    }

    #[test]
    fn known_scope_maps_through_organization_table() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"dependencies": {"@angular/core": "17", "@angular/common": "17"}}"#,
        );
        let stack = detect_tech_stack(dir.path());
        assert_eq!(stack.to_vec(), vec!["JavaScript", "Angular", "Node.js"]);
    }

    #[test]
    fn unknown_scope_needs_more_than_one_package() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"dependencies": {"@acme/ui": "1", "@acme/api": "1", "@solo/thing": "1"}}"#,
        );
        let stack = detect_tech_stack(dir.path());
        assert_eq!(stack.to_vec(), vec!["JavaScript", "Acme", "Node.js"]);
        assert_eq!(
            stack.source_of("Acme"),
            Some(&TechSource::ScopeInference("acme".to_string()))
        );
    }

    #[test]
    fn dev_dependencies_do_not_count_for_scopes() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"dependencies": {"@acme/ui": "1"}, "devDependencies": {"@acme/test": "1"}}"#,
        );
        let stack = detect_tech_stack(dir.path());
        assert!(!stack.contains("Acme"));
    }

    #[test]
    fn node_runtime_is_skipped_only_with_bun_and_deno() {
        let dir = tempdir().unwrap();
        write(dir.path(), "bun.lockb", "");
        write(dir.path(), "deno.json", "{}");
        write(dir.path(), "package.json", r#"{"dependencies": {}}"#);
        let stack = detect_tech_stack(dir.path());
        assert!(!stack.contains("Node.js"));

        write(
            dir.path(),
            "package.json",
            r#"{"engines": {"node": ">=20"}}"#,
        );
        assert!(detect_tech_stack(dir.path()).contains("Node.js"));
    }

    #[test]
    fn node_runtime_needs_a_manifest() {
        let dir = tempdir().unwrap();
        write(dir.path(), "tsconfig.json", "{}");
        assert!(!detect_tech_stack(dir.path()).contains("Node.js"));
    }

    #[test]
    fn null_sections_are_treated_as_absent() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"dependencies": null, "devDependencies": null, "engines": null}"#,
        );
        let stack = detect_tech_stack(dir.path());
        assert_eq!(stack.to_vec(), vec!["JavaScript", "Node.js"]);
    }

    #[test]
    fn mapped_scope_already_present_falls_back_to_scope_name() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"dependencies": {"@mui/material": "5", "@mui/icons-material": "5"}}"#,
        );
        let stack = detect_tech_stack(dir.path());
        assert_eq!(
            stack.to_vec(),
            vec!["JavaScript", "Material UI", "Mui", "Node.js"]
        );
        assert_eq!(
            stack.source_of("Mui"),
            Some(&TechSource::ScopeInference("mui".to_string()))
        );
    }

    #[test]
    fn oddly_shaped_sections_do_not_discard_the_manifest() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"engines": ">=18", "dependencies": {"react": "18"}}"#,
        );
        assert_eq!(
            detect_tech_stack(dir.path()).to_vec(),
            vec!["JavaScript", "React", "Node.js"]
        );

        write(
            dir.path(),
            "package.json",
            r#"{"dependencies": [], "devDependencies": {"vue": "3"}}"#,
        );
        assert_eq!(
            detect_tech_stack(dir.path()).to_vec(),
            vec!["JavaScript", "Node.js"]
        );
    }

    #[test]
    fn malformed_manifest_keeps_partial_result() {
        let dir = tempdir().unwrap();
        write(dir.path(), "tsconfig.json", "{}");
        write(dir.path(), "yarn.lock", "");
        write(dir.path(), "package.json", "{ not json");
        let stack = detect_tech_stack(dir.path());
        assert_eq!(stack.to_vec(), vec!["TypeScript", "Yarn"]);
    }

    #[test]
    fn custom_manifest_file_name() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "manifest.json",
            r#"{"dependencies": {"vue": "3"}}"#,
        );
        let stack = TechStackDetector::new("manifest.json").detect(dir.path());
        assert!(stack.contains("Vue"));
        assert!(!detect_tech_stack(dir.path()).contains("Vue"));
    }

    #[test]
    fn detection_is_idempotent() {
        let dir = tempdir().unwrap();
        write(dir.path(), "next.config.js", "");
        write(
            dir.path(),
            "package.json",
            r#"{"dependencies": {"next": "14", "@mui/material": "5", "pg": "8"}}"#,
        );
        let first = detect_tech_stack(dir.path());
        let second = detect_tech_stack(dir.path());
        assert_eq!(first, second);
        assert_eq!(first.join(", "), second.join(", "));
    }

    #[test]
    fn organization_parsing() {
        assert_eq!(organization_of("@acme/ui"), Some("acme"));
        assert_eq!(organization_of("@acme"), Some("acme"));
        assert_eq!(organization_of("@/ui"), None);
        assert_eq!(organization_of("react"), None);
        assert_eq!(capitalize_first_letter("acme"), "Acme");
        assert_eq!(capitalize_first_letter(""), "");
    }
}
