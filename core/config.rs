use crate::error::{AppError, Result};
use crate::ignore_rules::DEFAULT_IGNORE_FILE;
use crate::tech_stack::DEFAULT_MANIFEST_FILE;
use log;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_DIR: &str = ".xtools/xscope";
pub const DEFAULT_CONFIG_FILENAME: &str = "xscope.toml";

/// Directory names that are never rendered, whatever the ignore rules say.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["node_modules", ".git", "dist", "build"];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub ignore: IgnoreConfig,
    #[serde(default)]
    pub tree: TreeConfig,
    #[serde(default)]
    pub tech_stack: TechStackConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    #[serde(default)]
    pub project_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct IgnoreConfig {
    #[serde(default = "default_ignore_file")]
    pub file_name: String,
    #[serde(default)]
    pub missing_rules: MissingRulesPolicy,
}

/// What an empty rule set means for the tree.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingRulesPolicy {
    /// No rules hide every entry.
    #[default]
    IgnoreAll,
    /// No rules show every entry not structurally excluded.
    IncludeAll,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TreeConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_excluded_dirs")]
    pub exclude_dirs: Vec<String>,
    #[serde(default = "default_true")]
    pub exclude_hidden_dirs: bool,
    #[serde(default)]
    pub max_depth: Option<usize>,
    #[serde(default = "default_false")]
    pub parallel: bool,
    #[serde(default)]
    pub on_listing_error: ListingErrorPolicy,
}

/// How the tree reacts to a directory that cannot be listed.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ListingErrorPolicy {
    /// Render `[error reading directory: ...]` in place and keep going.
    #[default]
    Marker,
    /// Fail the whole tree.
    Abort,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TechStackConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_true")]
    pub json_minify: bool,
    #[serde(default = "default_false")]
    pub include_timestamp: bool,
}

fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_format() -> String {
    "text".to_string()
}
fn default_ignore_file() -> String {
    DEFAULT_IGNORE_FILE.to_string()
}
fn default_manifest_file() -> String {
    DEFAULT_MANIFEST_FILE.to_string()
}
fn default_excluded_dirs() -> Vec<String> {
    DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect()
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            file_name: default_ignore_file(),
            missing_rules: MissingRulesPolicy::default(),
        }
    }
}
impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            exclude_dirs: default_excluded_dirs(),
            exclude_hidden_dirs: default_true(),
            max_depth: None,
            parallel: default_false(),
            on_listing_error: ListingErrorPolicy::default(),
        }
    }
}
impl Default for TechStackConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            manifest_file: default_manifest_file(),
        }
    }
}
impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            json_minify: default_true(),
            include_timestamp: default_false(),
        }
    }
}

impl Config {
    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_project_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var("PROJECT_ROOT").ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        let canonical = path_to_resolve.canonicalize().map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to canonicalize project root '{}': {}",
                    path_to_resolve.display(),
                    e
                ),
            ))
        })?;

        if !canonical.is_dir() {
            return Err(AppError::InvalidArgument(format!(
                "Project root is not a directory: {}",
                canonical.display()
            )));
        }
        Ok(canonical)
    }

    pub fn resolve_config_path(
        project_root: &Path,
        cli_config_file: Option<&String>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        match cli_config_file {
            Some(p_str) => {
                let mut path = PathBuf::from(shellexpand::tilde(p_str).as_ref());
                if path.is_relative() {
                    path = project_root.join(path);
                }
                if !path.exists() && path.extension().is_none() {
                    path.set_extension("toml");
                }
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Specified config file not found at path: {}",
                        path.display()
                    )));
                }
                log::debug!("Using specified config file path: {}", path.display());
                Ok(Some(path))
            }
            None => {
                let default_path = Self::default_config_path(project_root);
                if default_path.exists() {
                    log::debug!("Using default config file path: {}", default_path.display());
                    Ok(Some(default_path))
                } else {
                    log::debug!(
                        "No config file specified and default not found at: {}",
                        default_path.display()
                    );
                    Ok(None)
                }
            }
        }
    }

    pub fn default_config_path(project_root: &Path) -> PathBuf {
        project_root
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILENAME)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&toml_content).map_err(|e| match e {
            AppError::TomlParse(msg) => AppError::TomlParse(format!(
                "Error parsing config file '{}': {}",
                config_path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(content).map_err(|e| {
            AppError::TomlParse(format!("{}. Check TOML syntax and structure.", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ignore.file_name.trim().is_empty() || self.ignore.file_name.contains('/') {
            return Err(AppError::Config(format!(
                "ignore.file_name must be a plain file name, got \"{}\"",
                self.ignore.file_name
            )));
        }
        if self.tech_stack.manifest_file.trim().is_empty() {
            return Err(AppError::Config(
                "tech_stack.manifest_file must not be empty".to_string(),
            ));
        }
        match self.output.format.as_str() {
            "text" | "json" | "yaml" | "yml" | "xml" => Ok(()),
            other => Err(AppError::Config(format!(
                "Unsupported output format \"{}\" (expected text, json, yaml or xml)",
                other
            ))),
        }
    }

    /// `.git` stays excluded even when the configured list drops it.
    pub fn is_structurally_excluded_dir(&self, name: &str) -> bool {
        name == ".git"
            || self.tree.exclude_dirs.iter().any(|d| d == name)
            || (self.tree.exclude_hidden_dirs && name.starts_with('.'))
    }

    pub fn get_effective_project_name(&self, project_root: &Path) -> String {
        self.general.project_name.clone().unwrap_or_else(|| {
            project_root
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "UnknownProject".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.ignore.file_name, ".gitignore");
        assert_eq!(config.ignore.missing_rules, MissingRulesPolicy::IgnoreAll);
        assert_eq!(config.tree.on_listing_error, ListingErrorPolicy::Marker);
        assert_eq!(config.tech_stack.manifest_file, "package.json");
    }

    #[test]
    fn parses_sections() {
        let config = Config::from_toml_str(
            r#"
            [ignore]
            missing_rules = "include_all"

            [tree]
            exclude_dirs = ["target"]
            exclude_hidden_dirs = false
            max_depth = 2
            parallel = true
            on_listing_error = "abort"

            [output]
            format = "yaml"
            "#,
        )
        .unwrap();
        assert_eq!(config.ignore.missing_rules, MissingRulesPolicy::IncludeAll);
        assert_eq!(config.tree.exclude_dirs, vec!["target"]);
        assert_eq!(config.tree.max_depth, Some(2));
        assert!(config.tree.parallel);
        assert_eq!(config.tree.on_listing_error, ListingErrorPolicy::Abort);
        assert_eq!(config.output.format, "yaml");
    }

    #[test]
    fn rejects_unknown_fields_and_bad_values() {
        assert!(matches!(
            Config::from_toml_str("[tree]\nbogus = 1\n"),
            Err(AppError::TomlParse(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[output]\nformat = \"html\"\n"),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[ignore]\nfile_name = \"a/b\"\n"),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let text = Config::default().to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), Config::default());
    }

    #[test]
    fn structural_exclusions() {
        let mut config = Config::default();
        for name in ["node_modules", ".git", "dist", "build", ".cache"] {
            assert!(config.is_structurally_excluded_dir(name), "{}", name);
        }
        assert!(!config.is_structurally_excluded_dir("src"));

        config.tree.exclude_dirs.clear();
        config.tree.exclude_hidden_dirs = false;
        assert!(config.is_structurally_excluded_dir(".git"));
        assert!(!config.is_structurally_excluded_dir(".github"));
        assert!(!config.is_structurally_excluded_dir("dist"));
    }

    #[test]
    fn resolves_default_config_file_when_present() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        assert_eq!(Config::resolve_config_path(root, None, false).unwrap(), None);

        let path = Config::default_config_path(root);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[tree]\nmax_depth = 1\n").unwrap();
        assert_eq!(
            Config::resolve_config_path(root, None, false).unwrap(),
            Some(path.clone())
        );
        assert_eq!(Config::resolve_config_path(root, None, true).unwrap(), None);
        assert_eq!(Config::load_from_path(&path).unwrap().tree.max_depth, Some(1));
    }

    #[test]
    fn explicit_config_file_gets_toml_extension() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("custom.toml"), "").unwrap();
        let resolved =
            Config::resolve_config_path(root, Some(&"custom".to_string()), false).unwrap();
        assert_eq!(resolved, Some(root.join("custom.toml")));
        assert!(Config::resolve_config_path(root, Some(&"missing".to_string()), false).is_err());
    }

    #[test]
    fn project_root_must_be_a_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, "").unwrap();
        assert!(matches!(
            Config::determine_project_root(Some(&file)),
            Err(AppError::InvalidArgument(_))
        ));
        let root = Config::determine_project_root(Some(&dir.path().to_path_buf())).unwrap();
        assert!(root.is_absolute());
    }

    #[test]
    fn project_name_falls_back_to_directory_name() {
        let config = Config::default();
        assert_eq!(
            config.get_effective_project_name(Path::new("/work/my-app")),
            "my-app"
        );
    }
}
