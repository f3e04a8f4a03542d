use crate::config::Config;
use crate::error::Result;
use crate::tech_stack::{TechStack, TechStackDetector};
use crate::tree::TreeBuilder;
#[cfg(feature = "serde_support")]
use chrono::{DateTime, Utc};
use log;
#[cfg(feature = "serde_support")]
use serde::Serialize;
use std::path::Path;

pub const TREE_HEADER: &str = "Project Structure:";
pub const TECH_STACK_HEADER: &str = "Tech Stack:";

/// Everything one inspection of a project root produces.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "camelCase"))]
pub struct ProjectStructure {
    pub project_name: String,
    pub project_root: String,
    #[cfg_attr(
        feature = "serde_support",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub tree: Option<String>,
    #[cfg_attr(
        feature = "serde_support",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub tech_stack: Option<TechStack>,
    #[cfg(feature = "serde_support")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_timestamp: Option<DateTime<Utc>>,
}

impl ProjectStructure {
    /// `Project Structure:`, the root path, then the tree lines.
    pub fn render_tree_block(&self) -> String {
        format!(
            "{}\n{}\n{}",
            TREE_HEADER,
            self.project_root,
            self.tree.as_deref().unwrap_or_default()
        )
    }

    /// `Tech Stack:` followed by the comma-joined names.
    pub fn render_tech_stack_block(&self) -> String {
        let names = self
            .tech_stack
            .as_ref()
            .map(|stack| stack.join(", "))
            .unwrap_or_default();
        format!("{}\n{}", TECH_STACK_HEADER, names)
    }

    /// Both enabled blocks, separated by a blank line.
    pub fn render_text(&self) -> String {
        let mut blocks = Vec::new();
        if self.tree.is_some() {
            blocks.push(self.render_tree_block());
        }
        if self.tech_stack.is_some() {
            blocks.push(self.render_tech_stack_block());
        }
        blocks.join("\n")
    }
}

/// Walks `project_root` and infers its tech stack.
///
/// Sections disabled in `config` are left as `None`.
pub fn get_project_structure(project_root: &Path, config: &Config) -> Result<ProjectStructure> {
    log::info!("Inspecting project: {}", project_root.display());

    let tree = if config.tree.enabled {
        Some(TreeBuilder::new(project_root, config).render()?)
    } else {
        log::debug!("Tree section disabled.");
        None
    };

    let tech_stack = if config.tech_stack.enabled {
        Some(TechStackDetector::new(&config.tech_stack.manifest_file).detect(project_root))
    } else {
        log::debug!("Tech stack section disabled.");
        None
    };

    Ok(ProjectStructure {
        project_name: config.get_effective_project_name(project_root),
        project_root: project_root.to_string_lossy().to_string(),
        tree,
        tech_stack,
        #[cfg(feature = "serde_support")]
        generation_timestamp: if config.output.include_timestamp {
            Some(Utc::now())
        } else {
            None
        },
    })
}
