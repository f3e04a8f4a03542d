use crate::cli_args::TreeArgs;
use crate::load_config_for_command;
use crate::output::write_to_stdout;
use anyhow::{Context, Result};
use xscope_core::TreeBuilder;
use xscope_core::structure::TREE_HEADER;

pub fn handle_tree_command(args: TreeArgs) -> Result<()> {
    let (project_root, config) = load_config_for_command(&args.project_config, Some(&args.tree))
        .context("Failed to load configuration for tree command")?;

    let tree = TreeBuilder::new(&project_root, &config)
        .render()
        .with_context(|| format!("Failed to render tree for {}", project_root.display()))?;

    write_to_stdout(&format!(
        "{}\n{}\n{}",
        TREE_HEADER,
        project_root.display(),
        tree
    ))
}
