use crate::cli_args::StructureArgs;
use crate::load_config_for_command;
use crate::output::print_data_or_text;
use anyhow::{Context, Result};
use colored::*;
use log;
use xscope_core::get_project_structure;

pub fn handle_structure_command(args: StructureArgs, quiet: bool) -> Result<()> {
    let (project_root, mut config) =
        load_config_for_command(&args.project_config, Some(&args.tree))
            .context("Failed to load configuration for structure command")?;

    if args.timestamp {
        config.output.include_timestamp = true;
    }

    let structure = get_project_structure(&project_root, &config)
        .with_context(|| format!("Failed to inspect {}", project_root.display()))?;
    log::debug!("Project structure gathered.");

    if !quiet
        && structure.tree.as_deref() == Some("")
        && config.ignore.missing_rules == xscope_core::MissingRulesPolicy::IgnoreAll
        && !project_root.join(&config.ignore.file_name).exists()
    {
        eprintln!(
            "{} No {} found, so every entry is treated as ignored. Pass {} to list files anyway.",
            "⚠️".yellow(),
            config.ignore.file_name.cyan(),
            "--include-all-without-rules".cyan()
        );
    }

    print_data_or_text(
        &structure,
        structure.render_text(),
        &args.format_output,
        &config.output,
        "ProjectStructure",
    )
}
