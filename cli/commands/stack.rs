use crate::cli_args::StackArgs;
use crate::load_config_for_command;
use crate::output::{print_data_or_text, print_tech_stack_table};
use anyhow::{Context, Result};
use log;
use xscope_core::TechStackDetector;
use xscope_core::structure::TECH_STACK_HEADER;

pub fn handle_stack_command(args: StackArgs) -> Result<()> {
    let (project_root, config) = load_config_for_command(&args.project_config, None)
        .context("Failed to load configuration for stack command")?;

    let manifest = args
        .manifest
        .as_deref()
        .unwrap_or(&config.tech_stack.manifest_file);
    log::debug!("Using manifest file name: {}", manifest);

    let stack = TechStackDetector::new(manifest).detect(&project_root);

    // The table stands in for plain text unless a format was asked for.
    if args.format_output.format.is_none() && config.output.format == "text" {
        return print_tech_stack_table(&stack);
    }
    let text = format!("{}\n{}", TECH_STACK_HEADER, stack.join(", "));
    print_data_or_text(
        &stack,
        text,
        &args.format_output,
        &config.output,
        "TechStack",
    )
}
