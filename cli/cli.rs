mod cli_args;
mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use log;
use std::path::PathBuf;
use std::process;

use cli_args::{Cli, Commands, ProjectConfigOpts, TreeOpts};
use xscope_core::{AppError, Config, ListingErrorPolicy, MissingRulesPolicy};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = match e.downcast_ref::<AppError>() {
                Some(AppError::Config(_)) => 1,
                Some(AppError::TomlParse(_)) => 1,
                Some(AppError::TomlSerialize(_)) => 1,
                Some(AppError::Io(_)) => 2,
                Some(AppError::FileRead { .. }) => 2,
                Some(AppError::FileWrite { .. }) => 2,
                Some(AppError::DirectoryRead { .. }) => 2,
                Some(AppError::InvalidArgument(_)) => 5,
                Some(AppError::JsonSerialize(_)) => 6,
                Some(AppError::YamlError(_)) => 6,
                Some(AppError::XmlSerialize(_)) => 6,
                Some(_) => 1,
                None => 1,
            };

            if !quiet || exit_code == 1 || exit_code == 5 {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Application failed: {:#}", e);
            }

            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool) -> Result<()> {
    match cli.command {
        None => {
            Cli::command().print_help()?;
        }
        Some(command) => match command {
            Commands::Structure(args) => {
                log::debug!("Executing 'structure' command...");
                commands::structure::handle_structure_command(args, quiet)?;
            }
            Commands::Tree(args) => {
                log::debug!("Executing 'tree' command...");
                commands::tree::handle_tree_command(args)?;
            }
            Commands::Stack(args) => {
                log::debug!("Executing 'stack' command...");
                commands::stack::handle_stack_command(args)?;
            }
            Commands::Check(args) => {
                log::debug!("Executing 'check' command...");
                commands::check::handle_check_command(args)?;
            }
            Commands::Rules(args) => {
                log::debug!("Executing 'rules' command...");
                commands::rules::handle_rules_command(args, quiet)?;
            }
            Commands::Config(args) => {
                log::debug!("Executing 'config' command...");
                commands::config::handle_config_command(&args, quiet)?;
            }
            Commands::Completion(args) => {
                log::debug!("Executing 'completion' command...");
                commands::completion::handle_completion_command(&args, quiet)?;
            }
        },
    }
    Ok(())
}

/// Resolves the project root and loads its config, applying the shared
/// project and tree flags on top.
pub fn load_config_for_command(
    project_opts: &ProjectConfigOpts,
    tree_opts: Option<&TreeOpts>,
) -> Result<(PathBuf, Config)> {
    let project_root = Config::determine_project_root(project_opts.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config_path = Config::resolve_config_path(
        &project_root,
        project_opts.config_file.as_ref(),
        project_opts.disable_config_file,
    )
    .context("Failed to resolve configuration path")?;

    let mut config = match &config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(name) = &project_opts.ignore_file {
        config.ignore.file_name = name.clone();
    }
    if project_opts.include_all_without_rules {
        config.ignore.missing_rules = MissingRulesPolicy::IncludeAll;
    }

    if let Some(tree) = tree_opts {
        if tree.max_depth.is_some() {
            config.tree.max_depth = tree.max_depth;
        }
        if tree.parallel {
            config.tree.parallel = true;
        }
        if tree.show_hidden_dirs {
            config.tree.exclude_hidden_dirs = false;
        }
        if tree.abort_on_error {
            config.tree.on_listing_error = ListingErrorPolicy::Abort;
        }
    }

    config.validate().context("Invalid configuration after CLI overrides")?;
    log::trace!("Effective config: {:?}", config);
    Ok((project_root, config))
}
