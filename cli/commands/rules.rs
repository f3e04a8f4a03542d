use crate::cli_args::RulesArgs;
use crate::load_config_for_command;
use crate::output::print_data_or_text;
use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use xscope_core::{IgnoreRule, parse_ignore_file};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RulesReport<'a> {
    ignore_file: &'a str,
    #[serde(rename = "rule")]
    rules: &'a [IgnoreRule],
}

pub fn handle_rules_command(args: RulesArgs, quiet: bool) -> Result<()> {
    let (project_root, config) = load_config_for_command(&args.project_config, None)
        .context("Failed to load configuration for rules command")?;

    let file_name = config.ignore.file_name.as_str();
    let rules = parse_ignore_file(&project_root, file_name);

    if rules.is_empty() && !quiet {
        eprintln!(
            "{} No rules loaded from {} in {}",
            "ℹ️".blue(),
            file_name.cyan(),
            project_root.display()
        );
    }

    let text = rules
        .iter()
        .enumerate()
        .map(|(index, rule)| {
            let mut flags = Vec::new();
            if rule.is_negated {
                flags.push("negated");
            }
            if rule.is_directory {
                flags.push("directory");
            }
            if rule.has_wildcard() {
                flags.push("wildcard");
            }
            format!(
                "{:>3}. {}{}",
                index + 1,
                rule.to_line().cyan(),
                if flags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", flags.join(", ")).dimmed().to_string()
                }
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    print_data_or_text(
        &RulesReport {
            ignore_file: file_name,
            rules: &rules,
        },
        text,
        &args.format_output,
        &config.output,
        "IgnoreRules",
    )
}
