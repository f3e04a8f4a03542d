use crate::cli_args::CheckArgs;
use crate::load_config_for_command;
use crate::output::print_data_or_text;
use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use xscope_core::{MissingRulesPolicy, RuleSet, Verdict, VerdictReason, parse_ignore_file};

#[derive(Serialize)]
struct CheckReport<'a> {
    #[serde(rename = "verdict")]
    verdicts: &'a [Verdict],
}

pub fn handle_check_command(args: CheckArgs) -> Result<()> {
    let (project_root, config) = load_config_for_command(&args.project_config, None)
        .context("Failed to load configuration for check command")?;

    let rules = RuleSet::new(parse_ignore_file(&project_root, &config.ignore.file_name))
        .with_ignore_file_name(&config.ignore.file_name);
    log::debug!(
        "Checking {} path(s) against {} rule(s)",
        args.paths.len(),
        rules.len()
    );

    let verdicts: Vec<Verdict> = args
        .paths
        .iter()
        .map(|path| {
            let absolute = if path.is_absolute() {
                path.clone()
            } else {
                project_root.join(path)
            };
            let mut verdict = rules.explain(&absolute, &project_root);
            if verdict.reason == VerdictReason::NoRules
                && config.ignore.missing_rules == MissingRulesPolicy::IncludeAll
            {
                verdict.ignored = false;
            }
            verdict
        })
        .collect();

    let text = verdicts
        .iter()
        .map(describe_verdict)
        .collect::<Vec<_>>()
        .join("\n");

    print_data_or_text(
        &CheckReport {
            verdicts: &verdicts,
        },
        text,
        &args.format_output,
        &config.output,
        "CheckReport",
    )
}

fn describe_verdict(verdict: &Verdict) -> String {
    let status = if verdict.ignored {
        "ignored".red().bold()
    } else {
        "kept".green().bold()
    };
    let reason = match &verdict.reason {
        VerdictReason::NoRules => "no ignore rules loaded".to_string(),
        VerdictReason::IgnoreFile => "the ignore file is always shown".to_string(),
        VerdictReason::Unmatched => "no rule matched".to_string(),
        VerdictReason::Rule { index, line } => format!("rule #{} '{}'", index + 1, line),
    };
    format!(
        "{} {} ({})",
        status,
        verdict.relative_path.cyan(),
        reason.dimmed()
    )
}
