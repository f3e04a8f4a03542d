use anyhow::{Context, Result};
use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use xscope_core::config::OutputConfig;
use xscope_core::{AppError, OutputFormat, TechStack, output_formats};

use crate::cli_args::FormatOutputOpts;

/// Flags win over the `[output]` config section.
pub fn resolve_format(
    format_opts: &FormatOutputOpts,
    output_config: &OutputConfig,
) -> Result<(OutputFormat, bool)> {
    let format_name = format_opts
        .format
        .as_deref()
        .unwrap_or(&output_config.format);
    let pretty = format_opts.pretty || !output_config.json_minify;
    Ok((OutputFormat::parse(format_name)?, pretty))
}

/// Writes `plain_text` for the text format, otherwise serializes `data`.
pub fn print_data_or_text<T: Serialize>(
    data: &T,
    plain_text: String,
    format_opts: &FormatOutputOpts,
    output_config: &OutputConfig,
    root_name: &str,
) -> Result<()> {
    let (format, pretty) = resolve_format(format_opts, output_config)?;
    let content = match format {
        OutputFormat::Text => plain_text,
        OutputFormat::Json => output_formats::serialize_to_json(data, pretty)?,
        OutputFormat::Yaml => output_formats::serialize_to_yaml(data)?,
        OutputFormat::Xml => output_formats::serialize_to_xml(data, root_name)?,
    };
    write_to_stdout(&content)
}

pub fn write_to_file(path: &Path, content: &str) -> Result<()> {
    let file_write_error = |source: io::Error| AppError::FileWrite {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| AppError::FileWrite {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let mut file = File::create(path).map_err(file_write_error)?;
    file.write_all(content.as_bytes()).map_err(file_write_error)?;
    Ok(())
}

pub fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

pub fn print_tech_stack_table(stack: &TechStack) -> Result<()> {
    println!();
    println!("{}", " Tech Stack ".green().bold().underline());

    if stack.is_empty() {
        println!("\n{}", "(No technologies detected)".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::Green),
        Cell::new("Technology").fg(Color::Green),
        Cell::new("Detected From").fg(Color::Green),
    ]);
    for (index, (name, source)) in stack.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1).set_alignment(comfy_table::CellAlignment::Right),
            Cell::new(name).fg(Color::Cyan),
            Cell::new(source.to_string()).fg(Color::DarkGrey),
        ]);
    }
    println!("{table}");
    println!();
    Ok(())
}

/// Asks before replacing `path`. Quiet mode never overwrites.
pub fn confirm_overwrite(path: &Path, what: &str, quiet: bool) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    if quiet {
        anyhow::bail!(
            "Target file '{}' exists. Overwrite prevented in quiet mode.",
            path.display()
        );
    }
    print!(
        "{} {} already exists at '{}'. Overwrite? [{}/{}] ",
        "⚠️".yellow(),
        what,
        path.display().to_string().cyan(),
        "y".green(),
        "N".red()
    );
    io::stdout().flush().context("Failed to flush stdout")?;
    let mut response = String::new();
    io::stdin()
        .read_line(&mut response)
        .context("Failed to read user input")?;
    if response.trim().eq_ignore_ascii_case("y") {
        Ok(true)
    } else {
        println!("Save cancelled.");
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn flags_override_output_config() {
        let mut output = OutputConfig::default();
        output.format = "yaml".to_string();
        output.json_minify = false;

        let (format, pretty) = resolve_format(&FormatOutputOpts::default(), &output).unwrap();
        assert_eq!(format, OutputFormat::Yaml);
        assert!(pretty);

        let opts = FormatOutputOpts {
            format: Some("json".to_string()),
            pretty: false,
        };
        let (format, _) = resolve_format(&opts, &output).unwrap();
        assert_eq!(format, OutputFormat::Json);

        let (format, pretty) =
            resolve_format(&FormatOutputOpts::default(), &OutputConfig::default()).unwrap();
        assert_eq!(format, OutputFormat::Text);
        assert!(!pretty);
    }

    #[test]
    fn write_failure_reports_file_write_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let err = write_to_file(&blocker.join("out.toml"), "x").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::FileWrite { .. })
        ));

        let target = dir.path().join("nested/out.toml");
        write_to_file(&target, "x = 1\n").unwrap();
        assert_eq!(fs::read_to_string(target).unwrap(), "x = 1\n");
    }
}
