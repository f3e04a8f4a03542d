use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectConfigOpts {
    #[arg(
        long,
        help = "Specify the target project directory (default: $PROJECT_ROOT or current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long,
        help = "Specify path/filename of the TOML config file (default: .xtools/xscope/xscope.toml).",
        value_name = "CONFIG_FILE",
        conflicts_with = "disable_config_file",
        help_heading = "Project Setup"
    )]
    pub config_file: Option<String>,

    #[arg(
        long,
        help = "Disable loading any TOML config file.",
        conflicts_with = "config_file",
        help_heading = "Project Setup"
    )]
    pub disable_config_file: bool,

    #[arg(
        long,
        help = "Read ignore rules from this file name at the project root [default: .gitignore].",
        value_name = "FILE_NAME",
        help_heading = "Ignore Rules"
    )]
    pub ignore_file: Option<String>,

    #[arg(
        long,
        help = "Show every entry when no ignore rules exist (default hides everything).",
        help_heading = "Ignore Rules"
    )]
    pub include_all_without_rules: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FormatOutputOpts {
    #[arg(short = 'f', long, help = "Set the output format.", value_name = "FORMAT", value_parser = ["text", "json", "yaml", "xml"], help_heading = "Output Formatting")]
    pub format: Option<String>,

    #[arg(
        long,
        help = "Pretty-print JSON output (compact by default).",
        help_heading = "Output Formatting"
    )]
    pub pretty: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct TreeOpts {
    #[arg(
        long,
        value_name = "N",
        help = "Only expand N directory levels below the root.",
        help_heading = "Tree"
    )]
    pub max_depth: Option<usize>,

    #[arg(
        long,
        help = "Render sibling subtrees in parallel.",
        help_heading = "Tree"
    )]
    pub parallel: bool,

    #[arg(
        long,
        help = "Show dot-prefixed directories (.git stays hidden).",
        help_heading = "Tree"
    )]
    pub show_hidden_dirs: bool,

    #[arg(
        long,
        help = "Fail instead of rendering an error marker when a directory cannot be read.",
        help_heading = "Tree"
    )]
    pub abort_on_error: bool,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Inspect a project's file tree and tech stack for AI agents.",
    long_about = "xscope walks a project directory, filters it through the root ignore file and \nbuilt-in exclusions, and renders an ASCII tree together with the technologies \ninferred from marker files and package.json dependencies.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  xscope structure --project-root ~/code/web\n  xscope tree --max-depth 2\n  xscope stack -f json\n  xscope check src/generated dist/app.js",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv, -vvv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "s",
        about = "Show the project tree and the inferred tech stack."
    )]
    Structure(StructureArgs),

    #[command(visible_alias = "t", about = "Show only the filtered project tree.")]
    Tree(TreeArgs),

    #[command(
        visible_alias = "k",
        about = "Show the inferred tech stack and where each entry came from."
    )]
    Stack(StackArgs),

    #[command(
        visible_alias = "c",
        about = "Report whether paths are ignored and which rule decided it."
    )]
    Check(CheckArgs),

    #[command(about = "List the parsed rules of the project's ignore file.")]
    Rules(RulesArgs),

    #[command(about = "Show or save the default configuration file structure.")]
    Config(ConfigArgs),

    #[command(about = "Generate or save shell completion scripts.")]
    Completion(CompletionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct StructureArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub format_output: FormatOutputOpts,
    #[clap(flatten)]
    pub tree: TreeOpts,

    #[arg(
        long,
        help = "Include a generation timestamp in structured output.",
        help_heading = "Output Formatting"
    )]
    pub timestamp: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TreeArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub tree: TreeOpts,
}

#[derive(Args, Debug, Clone)]
pub struct StackArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub format_output: FormatOutputOpts,

    #[arg(
        long,
        value_name = "FILE_NAME",
        help = "Manifest to read dependencies from [default: package.json]."
    )]
    pub manifest: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub format_output: FormatOutputOpts,
    #[arg(
        required = true,
        help = "Paths to test, relative to the project root or absolute."
    )]
    pub paths: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RulesArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub format_output: FormatOutputOpts,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    #[arg(
        long,
        value_name = "SHELL",
        help = "Shell to generate completions for (fish, bash, zsh) [default: fish]"
    )]
    pub shell: Option<String>,
    #[arg(
        long,
        help = "Save completion script to default location (prompts overwrite)."
    )]
    pub save: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[arg(
        long,
        help = "Save default config structure to default path (prompts overwrite)."
    )]
    pub save: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_structure_with_flags() {
        let cli = Cli::try_parse_from([
            "xscope",
            "-vv",
            "s",
            "--project-root",
            "/tmp/app",
            "-f",
            "json",
            "--max-depth",
            "3",
            "--include-all-without-rules",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Structure(args)) => {
                assert_eq!(args.format_output.format.as_deref(), Some("json"));
                assert_eq!(args.tree.max_depth, Some(3));
                assert!(args.project_config.include_all_without_rules);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn check_requires_paths() {
        assert!(Cli::try_parse_from(["xscope", "check"]).is_err());
        assert!(Cli::try_parse_from(["xscope", "check", "src"]).is_ok());
    }
}
