pub mod config;
pub mod error;
pub mod ignore_rules;
pub mod matcher;
pub mod output_formats;
pub mod structure;
pub mod tech_stack;
pub mod tree;

pub use config::{Config, ListingErrorPolicy, MissingRulesPolicy};
pub use error::{AppError, Result};
pub use ignore_rules::{IgnoreRule, parse_ignore_file, parse_ignore_rules};
pub use matcher::{RuleSet, Verdict, VerdictReason, is_ignored};
pub use output_formats::OutputFormat;
pub use structure::{ProjectStructure, get_project_structure};
pub use tech_stack::{TechSource, TechStack, TechStackDetector, detect_tech_stack};
pub use tree::{TreeBuilder, render_tree};
