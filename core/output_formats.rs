use crate::error::{AppError, Result};
#[cfg(feature = "serde_support")]
use serde::Serialize;

/// Output formats accepted by the `format` config key and `--format` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
    Xml,
}

impl OutputFormat {
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "xml" => Ok(OutputFormat::Xml),
            other => Err(AppError::InvalidArgument(format!(
                "Unsupported output format \"{}\"",
                other
            ))),
        }
    }
}

#[cfg(feature = "serde_support")]
pub fn serialize_to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value).map_err(AppError::JsonSerialize)
    } else {
        serde_json::to_string(value).map_err(AppError::JsonSerialize)
    }
}

#[cfg(feature = "serde_support")]
pub fn serialize_to_yaml<T: Serialize>(value: &T) -> Result<String> {
    serde_yml::to_string(value).map_err(AppError::YamlError)
}

#[cfg(feature = "serde_support")]
pub fn serialize_to_xml<T: Serialize>(value: &T, root_name: &str) -> Result<String> {
    Ok(quick_xml::se::to_string_with_root(root_name, value)?)
}
