//! Config and change-file parsing (YAML/JSON/JSONC).

use crate::config::error::ConfigError;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Config file type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFileType {
    Yaml,
    Json,
    Jsonc,
    Unknown,
}

/// Get config file type from path extension
pub fn get_file_type(path: &str) -> ConfigFileType {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "yaml" | "yml" => ConfigFileType::Yaml,
        "json" => ConfigFileType::Json,
        "jsonc" => ConfigFileType::Jsonc,
        _ => ConfigFileType::Unknown,
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Scan {
    Code,
    Str { escaped: bool },
    LineComment,
    BlockComment,
}

/// Strip `//` and `/* */` comments from JSONC content, leaving string literals intact.
pub fn strip_json_comments(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    let mut state = Scan::Code;

    while let Some(c) = chars.next() {
        state = match state {
            Scan::Code => match (c, chars.peek()) {
                ('/', Some('/')) => {
                    chars.next();
                    Scan::LineComment
                }
                ('/', Some('*')) => {
                    chars.next();
                    Scan::BlockComment
                }
                ('"', _) => {
                    out.push(c);
                    Scan::Str { escaped: false }
                }
                _ => {
                    out.push(c);
                    Scan::Code
                }
            },
            Scan::Str { escaped } => {
                out.push(c);
                match c {
                    '"' if !escaped => Scan::Code,
                    '\\' => Scan::Str { escaped: !escaped },
                    _ => Scan::Str { escaped: false },
                }
            }
            Scan::LineComment => {
                if c == '\n' || c == '\r' {
                    out.push(c);
                    Scan::Code
                } else {
                    Scan::LineComment
                }
            }
            Scan::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    Scan::Code
                } else {
                    Scan::BlockComment
                }
            }
        };
    }

    out
}

/// Parse JSON content
pub fn parse_json<T: DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    serde_json::from_str(content).map_err(ConfigError::from)
}

/// Parse JSONC content (JSON with comments)
pub fn parse_jsonc<T: DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    parse_json(&strip_json_comments(content))
}

/// Parse YAML content
pub fn parse_yaml<T: DeserializeOwned>(content: &str) -> Result<T, ConfigError> {
    serde_yaml::from_str(content).map_err(ConfigError::from)
}

/// Parse config content based on file type
pub fn parse_config<T: DeserializeOwned>(content: &str, path: &str) -> Result<T, ConfigError> {
    match get_file_type(path) {
        ConfigFileType::Yaml => parse_yaml(content),
        ConfigFileType::Json => parse_json(content),
        ConfigFileType::Jsonc => parse_jsonc(content),
        ConfigFileType::Unknown => Err(ConfigError::UnknownFileType(path.to_string())),
    }
}

/// Read a file from disk and parse it according to its extension.
pub fn load_config_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: display.clone(),
        source,
    })?;
    tracing::debug!("Loaded config file {}", path.display());
    parse_config(&content, &display)
}
