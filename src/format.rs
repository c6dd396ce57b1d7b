//! Parsers turning config file text into a JSON value tree.

use ::config::{Config, File, FileFormat};
use serde_json::{Map, Value};

/// Config file extensions, in search priority order.
pub const SUPPORTED_EXTENSIONS: [&str; 11] = [
    "json",
    "toml",
    "yaml",
    "yml",
    "properties",
    "props",
    "prop",
    "hcl",
    "dotenv",
    "env",
    "ini",
];

/// Parse `text` according to `extension`. The result is always an object.
pub(crate) fn parse(extension: &str, text: &str) -> Result<Value, String> {
    let value = match extension {
        "json" => serde_json::from_str(text).map_err(|e| e.to_string())?,
        "toml" => toml::from_str(text).map_err(|e| e.to_string())?,
        "yaml" | "yml" => serde_yaml::from_str(text).map_err(|e| e.to_string())?,
        "properties" | "props" | "prop" | "dotenv" | "env" | "ini" => parse_flat(text)?,
        "hcl" => return Err("hcl documents cannot be parsed".to_string()),
        other => return Err(format!("unknown config type [{}]", other)),
    };

    match value {
        Value::Object(_) => Ok(value),
        Value::Null => Ok(Value::Object(Map::new())),
        _ => Err("top level of the document is not a table".to_string()),
    }
}

/// `key=value` documents, with optional `[section]` headers. Dotted keys and
/// section names nest; every value stays a string.
fn parse_flat(text: &str) -> Result<Value, String> {
    Config::builder()
        .add_source(File::from_str(text, FileFormat::Ini))
        .build()
        .and_then(|config| config.try_deserialize::<Value>())
        .map_err(|e| e.to_string())
}
