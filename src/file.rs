//! Populating a registry from a config file.
//!
//! Decoding is delegated to a [`FileDecoder`]: given a path, produce the
//! file's top-level `(key, scalar)` pairs or fail. [`Format`] is the built-in
//! decoder, picked from the file extension:
//!
//! - `.toml`: via `toml`
//! - `.json`: via `serde_json`
//! - `.yaml` / `.yml`: via `serde_yaml`
//!
//! A file that cannot produce a mapping (missing, unreadable, malformed, or
//! with a nested table where a scalar belongs) is an error, never an empty
//! load. Every key is checked against the registry before any value is
//! applied, so an unknown key leaves the registry exactly as it was.

use std::path::Path;

use tracing::debug;

use crate::error::KeyfigError;
use crate::registry::Registry;
use crate::types::{Key, Scalar, Snapshot, Value};

/// Turns a config file into its top-level key/scalar pairs.
pub trait FileDecoder {
    fn decode(&self, path: &Path) -> Result<Vec<(String, Scalar)>, KeyfigError>;
}

/// Built-in file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
    Yaml,
}

impl Format {
    /// Pick a format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Format, KeyfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("toml") => Ok(Format::Toml),
            Some("json") => Ok(Format::Json),
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            _ => Err(KeyfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Decode already-read file content. `path` is used for error messages.
    pub fn decode_str(
        &self,
        content: &str,
        path: &Path,
    ) -> Result<Vec<(String, Scalar)>, KeyfigError> {
        match self {
            Format::Toml => decode_toml(content, path),
            Format::Json => decode_json(content, path),
            Format::Yaml => decode_yaml(content, path),
        }
    }
}

impl FileDecoder for Format {
    fn decode(&self, path: &Path) -> Result<Vec<(String, Scalar)>, KeyfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| KeyfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.decode_str(&content, path)
    }
}

fn parse_error(path: &Path, reason: impl ToString) -> KeyfigError {
    KeyfigError::ParseError {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn non_scalar(key: &str, path: &Path) -> KeyfigError {
    KeyfigError::NonScalarValue {
        key: key.to_string(),
        path: path.to_path_buf(),
    }
}

fn decode_toml(content: &str, path: &Path) -> Result<Vec<(String, Scalar)>, KeyfigError> {
    let table: toml::Table = content.parse().map_err(|e| parse_error(path, e))?;
    table
        .into_iter()
        .map(|(key, value)| {
            let scalar = match value {
                toml::Value::String(s) => Scalar::String(s),
                toml::Value::Integer(i) => Scalar::Integer(i),
                toml::Value::Float(f) => Scalar::Float(f),
                toml::Value::Boolean(b) => Scalar::Bool(b),
                toml::Value::Datetime(d) => Scalar::Datetime(d.to_string()),
                toml::Value::Array(_) | toml::Value::Table(_) => {
                    return Err(non_scalar(&key, path));
                }
            };
            Ok((key, scalar))
        })
        .collect()
}

fn decode_json(content: &str, path: &Path) -> Result<Vec<(String, Scalar)>, KeyfigError> {
    let map: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(content).map_err(|e| parse_error(path, e))?;
    map.into_iter()
        .map(|(key, value)| {
            let scalar = match value {
                serde_json::Value::Null => Scalar::Null,
                serde_json::Value::Bool(b) => Scalar::Bool(b),
                serde_json::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                    (Some(i), _) => Scalar::Integer(i),
                    (None, Some(f)) => Scalar::Float(f),
                    (None, None) => Scalar::String(n.to_string()),
                },
                serde_json::Value::String(s) => Scalar::String(s),
                serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                    return Err(non_scalar(&key, path));
                }
            };
            Ok((key, scalar))
        })
        .collect()
}

fn decode_yaml(content: &str, path: &Path) -> Result<Vec<(String, Scalar)>, KeyfigError> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let doc: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| parse_error(path, e))?;
    let mapping = match doc {
        serde_yaml::Value::Mapping(m) => m,
        serde_yaml::Value::Null => return Ok(Vec::new()),
        _ => return Err(parse_error(path, "top level is not a mapping")),
    };

    let mut entries = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let key = match key {
            serde_yaml::Value::String(s) => s,
            serde_yaml::Value::Bool(b) => b.to_string(),
            serde_yaml::Value::Number(n) => n.to_string(),
            other => return Err(parse_error(path, format!("unsupported key {other:?}"))),
        };
        let scalar = yaml_scalar(value).ok_or_else(|| non_scalar(&key, path))?;
        entries.push((key, scalar));
    }
    Ok(entries)
}

fn yaml_scalar(value: serde_yaml::Value) -> Option<Scalar> {
    match value {
        serde_yaml::Value::Null => Some(Scalar::Null),
        serde_yaml::Value::Bool(b) => Some(Scalar::Bool(b)),
        serde_yaml::Value::Number(n) => Some(match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Scalar::Integer(i),
            (None, Some(f)) => Scalar::Float(f),
            (None, None) => Scalar::String(n.to_string()),
        }),
        serde_yaml::Value::String(s) => Some(Scalar::String(s)),
        serde_yaml::Value::Tagged(tagged) => yaml_scalar(tagged.value),
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => None,
    }
}

impl Registry {
    /// Load a config file, choosing the decoder from its extension.
    ///
    /// Returns the registry's state after the load (and after the
    /// `after_initialize` hook has run).
    pub fn initialize_from_file(&self, path: impl AsRef<Path>) -> Result<Snapshot, KeyfigError> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        self.initialize_from_file_with(path, &format)
    }

    /// Load a config file through an explicit decoder.
    pub fn initialize_from_file_with(
        &self,
        path: impl AsRef<Path>,
        decoder: &dyn FileDecoder,
    ) -> Result<Snapshot, KeyfigError> {
        let path = path.as_ref();
        let entries = decoder.decode(path)?;

        let validated = entries
            .into_iter()
            .map(|(name, scalar)| Ok((self.key_for(&name)?, scalar.to_config_string())))
            .collect::<Result<Vec<(Key, Value)>, KeyfigError>>()?;

        debug!(
            path = %path.display(),
            count = validated.len(),
            "loaded config file"
        );
        self.apply(validated);
        self.after_initialize()?;
        Ok(self.dump())
    }
}
