use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyfigError {
    #[error("Unsupported variable '{0}'")]
    UnsupportedVariable(String),

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Unsupported config file format: {path} (expected .toml, .json, .yaml or .yml)")]
    UnsupportedFormat { path: PathBuf },

    #[error("Value for '{key}' in {path} is not a scalar")]
    NonScalarValue { key: String, path: PathBuf },

    #[error("Initialization failed: {0}")]
    InitializationError(String),

    #[error("Variable '{0}' is declared more than once")]
    DuplicateVariable(String),

    #[error("Invalid variable name '{0}'")]
    InvalidKey(String),

    #[error("A registry is already installed for this process")]
    AlreadyInstalled,

    #[error("Failed to extract documentation: {0}")]
    ExtractError(#[from] fancy_regex::Error),
}

impl KeyfigError {
    /// True for the errors that mean a config file could not produce a
    /// key/value mapping at all.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            KeyfigError::IoError { .. }
                | KeyfigError::ParseError { .. }
                | KeyfigError::UnsupportedFormat { .. }
                | KeyfigError::NonScalarValue { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_variable_formats_correctly() {
        let err = KeyfigError::UnsupportedVariable("typo_key".into());
        assert!(err.to_string().contains("typo_key"));
    }

    #[test]
    fn parse_error_includes_path() {
        let err = KeyfigError::ParseError {
            path: "/etc/myapp/config.toml".into(),
            reason: "expected `=`".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("config.toml"));
        assert!(msg.contains("expected `=`"));
    }

    #[test]
    fn load_errors_are_grouped() {
        let io = KeyfigError::IoError {
            path: "missing.toml".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(io.is_load_error());
        assert!(
            KeyfigError::UnsupportedFormat {
                path: "x.ini".into()
            }
            .is_load_error()
        );
        assert!(!KeyfigError::UnsupportedVariable("x".into()).is_load_error());
        assert!(!KeyfigError::InitializationError("bad".into()).is_load_error());
    }
}
