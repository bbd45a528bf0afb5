//! Interpreting stored strings, and turning decoded scalars into strings.
//!
//! The registry only ever stores strings. Anything richer a file decoder
//! hands back goes through [`Scalar::to_config_string`], so the stored form of
//! every file value is predictable:
//!
//! | Decoded            | Stored               |
//! |--------------------|----------------------|
//! | string             | verbatim             |
//! | boolean            | `"true"` / `"false"` |
//! | integer            | decimal, e.g. `"-5"` |
//! | float              | keeps a fraction, e.g. `"1.5"`, `"3.0"` |
//! | date/time          | its textual form     |
//! | null               | absent               |

use crate::types::{Scalar, Value};

const TRUTHY: [&str; 4] = ["true", "1", "yes", "on"];

/// True iff the value, trimmed, case-insensitively equals `true`, `1`, `yes`
/// or `on`. Absent is false.
pub fn is_truthy(value: &Value) -> bool {
    let Some(v) = value else {
        return false;
    };
    let v = v.trim();
    TRUTHY.iter().any(|t| v.eq_ignore_ascii_case(t))
}

impl Scalar {
    /// Coerce to the string form stored in the registry. `Null` is absent.
    pub fn to_config_string(&self) -> Value {
        match self {
            Scalar::Null => None,
            Scalar::Bool(b) => Some(b.to_string()),
            Scalar::Integer(i) => Some(i.to_string()),
            // `Debug` keeps the `.0` that `Display` drops.
            Scalar::Float(f) => Some(format!("{f:?}")),
            Scalar::String(s) | Scalar::Datetime(s) => Some(s.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Value {
        Some(s.to_string())
    }

    #[test]
    fn truthy_values() {
        for v in ["true", "1", "yes", "on"] {
            assert!(is_truthy(&some(v)), "{v} should be truthy");
        }
    }

    #[test]
    fn truthy_is_case_insensitive() {
        for v in ["True", "trUe", "yEs", "YES", "oN"] {
            assert!(is_truthy(&some(v)), "{v} should be truthy");
        }
    }

    #[test]
    fn truthy_ignores_surrounding_whitespace() {
        for v in ["    true", " on ", "1    ", "\tyes\n"] {
            assert!(is_truthy(&some(v)), "{v:?} should be truthy");
        }
    }

    #[test]
    fn everything_else_is_falsy() {
        assert!(!is_truthy(&None));
        for v in ["0", "false", "blah", "NOT TRUE", "", "on off", "10"] {
            assert!(!is_truthy(&some(v)), "{v:?} should be falsy");
        }
    }

    #[test]
    fn scalar_coercion() {
        assert_eq!(Scalar::Bool(true).to_config_string(), some("true"));
        assert_eq!(Scalar::Bool(false).to_config_string(), some("false"));
        assert_eq!(Scalar::Integer(-5).to_config_string(), some("-5"));
        assert_eq!(Scalar::Float(1.5).to_config_string(), some("1.5"));
        assert_eq!(Scalar::Float(3.0).to_config_string(), some("3.0"));
        assert_eq!(Scalar::Float(-0.25).to_config_string(), some("-0.25"));
        assert_eq!(
            Scalar::String("hello world".into()).to_config_string(),
            some("hello world")
        );
        assert_eq!(
            Scalar::Datetime("1979-05-27T07:32:00Z".into()).to_config_string(),
            some("1979-05-27T07:32:00Z")
        );
        assert_eq!(Scalar::Null.to_config_string(), None);
    }
}
