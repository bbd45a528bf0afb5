//! Documentation extraction from declaration text.
//!
//! Recovers `(name, default, comment)` records from a flat, hash-like list of
//! variable declarations, in either key style:
//!
//! ```text
//! {
//!   :my_var => 'default value',
//!   timeout: 30, # Seconds to wait before
//!                # giving up on a request
//!   :default_is_nil => nil
//! }
//! ```
//!
//! This is pattern matching, not a grammar. Each entry is matched on its own,
//! and a trailing comment runs to the end of its line plus any following lines
//! that start with `#`. A malformed entry is skipped without disturbing the
//! ones after it.
//!
//! [`render_template`] turns records into a commented TOML reference file.

use std::sync::LazyLock;

use fancy_regex::Regex;
use serde::Serialize;

use crate::error::KeyfigError;
use crate::types::{Key, VariableDecl};

/// Barewords that stand for an absent default.
pub(crate) const NULL_LITERALS: [&str; 3] = ["nil", "null", "None"];

const ENTRY_PATTERN: &str = r#"(?xs)
    (?:
        :(?P<old>\w+)\s*=>                          # :key => value
      | (?P<new>\w+):(?!:)                          # key: value
    )
    \s*
    (?:
        (?P<quote>['"])(?P<string>.*?)\k<quote>     # same quote on both ends
      | (?P<bare>(?!\w+:\s)[\w@:.]+)                # never the next entry's key
    )
    \s*,?\s*
    (?:
        \#[^\S\n]*
        (?P<comment>
            [^\n]*
            (?:\n[^\S\n]*\#[^\n]*)*                  # continuation lines
        )
    )?
"#;

static ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ENTRY_PATTERN).expect("keyfig: invalid declaration pattern"));

/// One documented variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocRecord {
    pub name: Key,
    /// The default exactly as written: the contents of a quoted string, or
    /// the bareword itself (`30`, `nil`, `Foo::BAR`).
    pub default: String,
    /// The trailing comment flattened onto one line.
    pub comment: Option<String>,
}

impl DocRecord {
    /// Whether the default is one of the absent markers (`nil`, `null`, `None`).
    pub fn has_absent_default(&self) -> bool {
        NULL_LITERALS.contains(&self.default.as_str())
    }
}

impl From<&VariableDecl> for DocRecord {
    fn from(decl: &VariableDecl) -> Self {
        DocRecord {
            name: decl.name.clone(),
            default: decl
                .default
                .clone()
                .unwrap_or_else(|| NULL_LITERALS[0].to_string()),
            comment: decl.comment.clone(),
        }
    }
}

/// Extract one record per declared entry, in source order.
pub fn parse_declaration(text: &str) -> Result<Vec<DocRecord>, KeyfigError> {
    let mut records = Vec::new();
    for caps in ENTRY.captures_iter(text) {
        let caps = caps?;
        let Some(name) = caps.name("old").or_else(|| caps.name("new")) else {
            continue;
        };
        let Some(default) = caps.name("string").or_else(|| caps.name("bare")) else {
            continue;
        };
        let comment = caps
            .name("comment")
            .map(|c| flatten_comment(c.as_str()))
            .filter(|c| !c.is_empty());

        records.push(DocRecord {
            name: Key::new(name.as_str()),
            default: default.as_str().to_string(),
            comment,
        });
    }
    Ok(records)
}

/// Trim a multi-line comment and join its continuation lines with single
/// spaces, dropping each line's leading `#`.
fn flatten_comment(raw: &str) -> String {
    raw.lines()
        .enumerate()
        .map(|(i, line)| {
            let line = line.trim();
            // The first line's marker was consumed by the pattern.
            if i == 0 {
                line
            } else {
                line.strip_prefix('#').unwrap_or(line).trim()
            }
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render records as a commented TOML file.
///
/// Each record's comment becomes a `#` line above it. Variables with an
/// absent default are emitted commented out, so the file stays loadable.
pub fn render_template(records: &[DocRecord]) -> String {
    let mut out = String::new();
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if let Some(comment) = &record.comment {
            out.push_str(&format!("# {comment}\n"));
        }
        if record.has_absent_default() {
            out.push_str(&format!("# {} =\n", record.name));
        } else {
            let quoted = toml::Value::String(record.default.clone());
            out.push_str(&format!("{} = {quoted}\n", record.name));
        }
    }
    out
}
