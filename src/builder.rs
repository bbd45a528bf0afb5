use crate::autodoc;
use crate::error::KeyfigError;
use crate::registry::{DEFAULT_ENV_PREFIX, Hook, Registry};
use crate::types::{IntoValue, Key, Value, VariableDecl};

/// Builder for declaring a registry's variables.
///
/// ```ignore
/// let registry = Registry::builder()
///     .variable("host", "localhost")
///     .describe("host", "Interface to bind to.")
///     .variable("database_url", None::<&str>)
///     .env_prefix("MYAPP_")
///     .build()?;
/// ```
///
/// The set of names declared here is the registry's whole key set. Nothing can
/// be added once [`build`](Self::build) returns.
pub struct RegistryBuilder {
    declarations: Vec<VariableDecl>,
    descriptions: Vec<(String, String)>,
    env_prefix: Option<String>,
    hook: Option<Hook>,
    error: Option<KeyfigError>,
}

impl RegistryBuilder {
    pub(crate) fn new() -> Self {
        Self {
            declarations: Vec::new(),
            descriptions: Vec::new(),
            env_prefix: None,
            hook: None,
            error: None,
        }
    }

    /// Declare a variable with its default. Pass `None::<&str>` for a variable
    /// that starts out absent.
    pub fn variable<V: IntoValue>(mut self, name: &str, default: V) -> Self {
        self.declarations.push(VariableDecl {
            name: Key::new(name),
            default: default.into_value(),
            comment: None,
        });
        self
    }

    /// Attach a doc comment to an already declared variable.
    pub fn describe(mut self, name: &str, comment: &str) -> Self {
        self.descriptions
            .push((name.to_string(), comment.to_string()));
        self
    }

    /// Declare every entry found in externally authored declaration text.
    ///
    /// Quoted defaults are taken verbatim. The barewords `nil`, `null` and
    /// `None` declare an absent default; any other bareword is kept as its
    /// literal text. Comments become the variables' descriptions.
    pub fn declaration_text(mut self, text: &str) -> Self {
        match autodoc::parse_declaration(text) {
            Ok(records) => {
                for record in records {
                    let default: Value = if record.has_absent_default() {
                        None
                    } else {
                        Some(record.default)
                    };
                    self.declarations.push(VariableDecl {
                        name: record.name,
                        default,
                        comment: record.comment,
                    });
                }
            }
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
        self
    }

    /// Override the environment variable prefix (default: `"APP_"`).
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Register a hook that runs after every file or environment load.
    ///
    /// Use it for post-load validation or to derive values from others. Return
    /// [`KeyfigError::InitializationError`] to reject the loaded state; the
    /// error is passed through to the loader's caller.
    pub fn after_initialize<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Registry) -> Result<(), KeyfigError> + Send + Sync + 'static,
    {
        self.hook = Some(Box::new(hook));
        self
    }

    /// Validate the declaration and build the registry.
    pub fn build(self) -> Result<Registry, KeyfigError> {
        if let Some(e) = self.error {
            return Err(e);
        }

        let mut declarations = self.declarations;
        for (i, decl) in declarations.iter().enumerate() {
            let name = decl.name.as_str();
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                return Err(KeyfigError::InvalidKey(name.to_string()));
            }
            if declarations[..i].iter().any(|d| d.name == decl.name) {
                return Err(KeyfigError::DuplicateVariable(name.to_string()));
            }
        }

        for (name, comment) in self.descriptions {
            let decl = declarations
                .iter_mut()
                .find(|d| d.name == name.as_str())
                .ok_or(KeyfigError::UnsupportedVariable(name))?;
            decl.comment = Some(comment);
        }

        let env_prefix = self
            .env_prefix
            .unwrap_or_else(|| DEFAULT_ENV_PREFIX.to_string());

        Ok(Registry::from_parts(declarations, env_prefix, self.hook))
    }
}
