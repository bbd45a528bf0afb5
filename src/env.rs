use std::ffi::OsString;

use tracing::{debug, trace};

use crate::error::KeyfigError;
use crate::registry::Registry;
use crate::types::{Key, Snapshot, Value};

/// Select the entries of `vars` that start with `prefix` and map them to
/// variable names.
///
/// The prefix test is literal and case-sensitive. The remainder is lowercased:
/// `PREF_MY_VAR` with prefix `PREF_` becomes `my_var`. Everything else is
/// ignored.
///
/// Takes an iterator so tests can pass synthetic data instead of `std::env::vars()`.
pub fn prefixed_vars(
    prefix: &str,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Vec<(String, String)> {
    vars.into_iter()
        .filter_map(|(key, value)| {
            let rest = key.strip_prefix(prefix)?;
            Some((rest.to_lowercase(), value))
        })
        .collect()
}

/// Keep the entries whose name and value are both valid UTF-8.
///
/// `std::env::vars()` panics on the first entry that is not, even one the
/// prefix would have ignored.
fn unicode_vars(
    vars: impl IntoIterator<Item = (OsString, OsString)>,
) -> impl Iterator<Item = (String, String)> {
    vars.into_iter().filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
        (Ok(key), Ok(value)) => Some((key, value)),
        (key, _) => {
            trace!(?key, "skipping environment entry that is not valid UTF-8");
            None
        }
    })
}

impl Registry {
    /// Load from the process environment using the registry's prefix.
    pub fn initialize_from_env(&self) -> Result<Snapshot, KeyfigError> {
        let prefix = self.env_prefix().to_string();
        self.initialize_from_env_with_prefix(&prefix)
    }

    /// Load from the process environment with an explicit prefix.
    pub fn initialize_from_env_with_prefix(&self, prefix: &str) -> Result<Snapshot, KeyfigError> {
        self.initialize_from_vars(prefix, unicode_vars(std::env::vars_os()))
    }

    /// Load from the given environment-style entries.
    ///
    /// Every matching entry must name a declared variable; otherwise nothing
    /// is applied and [`KeyfigError::UnsupportedVariable`] is returned. Values
    /// are stored as-is. When two entries map to the same variable, the later
    /// one wins.
    pub fn initialize_from_vars(
        &self,
        prefix: &str,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Snapshot, KeyfigError> {
        let validated = prefixed_vars(prefix, vars)
            .into_iter()
            .map(|(name, value)| Ok((self.key_for(&name)?, Some(value))))
            .collect::<Result<Vec<(Key, Value)>, KeyfigError>>()?;

        debug!(prefix, count = validated.len(), "loaded environment variables");
        self.apply(validated);
        self.after_initialize()?;
        Ok(self.dump())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::sample_registry;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn prefix_is_stripped_and_lowercased() {
        let selected = prefixed_vars("PREF_", vars(&[("PREF_MY_VAR", "x")]));
        assert_eq!(selected, vec![("my_var".to_string(), "x".to_string())]);
    }

    #[test]
    fn non_matching_entries_ignored() {
        let selected = prefixed_vars(
            "PREF_",
            vars(&[("IGNORE_MY_VAR", "y"), ("pref_my_var", "z"), ("PATH", "/bin")]),
        );
        assert!(selected.is_empty());
    }

    #[test]
    fn sets_only_prefixed_variables() {
        let reg = sample_registry();
        reg.initialize_from_vars(
            "PREF_",
            vars(&[("PREF_MY_VAR", "x"), ("IGNORE_MY_VAR", "y")]),
        )
        .unwrap();
        assert_eq!(reg.get("my_var").unwrap(), Some("x".into()));
        assert_eq!(reg.get("debug").unwrap(), Some("false".into()));
    }

    #[test]
    fn custom_prefix() {
        let reg = sample_registry();
        reg.initialize_from_vars(
            "COOL_PREFIX_",
            vars(&[
                ("COOL_PREFIX_MY_VAR", "set with cool prefix"),
                ("PREF_MY_VAR", "should be ignored"),
            ]),
        )
        .unwrap();
        assert_eq!(reg.get("my_var").unwrap(), Some("set with cool prefix".into()));
    }

    #[test]
    fn undeclared_variable_in_namespace_fails() {
        let reg = sample_registry();
        let before = reg.dump();
        let err = reg
            .initialize_from_vars(
                "PREF_",
                vars(&[("PREF_MY_VAR", "x"), ("PREF_BAD_VARIABLE", "oops")]),
            )
            .unwrap_err();
        assert!(matches!(err, KeyfigError::UnsupportedVariable(k) if k == "bad_variable"));
        assert_eq!(reg.dump(), before);
    }

    #[test]
    fn bare_prefix_is_undeclared() {
        let reg = sample_registry();
        let result = reg.initialize_from_vars("PREF_", vars(&[("PREF_", "x")]));
        assert!(matches!(result, Err(KeyfigError::UnsupportedVariable(k)) if k.is_empty()));
    }

    #[test]
    fn last_entry_wins_for_same_variable() {
        let reg = sample_registry();
        reg.initialize_from_vars(
            "PREF_",
            vars(&[("PREF_MY_VAR", "first"), ("PREF_my_var", "second")]),
        )
        .unwrap();
        assert_eq!(reg.get("my_var").unwrap(), Some("second".into()));
    }

    #[test]
    fn returns_dump_and_runs_hook() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let reg = Registry::builder()
            .variable("my_var", None::<&str>)
            .after_initialize(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .build()
            .unwrap();
        let loaded = reg
            .initialize_from_vars("APP_", vars(&[("APP_MY_VAR", "v")]))
            .unwrap();
        assert_eq!(loaded, reg.dump());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn hook_runs_even_without_matches() {
        let reg = Registry::builder()
            .variable("my_var", None::<&str>)
            .after_initialize(|_| Err(KeyfigError::InitializationError("always".into())))
            .build()
            .unwrap();
        let result = reg.initialize_from_vars("APP_", Vec::new());
        assert!(matches!(result, Err(KeyfigError::InitializationError(_))));
    }

    #[test]
    fn reads_process_environment() {
        // No variable carries this prefix, so only the defaults and the hook remain.
        let reg = Registry::builder()
            .variable("my_var", "default")
            .env_prefix("KEYFIG_ENV_TEST_UNSET_")
            .build()
            .unwrap();
        let loaded = reg.initialize_from_env().unwrap();
        assert_eq!(loaded.get("my_var"), Some(&Some("default".to_string())));
    }

    #[cfg(unix)]
    #[test]
    fn entries_that_are_not_unicode_are_skipped() {
        use std::os::unix::ffi::OsStringExt;

        let entries = vec![
            (OsString::from_vec(b"OTHER\xff".to_vec()), OsString::from("x")),
            (OsString::from("UNRELATED"), OsString::from_vec(b"\xff\xfe".to_vec())),
            (OsString::from("PREF_MY_VAR"), OsString::from("kept")),
        ];
        let reg = sample_registry();
        reg.initialize_from_vars("PREF_", unicode_vars(entries)).unwrap();
        assert_eq!(reg.get("my_var").unwrap(), Some("kept".into()));
    }
}
