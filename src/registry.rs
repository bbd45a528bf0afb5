//! The registry: a fixed set of declared variables and their current values.
//!
//! The key set is decided once, by [`RegistryBuilder::build`], and never
//! changes afterwards. Every read or write by key is checked against it, so a
//! typo in a variable name fails loudly instead of reading `None`.
//!
//! # Locking
//!
//! State lives behind a single [`ReentrantMutex`]. Plain operations hold it
//! only for their own duration. A [`ScopeGuard`](crate::ScopeGuard) holds it
//! from snapshot to restore, so other threads never observe a scope's
//! temporary overrides, while code running inside the scope (on the same
//! thread) can still call `get`/`set` freely.

use std::cell::RefCell;
use std::fmt;

use indexmap::IndexMap;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use tracing::debug;

use crate::autodoc::DocRecord;
use crate::builder::RegistryBuilder;
use crate::coerce;
use crate::error::KeyfigError;
use crate::types::{IntoValue, Key, Snapshot, Value, VariableDecl};

pub(crate) type State = IndexMap<Key, Value>;
pub(crate) type StateGuard<'a> = ReentrantMutexGuard<'a, RefCell<State>>;

/// Post-load hook, see [`RegistryBuilder::after_initialize`].
pub(crate) type Hook = Box<dyn Fn(&Registry) -> Result<(), KeyfigError> + Send + Sync>;

/// Default prefix for environment variables (`APP_HOST` → `host`).
pub const DEFAULT_ENV_PREFIX: &str = "APP_";

pub struct Registry {
    state: ReentrantMutex<RefCell<State>>,
    declarations: Vec<VariableDecl>,
    env_prefix: String,
    hook: Option<Hook>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub(crate) fn from_parts(
        declarations: Vec<VariableDecl>,
        env_prefix: String,
        hook: Option<Hook>,
    ) -> Self {
        let state: State = declarations
            .iter()
            .map(|d| (d.name.clone(), d.default.clone()))
            .collect();
        Self {
            state: ReentrantMutex::new(RefCell::new(state)),
            declarations,
            env_prefix,
            hook,
        }
    }

    /// Current value of `key`.
    pub fn get(&self, key: &str) -> Result<Value, KeyfigError> {
        let guard = self.lock();
        let state = guard.borrow();
        state
            .get(key)
            .cloned()
            .ok_or_else(|| KeyfigError::UnsupportedVariable(key.to_string()))
    }

    /// Overwrite the value of `key` and return the new value.
    pub fn set<V: IntoValue>(&self, key: &str, value: V) -> Result<Value, KeyfigError> {
        let guard = self.lock();
        let mut state = guard.borrow_mut();
        let slot = state
            .get_mut(key)
            .ok_or_else(|| KeyfigError::UnsupportedVariable(key.to_string()))?;
        *slot = value.into_value();
        Ok(slot.clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().borrow().contains_key(key)
    }

    /// Every declared variable, in declaration order.
    pub fn variables(&self) -> Vec<Key> {
        self.declarations.iter().map(|d| d.name.clone()).collect()
    }

    /// A copy of all current values.
    pub fn dump(&self) -> Snapshot {
        let guard = self.lock();
        let state = guard.borrow();
        Snapshot(state.clone())
    }

    /// Whether `key` holds one of `true`, `1`, `yes`, `on` (trimmed, any case).
    pub fn is_true(&self, key: &str) -> Result<bool, KeyfigError> {
        Ok(coerce::is_truthy(&self.get(key)?))
    }

    pub fn is_false(&self, key: &str) -> Result<bool, KeyfigError> {
        Ok(!self.is_true(key)?)
    }

    /// Run the post-load hook, if one was registered. Both loaders call this
    /// once population is complete.
    pub fn after_initialize(&self) -> Result<(), KeyfigError> {
        match &self.hook {
            Some(hook) => {
                debug!("running after_initialize hook");
                hook(self)
            }
            None => Ok(()),
        }
    }

    /// Prefix used by [`initialize_from_env`](Self::initialize_from_env).
    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }

    /// The declaration this registry was built from.
    pub fn declarations(&self) -> &[VariableDecl] {
        &self.declarations
    }

    /// Documentation records for every declared variable, in declaration order.
    ///
    /// Defaults are rendered the way the extractor reports them: the literal
    /// string, or `nil` when the default is absent.
    pub fn doc_records(&self) -> Vec<DocRecord> {
        self.declarations.iter().map(DocRecord::from).collect()
    }

    /// Put every variable back to its declared default.
    pub fn reset(&self) {
        let guard = self.lock();
        let mut state = guard.borrow_mut();
        for decl in &self.declarations {
            state.insert(decl.name.clone(), decl.default.clone());
        }
    }

    pub(crate) fn lock(&self) -> StateGuard<'_> {
        self.state.lock()
    }

    /// Resolve `name` to its declared key.
    pub(crate) fn key_for(&self, name: &str) -> Result<Key, KeyfigError> {
        let guard = self.lock();
        let state = guard.borrow();
        state
            .get_key_value(name)
            .map(|(key, _)| key.clone())
            .ok_or_else(|| KeyfigError::UnsupportedVariable(name.to_string()))
    }

    /// Set a batch of already-validated entries under one lock acquisition.
    pub(crate) fn apply(&self, entries: Vec<(Key, Value)>) {
        let guard = self.lock();
        let mut state = guard.borrow_mut();
        for (key, value) in entries {
            state.insert(key, value);
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("values", &self.dump())
            .field("env_prefix", &self.env_prefix)
            .field("has_hook", &self.hook.is_some())
            .finish()
    }
}
