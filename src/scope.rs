//! Temporary overrides with guaranteed restoration.
//!
//! A [`ScopeGuard`] snapshots the registry, applies overrides, and puts the
//! snapshot back when it is dropped. Because restoration lives in `Drop`, it
//! runs on every exit path: normal return, early return through `?`, an error
//! from the body, or a panic unwinding through it.
//!
//! The guard holds the registry lock for its whole lifetime. Code on the same
//! thread keeps full access; other threads wait until the scope ends and never
//! see the overridden values.

use tracing::trace;

use crate::error::KeyfigError;
use crate::registry::{Registry, State, StateGuard};
use crate::types::IntoValue;

/// Restores the registry to the state it had when the scope was entered.
///
/// Created by [`Registry::scope`].
#[must_use = "the overrides are reverted as soon as the guard is dropped"]
pub struct ScopeGuard<'a> {
    guard: StateGuard<'a>,
    snapshot: Option<State>,
}

impl<'a> ScopeGuard<'a> {
    fn enter<I, K, V>(registry: &'a Registry, overrides: I) -> Result<Self, KeyfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoValue,
    {
        let guard = registry.lock();
        let snapshot = guard.borrow().clone();
        // Constructed before the overrides so a failing one is rolled back.
        let scope = ScopeGuard {
            guard,
            snapshot: Some(snapshot),
        };
        for (key, value) in overrides {
            registry.set(key.as_ref(), value)?;
        }
        trace!("entered config scope");
        Ok(scope)
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        let Some(snapshot) = self.snapshot.take() else {
            return;
        };
        match self.guard.try_borrow_mut() {
            Ok(mut state) => {
                *state = snapshot;
                trace!("restored config scope");
            }
            // Only reachable if a panic unwound out of an active borrow.
            Err(_) => tracing::error!("config scope could not be restored: state is borrowed"),
        }
    }
}

impl Registry {
    /// Apply `overrides` until the returned guard is dropped.
    ///
    /// Fails with [`KeyfigError::UnsupportedVariable`] if any override names
    /// an undeclared variable; overrides applied before it are rolled back.
    pub fn scope<I, K, V>(&self, overrides: I) -> Result<ScopeGuard<'_>, KeyfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoValue,
    {
        ScopeGuard::enter(self, overrides)
    }

    /// Run `body` with `overrides` applied, then restore the previous state.
    ///
    /// ```ignore
    /// let url = registry.with_config([("host", "test.local")], || build_url(&registry))?;
    /// ```
    pub fn with_config<I, K, V, T, F>(&self, overrides: I, body: F) -> Result<T, KeyfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoValue,
        F: FnOnce() -> T,
    {
        let _scope = self.scope(overrides)?;
        Ok(body())
    }

    /// Like [`with_config`](Self::with_config) for a fallible body. The body's
    /// error is returned after the state has been restored.
    pub fn try_with_config<I, K, V, T, E, F>(&self, overrides: I, body: F) -> Result<T, E>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoValue,
        E: From<KeyfigError>,
        F: FnOnce() -> Result<T, E>,
    {
        let _scope = self.scope(overrides)?;
        body()
    }

    /// Run `body` and throw away whatever it changed.
    pub fn isolated<T, F: FnOnce() -> T>(&self, body: F) -> T {
        let guard = self.lock();
        let snapshot = guard.borrow().clone();
        let _scope = ScopeGuard {
            guard,
            snapshot: Some(snapshot),
        };
        body()
    }
}
