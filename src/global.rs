//! One registry for the whole process.
//!
//! Most code should take a `&Registry`. For applications that want a single
//! well-known instance, build it once at startup and [`install`] it; anything
//! can then reach it through [`registry`]. There is no uninstall: an installed
//! registry lives until the process exits.

use std::sync::OnceLock;

use tracing::debug;

use crate::error::KeyfigError;
use crate::registry::Registry;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Install the process-wide registry. Fails if one is already installed.
pub fn install(registry: Registry) -> Result<&'static Registry, KeyfigError> {
    REGISTRY
        .set(registry)
        .map_err(|_| KeyfigError::AlreadyInstalled)?;
    debug!("installed process-wide registry");
    REGISTRY.get().ok_or(KeyfigError::AlreadyInstalled)
}

/// The installed registry, if any.
pub fn registry() -> Option<&'static Registry> {
    REGISTRY.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    // The only test touching the process-wide slot, so ordering is fixed.
    #[test]
    fn install_once_then_reuse() {
        let reg = Registry::builder()
            .variable("global_var", "initial")
            .build()
            .unwrap();
        let installed = install(reg).unwrap();
        installed.set("global_var", "changed").unwrap();

        let again = registry().unwrap();
        assert_eq!(again.get("global_var").unwrap(), Some("changed".into()));

        let second = Registry::builder().build().unwrap();
        assert!(matches!(install(second), Err(KeyfigError::AlreadyInstalled)));
    }
}
