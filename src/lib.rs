//! A configuration registry with a fixed set of keys. Declare the variables
//! your application understands, load their values from a file or the
//! environment, and read them back as strings or booleans.
//!
//! ```ignore
//! let registry = Registry::builder()
//!     .variable("host", "localhost")
//!     .variable("debug", "false")
//!     .env_prefix("MYAPP_")
//!     .build()?;
//!
//! registry.initialize_from_file("myapp.toml")?;
//! if registry.is_true("debug")? { /* ... */ }
//! ```
//!
//! # Why a fixed key set
//!
//! Configuration typos are silent by default: a misspelled key in a file or an
//! environment variable is simply never read, and the application runs on a
//! default nobody chose. Keyfig refuses them instead. The set of variables is
//! decided once, when the registry is built, and every operation that names a
//! variable (reading, writing, loading from a file, loading from the
//! environment, overriding in a scope) fails with
//! [`KeyfigError::UnsupportedVariable`] for anything outside it.
//!
//! Values are plain strings. A value can also be *absent*, which is distinct
//! from the empty string. [`Registry::is_true`] interprets `true`, `1`, `yes`
//! and `on` (trimmed, any case) as true and everything else, absent included,
//! as false.
//!
//! # Loading
//!
//! - **Files**: [`Registry::initialize_from_file`] reads TOML, JSON or YAML,
//!   picked by extension. Only top-level scalars are accepted; they are coerced
//!   to strings by a fixed rule (see the [`coerce`] module), so `debug = true`
//!   stores `"true"`. A file that can't be read or parsed is an error, never an
//!   empty load. Plug in any other format through [`FileDecoder`].
//! - **Environment**: [`Registry::initialize_from_env`] reads every variable
//!   starting with the prefix (default `APP_`), strips it and lowercases the
//!   rest: `APP_DATABASE_URL` sets `database_url`. Variables without the
//!   prefix are ignored; variables with the prefix must be declared.
//!
//! Both loaders check every key before applying any value, then run the
//! `after_initialize` hook registered on the builder (the place for
//! post-load validation or derived values), and return a [`Snapshot`] of the
//! resulting state.
//!
//! # Scoped overrides
//!
//! [`Registry::with_config`] runs a closure with some values temporarily
//! replaced, and restores the previous state afterwards, however the closure
//! exits:
//!
//! ```ignore
//! registry.with_config([("host", "test.local")], || {
//!     run_against(registry.get("host")?)
//! })?;
//! ```
//!
//! Restoration happens in a [`ScopeGuard`]'s `Drop`, so it also runs on early
//! returns and panics. The guard holds the registry's lock for the whole
//! scope; other threads block until it ends rather than seeing temporary
//! values.
//!
//! # Documentation
//!
//! The builder keeps the declaration as data (names, defaults, doc comments),
//! available from [`Registry::declarations`] and [`Registry::doc_records`].
//! For declarations written elsewhere as text, the [`autodoc`] module extracts
//! the same records from a hash-style listing:
//!
//! ```text
//! {
//!   :host => 'localhost',      # Interface to bind to
//!   timeout: 30,               # Seconds to wait before
//!                              # giving up
//! }
//! ```
//!
//! [`autodoc::render_template`] turns records into a commented TOML file.
//!
//! # Error handling
//!
//! All fallible operations return [`KeyfigError`]. Nothing is logged and
//! swallowed; the library only emits `tracing` debug events.

pub mod autodoc;
pub mod coerce;
pub mod error;
pub mod global;
pub mod types;

mod builder;
mod env;
mod file;
mod registry;
mod scope;

#[cfg(test)]
mod fixtures;

pub use autodoc::{DocRecord, parse_declaration, render_template};
pub use builder::RegistryBuilder;
pub use env::prefixed_vars;
pub use error::KeyfigError;
pub use file::{FileDecoder, Format};
pub use registry::{DEFAULT_ENV_PREFIX, Registry};
pub use scope::ScopeGuard;
pub use types::{IntoValue, Key, Scalar, Snapshot, Value, VariableDecl};
