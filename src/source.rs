//! Where raw values come from.
//!
//! The binder only ever asks "is this name set, and to what?". [`ProcessEnv`]
//! answers from the real process environment; [`MapEnv`] and [`FnEnv`] let
//! tests and demos answer without touching global state.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Read-only lookup of environment values by name
pub trait EnvLookup {
    /// The raw value of `key`, or `None` if it is not set
    fn lookup(&self, key: &str) -> Option<String>;
}

/// The process environment
///
/// Values that are not valid Unicode still count as set and are decoded lossily.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
    }
}

/// In-memory environment
///
/// # Example
///
/// ```rust
/// use envbind::{EnvLookup, MapEnv};
///
/// let env = MapEnv::new()
///     .with_var("APP_MAX_WORKERS", "10")
///     .with_var("APP_DB_URL", "postgres://localhost/app");
///
/// assert_eq!(env.lookup("APP_MAX_WORKERS").as_deref(), Some("10"));
/// assert_eq!(env.lookup("APP_LOGGING_TYPE"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.vars
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn remove_var(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }
}

impl EnvLookup for MapEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Adapts a closure into an [`EnvLookup`]
pub struct FnEnv<F>(pub F);

impl<F> EnvLookup for FnEnv<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn lookup(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }
}

impl<F> fmt::Debug for FnEnv<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnEnv(..)")
    }
}

impl<S: std::hash::BuildHasher> EnvLookup for HashMap<String, String, S> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvLookup for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<E: EnvLookup + ?Sized> EnvLookup for &E {
    fn lookup(&self, key: &str) -> Option<String> {
        (**self).lookup(key)
    }
}
