use crate::registry::{DefaultRegistrar, Registrar};
use crate::resolver::{DefaultResolver, Resolver};

use std::fmt;
use std::sync::Arc;

/// The separator used to join namespace prefixes when none is configured.
pub const DEFAULT_NAMESPACE_SEPARATOR: &str = ".";

/// Per-container strategies and settings.
///
/// Every container owns its own copy; cloning a config shares the strategy
/// objects but not the config itself.
#[derive(Clone)]
pub struct ContainerConfig {
  /// Writes new bindings into the registry.
  pub registrar: Arc<dyn Registrar>,
  /// Looks keys up.
  pub resolver: Arc<dyn Resolver>,
  /// Joins a namespace prefix to a key, e.g. `"."` gives `db.pool`.
  pub namespace_separator: String,
}

impl ContainerConfig {
  pub fn registrar(mut self, registrar: impl Registrar + 'static) -> Self {
    self.registrar = Arc::new(registrar);
    self
  }

  pub fn resolver(mut self, resolver: impl Resolver + 'static) -> Self {
    self.resolver = Arc::new(resolver);
    self
  }

  pub fn namespace_separator(mut self, separator: impl Into<String>) -> Self {
    self.namespace_separator = separator.into();
    self
  }

  pub(crate) fn join(&self, prefix: &str, key: &str) -> String {
    join_key(prefix, &self.namespace_separator, key)
  }
}

impl Default for ContainerConfig {
  fn default() -> Self {
    Self {
      registrar: Arc::new(DefaultRegistrar),
      resolver: Arc::new(DefaultResolver),
      namespace_separator: DEFAULT_NAMESPACE_SEPARATOR.to_owned(),
    }
  }
}

impl fmt::Debug for ContainerConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ContainerConfig")
      .field("namespace_separator", &self.namespace_separator)
      .finish_non_exhaustive()
  }
}

// An empty prefix leaves the key untouched.
pub(crate) fn join_key(prefix: &str, separator: &str, key: &str) -> String {
  if prefix.is_empty() {
    key.to_owned()
  } else {
    format!("{prefix}{separator}{key}")
  }
}
