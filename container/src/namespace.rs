//! Prefix-scoped batches of registrations.
//!
//! Registrations made inside a namespace are staged in a private registry
//! and only land in the container once the whole block has succeeded, each
//! key rewritten as `prefix + separator + key`. Nested namespaces compose
//! their prefixes left to right, so `one` > `two` > `three` yields
//! `one.two.three` with the default separator.

use crate::config::join_key;
use crate::container::Container;
use crate::error::{Error, Result};
use crate::item::{Instance, Item};
use crate::registry::Registry;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

type Builder = Box<dyn for<'a> FnOnce(&NamespaceScope<'a>) -> Result<()> + Send>;

/// A detached, deferred namespace that can be imported into a container or
/// into another namespace later on.
///
/// ```
/// use fibre_container::{Container, Namespace};
///
/// let repositories = Namespace::new("repositories", |ns| {
///   ns.register("users", "users-table")?;
///   Ok(())
/// });
///
/// let container = Container::new();
/// container.import(repositories).unwrap();
/// assert!(container.contains_key("repositories.users"));
/// ```
pub struct Namespace {
  prefix: String,
  builder: Builder,
}

impl Namespace {
  pub fn new<F>(prefix: impl Into<String>, builder: F) -> Self
  where
    F: for<'a> FnOnce(&NamespaceScope<'a>) -> Result<()> + Send + 'static,
  {
    Self {
      prefix: prefix.into(),
      builder: Box::new(builder),
    }
  }

  pub fn prefix(&self) -> &str {
    &self.prefix
  }

  pub(crate) fn into_parts(self) -> (String, Builder) {
    (self.prefix, self.builder)
  }
}

impl fmt::Debug for Namespace {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Namespace")
      .field("prefix", &self.prefix)
      .finish_non_exhaustive()
  }
}

/// The registration surface handed to a namespace block.
///
/// Keys passed in are relative to the scope's prefix, for registration and
/// resolution alike.
pub struct NamespaceScope<'a> {
  container: &'a Container,
  staged: &'a Registry,
  prefix: String,
  separator: String,
}

impl<'a> NamespaceScope<'a> {
  pub(crate) fn root(
    container: &'a Container,
    staged: &'a Registry,
    prefix: &str,
    separator: String,
  ) -> Self {
    Self {
      container,
      staged,
      prefix: prefix.to_owned(),
      separator,
    }
  }

  fn child(&self, prefix: &str) -> NamespaceScope<'a> {
    NamespaceScope {
      container: self.container,
      staged: self.staged,
      prefix: self.qualify(prefix),
      separator: self.separator.clone(),
    }
  }

  /// The full prefix of this scope, e.g. `one.two`.
  pub fn prefix(&self) -> &str {
    &self.prefix
  }

  /// The container the namespace is being built for.
  pub fn container(&self) -> &'a Container {
    self.container
  }

  /// The absolute key `key` will be registered under.
  pub fn qualify(&self, key: &str) -> String {
    join_key(&self.prefix, &self.separator, key)
  }

  pub fn register<T: Any + Send + Sync>(&self, key: impl AsRef<str>, value: T) -> Result<&Self> {
    self.register_item(key, Item::value(value))
  }

  pub fn register_factory<T, F>(&self, key: impl AsRef<str>, factory: F) -> Result<&Self>
  where
    T: Any + Send + Sync,
    F: Fn() -> T + Send + Sync + 'static,
  {
    self.register_item(key, Item::factory(factory))
  }

  pub fn register_item(&self, key: impl AsRef<str>, item: Item) -> Result<&Self> {
    let key = self.qualify(key.as_ref());
    item.validate(&key)?;
    self.staged.set(&key, item)?;
    Ok(self)
  }

  /// Resolves `key` relative to this scope. Siblings staged earlier in the
  /// same block win over entries already in the container.
  pub fn resolve(&self, key: impl AsRef<str>) -> Result<Instance> {
    let key = self.qualify(key.as_ref());
    if self.staged.contains_key(&key) {
      let resolver = self.container.config().resolver;
      return resolver.call(self.staged, &key, None);
    }
    self.container.resolve(&key)
  }

  pub fn resolve_as<T: Any + Send + Sync>(&self, key: impl AsRef<str>) -> Result<Arc<T>> {
    let key = key.as_ref();
    let instance = self.resolve(key)?;
    instance.downcast::<T>().map_err(|_| Error::TypeMismatch {
      key: self.qualify(key),
      expected: std::any::type_name::<T>(),
    })
  }

  pub fn contains_key(&self, key: impl AsRef<str>) -> bool {
    let key = self.qualify(key.as_ref());
    self.staged.contains_key(&key) || self.container.contains_key(&key)
  }

  /// Opens a nested namespace below this one.
  pub fn namespace<F>(&self, prefix: impl AsRef<str>, builder: F) -> Result<&Self>
  where
    F: FnOnce(&NamespaceScope<'a>) -> Result<()>,
  {
    builder(&self.child(prefix.as_ref()))?;
    Ok(self)
  }

  /// Evaluates a detached namespace below this one.
  pub fn import(&self, namespace: Namespace) -> Result<&Self> {
    let (prefix, builder) = namespace.into_parts();
    builder(&self.child(&prefix))?;
    Ok(self)
  }
}

impl fmt::Debug for NamespaceScope<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("NamespaceScope")
      .field("prefix", &self.prefix)
      .field("staged", &self.staged.keys())
      .finish()
  }
}
