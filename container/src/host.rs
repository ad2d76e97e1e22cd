//! Container behaviour for arbitrary host types.

use crate::config::ContainerConfig;
use crate::container::Container;
use crate::error::Result;
use crate::item::{Decorator, Instance, Item};
use crate::namespace::{Namespace, NamespaceScope};

use std::any::Any;
use std::sync::Arc;

/// Gives a type the container API by delegating to a [`Container`] it owns.
///
/// Only [`container`](Self::container) has to be written; every other method
/// forwards to it.
///
/// ```
/// use fibre_container::{Container, ContainerHost};
///
/// struct App {
///   name: &'static str,
///   services: Container,
/// }
///
/// impl ContainerHost for App {
///   fn container(&self) -> &Container {
///     &self.services
///   }
/// }
///
/// let app = App { name: "demo", services: Container::new() };
/// app.register("greeting", "hello").unwrap();
/// assert_eq!(*app.resolve_as::<&str>("greeting").unwrap(), "hello");
/// assert_eq!(app.name, "demo");
/// ```
pub trait ContainerHost {
  fn container(&self) -> &Container;

  // --- Configuration ---

  fn configure<F>(&self, f: F) -> &Self
  where
    F: FnOnce(&mut ContainerConfig),
  {
    self.container().configure(f);
    self
  }

  fn config(&self) -> ContainerConfig {
    self.container().config()
  }

  // --- Registration ---

  fn register<T: Any + Send + Sync>(&self, key: impl AsRef<str>, value: T) -> Result<&Self> {
    self.container().register(key, value)?;
    Ok(self)
  }

  fn register_factory<T, F>(&self, key: impl AsRef<str>, factory: F) -> Result<&Self>
  where
    T: Any + Send + Sync,
    F: Fn() -> T + Send + Sync + 'static,
  {
    self.container().register_factory(key, factory)?;
    Ok(self)
  }

  fn register_item(&self, key: impl AsRef<str>, item: Item) -> Result<&Self> {
    self.container().register_item(key, item)?;
    Ok(self)
  }

  // --- Resolution ---

  fn resolve(&self, key: impl AsRef<str>) -> Result<Instance> {
    self.container().resolve(key)
  }

  fn resolve_or_else<F>(&self, key: impl AsRef<str>, fallback: F) -> Result<Instance>
  where
    F: Fn() -> Instance,
  {
    self.container().resolve_or_else(key, fallback)
  }

  fn resolve_as<T: Any + Send + Sync>(&self, key: impl AsRef<str>) -> Result<Arc<T>> {
    self.container().resolve_as(key)
  }

  fn get(&self, key: impl AsRef<str>) -> Option<Instance> {
    self.container().get(key)
  }

  // --- Inspection ---

  fn contains_key(&self, key: impl AsRef<str>) -> bool {
    self.container().contains_key(key)
  }

  fn keys(&self) -> Vec<String> {
    self.container().keys()
  }

  fn each_key<F>(&self, f: F) -> &Self
  where
    F: FnMut(&str),
  {
    self.container().each_key(f);
    self
  }

  fn each<F>(&self, f: F) -> Result<&Self>
  where
    F: FnMut(&str, Instance),
  {
    self.container().each(f)?;
    Ok(self)
  }

  // --- Namespaces, Merging and Decoration ---

  fn namespace<F>(&self, prefix: impl AsRef<str>, builder: F) -> Result<&Self>
  where
    F: for<'a> FnOnce(&NamespaceScope<'a>) -> Result<()>,
  {
    self.container().namespace(prefix, builder)?;
    Ok(self)
  }

  fn import(&self, namespace: Namespace) -> Result<&Self> {
    self.container().import(namespace)?;
    Ok(self)
  }

  fn merge(&self, other: &Container, namespace: Option<&str>) -> Result<&Self> {
    self.container().merge(other, namespace)?;
    Ok(self)
  }

  fn merge_with<F>(&self, other: &Container, namespace: Option<&str>, on_conflict: F) -> Result<&Self>
  where
    F: FnMut(&str, Instance, Instance) -> Instance,
  {
    self.container().merge_with(other, namespace, on_conflict)?;
    Ok(self)
  }

  fn decorate(&self, key: impl AsRef<str>, decorator: impl Decorator) -> Result<&Self> {
    self.container().decorate(key, decorator)?;
    Ok(self)
  }

  fn decorate_with<D, F>(&self, key: impl AsRef<str>, constructor: F) -> Result<&Self>
  where
    D: Any + Send + Sync,
    F: Fn(Instance) -> D + Send + Sync + 'static,
  {
    self.container().decorate_with(key, constructor)?;
    Ok(self)
  }

  // --- Lifecycle ---

  fn freeze(&self) -> &Self {
    self.container().freeze();
    self
  }

  fn is_frozen(&self) -> bool {
    self.container().is_frozen()
  }

  /// An independent copy of the hosted container. See [`Container::dup`].
  fn dup(&self) -> Container {
    self.container().dup()
  }

  /// A clone of the hosted container; shares the registry once frozen.
  fn clone_container(&self) -> Container {
    self.container().clone()
  }

  // --- Stubs ---

  #[cfg(feature = "stub")]
  fn enable_stubs(&self) -> &Self {
    self.container().enable_stubs();
    self
  }

  #[cfg(feature = "stub")]
  fn stub<T: Any + Send + Sync>(&self, key: impl AsRef<str>, value: T) -> Result<&Self> {
    self.container().stub(key, value)?;
    Ok(self)
  }

  #[cfg(feature = "stub")]
  fn stub_scoped<T, R, F>(&self, key: impl AsRef<str>, value: T, f: F) -> Result<R>
  where
    T: Any + Send + Sync,
    F: FnOnce(&Container) -> R,
  {
    self.container().stub_scoped(key, value, f)
  }

  #[cfg(feature = "stub")]
  fn unstub(&self, key: impl AsRef<str>) -> Result<&Self> {
    self.container().unstub(key)?;
    Ok(self)
  }

  #[cfg(feature = "stub")]
  fn unstub_all(&self) -> Result<&Self> {
    self.container().unstub_all()?;
    Ok(self)
  }
}
