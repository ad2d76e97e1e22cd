//! The main `Container` struct and its associated methods.

use crate::config::{join_key, ContainerConfig};
use crate::error::{Error, Result};
use crate::item::{Decorator, Instance, Item};
use crate::namespace::{Namespace, NamespaceScope};
use crate::registry::Registry;

use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A keyed service container.
///
/// Values and factories are bound to string keys and resolved back on demand.
/// All methods take `&self`: the registry, the configuration and the stub
/// overlay use interior mutability, so a container can be shared across
/// threads behind an `Arc` or a `static`.
///
/// Registration methods return `Result<&Self>` so calls can be chained with `?`.
pub struct Container {
  pub(crate) registry: Arc<Registry>,
  config: RwLock<ContainerConfig>,
  #[cfg(feature = "stub")]
  pub(crate) stubs: crate::stub::StubOverlay,
}

impl Default for Container {
  fn default() -> Self {
    Self::with_config(ContainerConfig::default())
  }
}

impl Container {
  /// Creates a new, empty `Container` with the default strategies.
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_config(config: ContainerConfig) -> Self {
    Self::from_parts(Arc::new(Registry::new()), config)
  }

  fn from_parts(registry: Arc<Registry>, config: ContainerConfig) -> Self {
    Self {
      registry,
      config: RwLock::new(config),
      #[cfg(feature = "stub")]
      stubs: Default::default(),
    }
  }

  // --- Configuration ---

  /// Adjusts the strategies and settings of this container in place.
  ///
  /// `f` works on a copy that replaces the current configuration once it
  /// returns, so it may call back into the container. Concurrent calls to
  /// `configure` race; the last one to finish wins.
  ///
  /// ```
  /// use fibre_container::Container;
  ///
  /// let container = Container::new();
  /// container.configure(|config| config.namespace_separator = "-".into());
  /// container.namespace("db", |ns| {
  ///   ns.register("url", "postgres://localhost")?;
  ///   Ok(())
  /// }).unwrap();
  ///
  /// assert!(container.contains_key("db-url"));
  /// ```
  pub fn configure<F>(&self, f: F) -> &Self
  where
    F: FnOnce(&mut ContainerConfig),
  {
    let mut config = self.config();
    f(&mut config);
    *self.config.write() = config;
    self
  }

  /// A copy of the current configuration.
  pub fn config(&self) -> ContainerConfig {
    self.config.read().clone()
  }

  /// The registry backing this container.
  pub fn registry(&self) -> &Arc<Registry> {
    &self.registry
  }

  // --- Registration ---

  /// Registers an inert value under `key`.
  pub fn register<T: Any + Send + Sync>(&self, key: impl AsRef<str>, value: T) -> Result<&Self> {
    self.register_item(key, Item::value(value))
  }

  /// Registers a factory that runs on every resolution.
  pub fn register_factory<T, F>(&self, key: impl AsRef<str>, factory: F) -> Result<&Self>
  where
    T: Any + Send + Sync,
    F: Fn() -> T + Send + Sync + 'static,
  {
    self.register_item(key, Item::factory(factory))
  }

  /// Registers a factory that runs once, on first resolution.
  pub fn register_memoized<T, F>(&self, key: impl AsRef<str>, factory: F) -> Result<&Self>
  where
    T: Any + Send + Sync,
    F: Fn() -> T + Send + Sync + 'static,
  {
    self.register_item(key, Item::factory(factory).memoize(true))
  }

  /// Registers a fully configured [`Item`].
  ///
  /// Fails with `KeyConflict` if `key` is taken, `FrozenRegistry` after
  /// [`freeze`](Self::freeze), and `Configuration` if the item's policy is
  /// not valid for its payload.
  pub fn register_item(&self, key: impl AsRef<str>, item: Item) -> Result<&Self> {
    let key = key.as_ref();
    item.validate(key)?;
    let registrar = self.config.read().registrar.clone();
    registrar.call(&self.registry, key, item)?;
    tracing::debug!(key, "registered item");
    Ok(self)
  }

  // --- Resolution ---

  /// Resolves the value bound to `key`.
  pub fn resolve(&self, key: impl AsRef<str>) -> Result<Instance> {
    self.resolve_internal(key.as_ref(), None)
  }

  /// Resolves `key`, or returns the fallback's value when nothing is
  /// registered under it.
  pub fn resolve_or_else<F>(&self, key: impl AsRef<str>, fallback: F) -> Result<Instance>
  where
    F: Fn() -> Instance,
  {
    self.resolve_internal(key.as_ref(), Some(&fallback))
  }

  /// Resolves `key` and downcasts the value to `T`.
  pub fn resolve_as<T: Any + Send + Sync>(&self, key: impl AsRef<str>) -> Result<Arc<T>> {
    let key = key.as_ref();
    self
      .resolve(key)?
      .downcast::<T>()
      .map_err(|_| Error::TypeMismatch {
        key: key.to_owned(),
        expected: std::any::type_name::<T>(),
      })
  }

  /// Resolves `key`, returning `None` instead of an error.
  pub fn get(&self, key: impl AsRef<str>) -> Option<Instance> {
    self.resolve(key).ok()
  }

  fn resolve_internal(&self, key: &str, fallback: Option<&dyn Fn() -> Instance>) -> Result<Instance> {
    if let Some(stubbed) = self.stubbed(key) {
      return Ok(stubbed);
    }
    let resolver = self.config.read().resolver.clone();
    resolver.call(&self.registry, key, fallback)
  }

  #[cfg(feature = "stub")]
  fn stubbed(&self, key: &str) -> Option<Instance> {
    self.stubs.resolve(key)
  }

  #[cfg(not(feature = "stub"))]
  fn stubbed(&self, _key: &str) -> Option<Instance> {
    None
  }

  // --- Inspection ---

  pub fn contains_key(&self, key: impl AsRef<str>) -> bool {
    self.registry.contains_key(key.as_ref())
  }

  /// Registered keys in insertion order.
  pub fn keys(&self) -> Vec<String> {
    self.registry.keys()
  }

  pub fn len(&self) -> usize {
    self.registry.len()
  }

  pub fn is_empty(&self) -> bool {
    self.registry.is_empty()
  }

  /// Calls `f` with every key, in insertion order.
  pub fn each_key<F>(&self, mut f: F) -> &Self
  where
    F: FnMut(&str),
  {
    for key in self.keys() {
      f(&key);
    }
    self
  }

  /// Resolves every key and calls `f` with the pair. Memoized items are
  /// filled as a side effect.
  ///
  /// Keys are snapshotted up front; entries registered while iterating are
  /// not visited.
  pub fn each<F>(&self, mut f: F) -> Result<&Self>
  where
    F: FnMut(&str, Instance),
  {
    for key in self.keys() {
      let value = self.resolve(&key)?;
      f(&key, value);
    }
    Ok(self)
  }

  // --- Namespaces ---

  /// Registers everything `builder` registers, prefixed with `prefix`.
  ///
  /// Either every registration of the block lands in the container or, if the
  /// block or any insertion fails, none does.
  pub fn namespace<F>(&self, prefix: impl AsRef<str>, builder: F) -> Result<&Self>
  where
    F: for<'a> FnOnce(&NamespaceScope<'a>) -> Result<()>,
  {
    let prefix = prefix.as_ref();
    let config = self.config();
    let staged = Registry::new();
    builder(&NamespaceScope::root(
      self,
      &staged,
      prefix,
      config.namespace_separator.clone(),
    ))?;

    let batch: Vec<(String, Item)> = staged
      .into_entries()
      .into_iter()
      .map(|(key, item)| (key, Arc::try_unwrap(item).unwrap_or_else(|shared| Item::clone(&shared))))
      .collect();
    let count = batch.len();
    config.registrar.call_all(&self.registry, batch)?;
    tracing::debug!(prefix, count, "imported namespace");
    Ok(self)
  }

  /// Evaluates a detached [`Namespace`] against this container.
  pub fn import(&self, namespace: Namespace) -> Result<&Self> {
    let (prefix, builder) = namespace.into_parts();
    self.namespace(prefix, builder)
  }

  // --- Merging ---

  /// Copies every entry of `other` into this container, overwriting entries
  /// with the same key. With a `namespace`, incoming keys are prefixed first.
  ///
  /// Items are shared with `other`, so a memoized item computes its value
  /// once for both containers.
  pub fn merge(&self, other: &Container, namespace: Option<&str>) -> Result<&Self> {
    self.merge_internal(other, namespace, None)
  }

  /// Like [`merge`](Self::merge), but keys present on both sides are settled
  /// by `on_conflict(key, existing_value, incoming_value)`; its return value
  /// becomes the new binding.
  pub fn merge_with<F>(&self, other: &Container, namespace: Option<&str>, mut on_conflict: F) -> Result<&Self>
  where
    F: FnMut(&str, Instance, Instance) -> Instance,
  {
    self.merge_internal(other, namespace, Some(&mut on_conflict))
  }

  fn merge_internal(
    &self,
    other: &Container,
    namespace: Option<&str>,
    mut on_conflict: Option<&mut dyn FnMut(&str, Instance, Instance) -> Instance>,
  ) -> Result<&Self> {
    let separator = self.config.read().namespace_separator.clone();
    let qualify = |key: String| match namespace {
      Some(prefix) => join_key(prefix, &separator, &key),
      None => key,
    };
    let entries = other.registry.snapshot();
    // Fail before any conflict value is resolved or any callback runs.
    if self.registry.is_frozen() {
      if let Some((key, _)) = entries.first() {
        return Err(Error::FrozenRegistry { key: qualify(key.clone()) });
      }
    }

    // Conflicting values are resolved before the write lock is taken, since
    // resolving may run factories that read this container.
    let mut batch = Vec::with_capacity(entries.len());
    let mut conflicts = 0usize;
    for (key, incoming) in entries {
      let key = qualify(key);
      let item = match (on_conflict.as_deref_mut(), self.registry.get(&key)) {
        (Some(resolve_conflict), Some(existing)) => {
          conflicts += 1;
          let chosen = resolve_conflict(&key, existing.resolve(), incoming.resolve());
          Arc::new(Item::from_instance(chosen))
        }
        _ => incoming,
      };
      batch.push((key, item));
    }

    let count = batch.len();
    self.registry.overwrite_all(batch)?;
    tracing::debug!(count, conflicts, "merged container");
    Ok(self)
  }

  // --- Decoration ---

  /// Wraps every future resolution of `key` with `decorator`.
  ///
  /// The decorated binding keeps the original's memoize flag: a memoized item
  /// yields one decorated value, anything else is decorated on every
  /// resolution. Inert values are decorated once.
  pub fn decorate(&self, key: impl AsRef<str>, decorator: impl Decorator) -> Result<&Self> {
    let key = key.as_ref();
    let decorator: Arc<dyn Decorator> = Arc::new(decorator);
    self
      .registry
      .replace(key, |original| Item::decorated(&original, decorator))?;
    tracing::debug!(key, "decorated item");
    Ok(self)
  }

  /// Decorates `key` with a constructor-like function, e.g. `Wrapper::new`.
  pub fn decorate_with<D, F>(&self, key: impl AsRef<str>, constructor: F) -> Result<&Self>
  where
    D: Any + Send + Sync,
    F: Fn(Instance) -> D + Send + Sync + 'static,
  {
    self.decorate(key, move |inner: Instance| Arc::new(constructor(inner)) as Instance)
  }

  // --- Lifecycle ---

  /// Rejects every later registration with `FrozenRegistry`. Resolution keeps
  /// working.
  pub fn freeze(&self) -> &Self {
    self.registry.freeze();
    tracing::debug!(keys = self.registry.len(), "froze container");
    self
  }

  pub fn is_frozen(&self) -> bool {
    self.registry.is_frozen()
  }

  /// An independent, unfrozen copy: registrations on either side stay on that
  /// side. Stubs are not copied.
  pub fn dup(&self) -> Container {
    Self::from_parts(Arc::new(self.registry.deep_copy()), self.config())
  }
}

/// Cloning a frozen container shares its registry, since neither side can
/// change it any more. Cloning an unfrozen container is [`Container::dup`].
impl Clone for Container {
  fn clone(&self) -> Self {
    if self.is_frozen() {
      Self::from_parts(self.registry.clone(), self.config())
    } else {
      self.dup()
    }
  }
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Container")
      .field("keys", &self.keys())
      .field("frozen", &self.is_frozen())
      .field("config", &*self.config.read())
      .finish_non_exhaustive()
  }
}
