//! The insertion-ordered key/item store and the strategy that writes to it.

use crate::error::{Error, Result};
use crate::item::Item;

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Insertion-ordered storage of every binding a container owns.
///
/// Readers clone the `Arc<Item>` out of the map and release the lock before
/// resolving it, so factories are free to call back into the container.
#[derive(Default)]
pub struct Registry {
  entries: RwLock<IndexMap<String, Arc<Item>>>,
  frozen: AtomicBool,
}

impl Registry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Inserts `item` under `key`. The first writer of a key wins; later writers
  /// get `KeyConflict`.
  pub fn set(&self, key: &str, item: Item) -> Result<()> {
    let mut entries = self.entries.write();
    self.ensure_writable(key)?;
    if entries.contains_key(key) {
      return Err(Error::KeyConflict { key: key.to_owned() });
    }
    entries.insert(key.to_owned(), Arc::new(item));
    Ok(())
  }

  /// Inserts a batch of new entries. Nothing is inserted unless every key is
  /// free.
  pub fn set_all(&self, batch: Vec<(String, Item)>) -> Result<()> {
    let mut entries = self.entries.write();
    for (index, (key, _)) in batch.iter().enumerate() {
      self.ensure_writable(key)?;
      let repeated = batch[..index].iter().any(|(earlier, _)| earlier == key);
      if repeated || entries.contains_key(key.as_str()) {
        return Err(Error::KeyConflict { key: key.clone() });
      }
    }
    entries.extend(batch.into_iter().map(|(key, item)| (key, Arc::new(item))));
    Ok(())
  }

  // Merge semantics: incoming entries replace existing ones in place, keeping
  // the original insertion position.
  pub(crate) fn overwrite_all(&self, batch: Vec<(String, Arc<Item>)>) -> Result<()> {
    let mut entries = self.entries.write();
    if let Some((key, _)) = batch.first() {
      self.ensure_writable(key)?;
    }
    entries.extend(batch);
    Ok(())
  }

  /// Swaps the item under `key` for the one `f` builds from it.
  pub(crate) fn replace<F>(&self, key: &str, f: F) -> Result<()>
  where
    F: FnOnce(Arc<Item>) -> Item,
  {
    let mut entries = self.entries.write();
    self.ensure_writable(key)?;
    let Some(index) = entries.get_index_of(key) else {
      return Err(Error::key_not_found(key, entries.keys().map(String::as_str)));
    };
    let slot = &mut entries[index];
    *slot = Arc::new(f(slot.clone()));
    Ok(())
  }

  pub fn get(&self, key: &str) -> Option<Arc<Item>> {
    self.entries.read().get(key).cloned()
  }

  /// Like [`get`](Self::get), but a miss becomes a `KeyNotFound` carrying
  /// near-miss suggestions drawn from this registry.
  pub fn fetch(&self, key: &str) -> Result<Arc<Item>> {
    let entries = self.entries.read();
    match entries.get(key) {
      Some(item) => Ok(item.clone()),
      None => Err(Error::key_not_found(key, entries.keys().map(String::as_str))),
    }
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.entries.read().contains_key(key)
  }

  /// Registered keys in insertion order.
  pub fn keys(&self) -> Vec<String> {
    self.entries.read().keys().cloned().collect()
  }

  /// A point-in-time copy of every entry, in insertion order.
  pub fn snapshot(&self) -> Vec<(String, Arc<Item>)> {
    self
      .entries
      .read()
      .iter()
      .map(|(key, item)| (key.clone(), item.clone()))
      .collect()
  }

  pub(crate) fn into_entries(self) -> Vec<(String, Arc<Item>)> {
    self.entries.into_inner().into_iter().collect()
  }

  pub fn len(&self) -> usize {
    self.entries.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.read().is_empty()
  }

  pub fn freeze(&self) {
    // Taking the write lock orders the flag after any in-flight insertion.
    let _entries = self.entries.write();
    self.frozen.store(true, Ordering::Release);
  }

  pub fn is_frozen(&self) -> bool {
    self.frozen.load(Ordering::Acquire)
  }

  /// An unfrozen registry holding copies of every item. Memo caches are copied
  /// as they stand, and from then on evolve independently.
  pub(crate) fn deep_copy(&self) -> Registry {
    let entries = self
      .entries
      .read()
      .iter()
      .map(|(key, item)| (key.clone(), Arc::new(Item::clone(item))))
      .collect();
    Registry {
      entries: RwLock::new(entries),
      frozen: AtomicBool::new(false),
    }
  }

  fn ensure_writable(&self, key: &str) -> Result<()> {
    if self.is_frozen() {
      return Err(Error::FrozenRegistry { key: key.to_owned() });
    }
    Ok(())
  }
}

impl fmt::Debug for Registry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Registry")
      .field("keys", &self.keys())
      .field("frozen", &self.is_frozen())
      .finish()
  }
}

/// The strategy a container uses to write new bindings into its [`Registry`].
///
/// Swap it through [`ContainerConfig`](crate::ContainerConfig) to observe or
/// veto registrations.
pub trait Registrar: Send + Sync {
  fn call(&self, registry: &Registry, key: &str, item: Item) -> Result<()>;

  /// Registers a batch atomically. Used for namespace imports.
  fn call_all(&self, registry: &Registry, batch: Vec<(String, Item)>) -> Result<()> {
    registry.set_all(batch)
  }
}

/// Inserts straight into the registry, rejecting duplicate keys.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRegistrar;

impl Registrar for DefaultRegistrar {
  fn call(&self, registry: &Registry, key: &str, item: Item) -> Result<()> {
    registry.set(key, item)
  }
}
