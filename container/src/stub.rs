//! Temporary overrides for registered keys, meant for tests.
//!
//! Compiled with the `stub` feature. A container starts with its overlay
//! disabled; [`Container::enable_stubs`] switches it on, after which
//! [`Container::stub`] can shadow any registered key without touching the
//! underlying item or its memo cache.

use crate::container::Container;
use crate::error::{Error, Result};
use crate::item::{Instance, Item};

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::any::Any;
use std::sync::Arc;

#[derive(Default)]
pub(crate) struct StubOverlay {
  stubs: OnceCell<DashMap<String, Arc<Item>>>,
}

impl StubOverlay {
  pub(crate) fn resolve(&self, key: &str) -> Option<Instance> {
    // Clone the item out so the shard lock is released before any factory runs.
    let item = self.stubs.get()?.get(key).map(|entry| entry.value().clone())?;
    Some(item.resolve())
  }

  fn active(&self, operation: &str) -> Result<&DashMap<String, Arc<Item>>> {
    self.stubs.get().ok_or_else(|| Error::UnsupportedOperation {
      operation: format!("{operation} requires enable_stubs() to be called first"),
    })
  }
}

// Puts the previous stub (or no stub) back when dropped, unwinding included.
struct StubGuard<'a> {
  stubs: &'a DashMap<String, Arc<Item>>,
  key: String,
  previous: Option<Arc<Item>>,
}

impl Drop for StubGuard<'_> {
  fn drop(&mut self) {
    match self.previous.take() {
      Some(previous) => {
        self.stubs.insert(self.key.clone(), previous);
      }
      None => {
        self.stubs.remove(&self.key);
      }
    }
    tracing::debug!(key = %self.key, "scoped stub released");
  }
}

impl Container {
  /// Switches the stub overlay on. Calling it again is a no-op.
  pub fn enable_stubs(&self) -> &Self {
    self.stubs.stubs.get_or_init(DashMap::new);
    self
  }

  pub fn stubs_enabled(&self) -> bool {
    self.stubs.stubs.get().is_some()
  }

  /// Shadows `key` with `value` until [`unstub`](Self::unstub) is called.
  ///
  /// Fails with `StubKeyMissing` if `key` was never registered, and with
  /// `UnsupportedOperation` if stubs were not enabled.
  pub fn stub<T: Any + Send + Sync>(&self, key: impl AsRef<str>, value: T) -> Result<&Self> {
    self.stub_item(key, Item::value(value))
  }

  /// Shadows `key` with an arbitrary item, e.g. a factory.
  pub fn stub_item(&self, key: impl AsRef<str>, item: Item) -> Result<&Self> {
    let key = key.as_ref();
    self.insert_stub(key, item)?;
    Ok(self)
  }

  /// Shadows `key` with `value` only while `f` runs.
  ///
  /// The stub is removed when `f` returns or panics; a stub that was in place
  /// before the call is restored.
  ///
  /// ```
  /// use fibre_container::Container;
  ///
  /// let container = Container::new();
  /// container.register("mailer", "smtp").unwrap();
  /// container.enable_stubs();
  ///
  /// let seen = container
  ///   .stub_scoped("mailer", "fake", |c| c.resolve_as::<&str>("mailer").unwrap())
  ///   .unwrap();
  ///
  /// assert_eq!(*seen, "fake");
  /// assert_eq!(*container.resolve_as::<&str>("mailer").unwrap(), "smtp");
  /// ```
  pub fn stub_scoped<T, R, F>(&self, key: impl AsRef<str>, value: T, f: F) -> Result<R>
  where
    T: Any + Send + Sync,
    F: FnOnce(&Container) -> R,
  {
    let key = key.as_ref();
    let previous = self.insert_stub(key, Item::value(value))?;
    let _guard = StubGuard {
      stubs: self.stubs.active("stub_scoped")?,
      key: key.to_owned(),
      previous,
    };
    Ok(f(self))
  }

  /// Removes the stub for `key`, restoring its registered binding.
  pub fn unstub(&self, key: impl AsRef<str>) -> Result<&Self> {
    let key = key.as_ref();
    self.stubs.active("unstub")?.remove(key);
    tracing::debug!(key, "removed stub");
    Ok(self)
  }

  /// Removes every stub.
  pub fn unstub_all(&self) -> Result<&Self> {
    self.stubs.active("unstub")?.clear();
    tracing::debug!("removed all stubs");
    Ok(self)
  }

  fn insert_stub(&self, key: &str, item: Item) -> Result<Option<Arc<Item>>> {
    let stubs = self.stubs.active("stub")?;
    if !self.contains_key(key) {
      return Err(Error::StubKeyMissing { key: key.to_owned() });
    }
    item.validate(key)?;
    tracing::debug!(key, "stubbed item");
    Ok(stubs.insert(key.to_owned(), Arc::new(item)))
  }
}
