//! Turning a key lookup into a value.

use crate::error::{Error, Result};
use crate::item::Instance;
use crate::registry::Registry;

use std::cell::RefCell;
use std::collections::HashSet;

thread_local! {
  // Keys currently being resolved on this thread, tagged with the address of
  // the registry they live in so separate containers never collide.
  static RESOLVING: RefCell<HashSet<(usize, String)>> = RefCell::new(HashSet::new());
}

/// An RAII guard that marks a key as "being resolved" on the current thread.
///
/// Acquiring it a second time for the same registry and key before the first
/// guard drops means a factory has looped back onto itself.
pub(crate) struct ResolutionGuard {
  slot: (usize, String),
}

impl ResolutionGuard {
  pub(crate) fn acquire(registry: &Registry, key: &str) -> Result<Self> {
    let slot = (registry as *const Registry as usize, key.to_owned());
    RESOLVING.with(|stack| {
      // `insert` returns `false` if the value was already present.
      if stack.borrow_mut().insert(slot.clone()) {
        Ok(Self { slot })
      } else {
        Err(Error::CircularDependency { key: key.to_owned() })
      }
    })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING.with(|stack| {
      stack.borrow_mut().remove(&self.slot);
    });
  }
}

/// The strategy a container uses to look keys up.
///
/// Replace it through [`ContainerConfig`](crate::ContainerConfig) to
/// instrument or fake resolution without touching the registry.
pub trait Resolver: Send + Sync {
  /// Resolves `key`, falling back to `fallback` when the key is absent.
  fn call(
    &self,
    registry: &Registry,
    key: &str,
    fallback: Option<&dyn Fn() -> Instance>,
  ) -> Result<Instance>;
}

/// Looks the key up in the registry and resolves the matching item.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultResolver;

impl Resolver for DefaultResolver {
  fn call(
    &self,
    registry: &Registry,
    key: &str,
    fallback: Option<&dyn Fn() -> Instance>,
  ) -> Result<Instance> {
    let item = match (registry.fetch(key), fallback) {
      (Ok(item), _) => item,
      (Err(Error::KeyNotFound { .. }), Some(fallback)) => {
        tracing::trace!(key, "key not registered, using fallback");
        return Ok(fallback());
      }
      (Err(err), _) => return Err(err),
    };

    let _guard = ResolutionGuard::acquire(registry, key)?;
    tracing::trace!(key, "resolving item");
    Ok(item.resolve())
  }
}
