//! Stored bindings and their resolution policy.

use crate::error::{Error, Result};

use once_cell::sync::OnceCell;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A resolved value: shared, type-erased and safe to hand across threads.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// A cloneable zero-argument callable that produces an [`Instance`].
///
/// Items registered with `call(false)` resolve to their `Factory` rather than
/// to its output, so callers can downcast to `Factory` and invoke it later.
#[derive(Clone)]
pub struct Factory(Arc<dyn Fn() -> Instance + Send + Sync>);

impl Factory {
  pub fn new<T, F>(f: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn() -> T + Send + Sync + 'static,
  {
    Factory(Arc::new(move || Arc::new(f()) as Instance))
  }

  /// Wraps a closure that already produces an `Instance`, without boxing it again.
  pub fn from_fn<F>(f: F) -> Self
  where
    F: Fn() -> Instance + Send + Sync + 'static,
  {
    Factory(Arc::new(f))
  }

  pub fn call(&self) -> Instance {
    (self.0)()
  }
}

impl fmt::Debug for Factory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Factory(..)")
  }
}

/// Transforms a resolved value into its decorated form.
///
/// Implemented for every `Fn(Instance) -> Instance` closure; implement it by
/// hand for decorator objects that carry their own state.
pub trait Decorator: Send + Sync + 'static {
  fn decorate(&self, value: Instance) -> Instance;
}

impl<F> Decorator for F
where
  F: Fn(Instance) -> Instance + Send + Sync + 'static,
{
  fn decorate(&self, value: Instance) -> Instance {
    self(value)
  }
}

// The payload kind is fixed at registration so resolution never has to probe
// whether a value can be invoked.
#[derive(Clone)]
enum Payload {
  Value(Instance),
  Factory(Factory),
  Deferred(Instance),
  // Owns its inner item, so cloning a decorated item copies the whole chain.
  Decorated {
    inner: Box<Item>,
    decorator: Arc<dyn Decorator>,
  },
}

/// A registered binding: a payload plus its call/memoize policy.
#[derive(Clone)]
pub struct Item {
  payload: Payload,
  call: bool,
  memoize: bool,
  memo: OnceCell<Instance>,
}

impl Item {
  /// An inert value, returned as-is on every resolution.
  pub fn value<T: Any + Send + Sync>(value: T) -> Self {
    Self::from_instance(Arc::new(value))
  }

  /// An inert value that is already type-erased.
  pub fn from_instance(instance: Instance) -> Self {
    Self::with_payload(Payload::Value(instance))
  }

  /// A zero-argument factory, invoked on resolution.
  pub fn factory<T, F>(factory: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn() -> T + Send + Sync + 'static,
  {
    Self::from_factory(Factory::new(factory))
  }

  pub fn from_factory(factory: Factory) -> Self {
    Self::with_payload(Payload::Factory(factory))
  }

  /// A callable that needs arguments of its own.
  ///
  /// It is never invoked by the container: resolution hands back `callable`
  /// unevaluated, and the caller downcasts it to its concrete type to call it.
  pub fn deferred<C: Any + Send + Sync>(callable: C) -> Self {
    Self::with_payload(Payload::Deferred(Arc::new(callable)))
  }

  fn with_payload(payload: Payload) -> Self {
    Self {
      payload,
      call: true,
      memoize: false,
      memo: OnceCell::new(),
    }
  }

  /// Whether resolution invokes a factory payload. Defaults to `true`.
  pub fn call(mut self, call: bool) -> Self {
    self.call = call;
    self
  }

  /// Whether the first factory result is cached for later resolutions.
  pub fn memoize(mut self, memoize: bool) -> Self {
    self.memoize = memoize;
    self
  }

  pub fn is_memoized(&self) -> bool {
    self.memoize
  }

  /// `true` when resolution would invoke a factory.
  pub fn is_callable(&self) -> bool {
    self.call && matches!(self.payload, Payload::Factory(_) | Payload::Decorated { .. })
  }

  /// Rejects policies that cannot be honoured, such as memoizing an inert value.
  pub(crate) fn validate(&self, key: &str) -> Result<()> {
    if !self.memoize {
      return Ok(());
    }
    match self.payload {
      Payload::Factory(_) | Payload::Decorated { .. } if self.call => Ok(()),
      Payload::Factory(_) | Payload::Decorated { .. } => Err(Error::configuration(
        key,
        "memoize requires the factory to be called on resolution",
      )),
      Payload::Value(_) => Err(Error::configuration(
        key,
        "memoize requires a zero-argument factory, got a plain value",
      )),
      Payload::Deferred(_) => Err(Error::configuration(
        key,
        "memoize requires a zero-argument factory, got a callable that takes arguments",
      )),
    }
  }

  /// Produces the value this item stands for.
  pub fn resolve(&self) -> Instance {
    match &self.payload {
      Payload::Value(instance) | Payload::Deferred(instance) => instance.clone(),
      Payload::Factory(factory) if !self.call => Arc::new(factory.clone()) as Instance,
      Payload::Factory(factory) if self.memoize => self
        .memo
        .get_or_init(|| {
          tracing::trace!("filling memoized item");
          factory.call()
        })
        .clone(),
      Payload::Factory(factory) => factory.call(),
      Payload::Decorated { inner, decorator } if self.memoize => self
        .memo
        .get_or_init(|| {
          tracing::trace!("filling memoized decorated item");
          decorator.decorate(inner.resolve())
        })
        .clone(),
      Payload::Decorated { inner, decorator } => decorator.decorate(inner.resolve()),
    }
  }

  /// Builds the item that replaces `original` once `decorator` is applied.
  ///
  /// Callable originals are decorated lazily on every resolution, and the
  /// decorated result is cached only if the original was memoized. Inert
  /// originals are decorated once.
  pub(crate) fn decorated(original: &Item, decorator: Arc<dyn Decorator>) -> Item {
    let memoize = original.memoize || !original.is_callable();
    Self::with_payload(Payload::Decorated {
      inner: Box::new(original.clone()),
      decorator,
    })
    .memoize(memoize)
  }
}

impl fmt::Debug for Item {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let kind = match self.payload {
      Payload::Value(_) => "value",
      Payload::Factory(_) => "factory",
      Payload::Deferred(_) => "deferred",
      Payload::Decorated { .. } => "decorated",
    };
    f.debug_struct("Item")
      .field("kind", &kind)
      .field("call", &self.call)
      .field("memoize", &self.memoize)
      .field("memoized", &self.memo.get().is_some())
      .finish()
  }
}
