//! Error types for container operations.

use thiserror::Error;

// Keys further away than this are not offered as "did you mean" candidates.
const MAX_SUGGESTION_DISTANCE: usize = 3;
const MAX_SUGGESTIONS: usize = 3;

/// The error type returned by every fallible container operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// A key was registered twice.
  #[error("there is already an item registered with the key {key:?}")]
  KeyConflict { key: String },

  /// Nothing is registered under the requested key.
  #[error("nothing registered with the key {key:?}{}", did_you_mean(.suggestions))]
  KeyNotFound {
    key: String,
    /// Registered keys that look like a typo of `key`, closest first.
    suggestions: Vec<String>,
  },

  /// A registration was attempted after the container was frozen.
  #[error("can't modify frozen Registry (when attempting to register '{key}')")]
  FrozenRegistry { key: String },

  /// The item's resolution policy cannot be honoured.
  #[error("invalid configuration for {key:?}: {reason}")]
  Configuration { key: String, reason: String },

  /// The operation needs a capability this container does not have enabled.
  #[error("unsupported operation: {operation}")]
  UnsupportedOperation { operation: String },

  /// `stub` was called for a key that was never registered.
  #[error("cannot stub {key:?} - no such key in container")]
  StubKeyMissing { key: String },

  /// The resolved value is not of the requested type.
  #[error("item {key:?} does not resolve to a value of type {expected}")]
  TypeMismatch { key: String, expected: &'static str },

  /// A factory (transitively) resolved its own key.
  #[error("circular dependency detected while resolving {key:?}")]
  CircularDependency { key: String },
}

impl Error {
  pub(crate) fn key_not_found<'a, I>(key: &str, known: I) -> Self
  where
    I: IntoIterator<Item = &'a str>,
  {
    Error::KeyNotFound {
      key: key.to_owned(),
      suggestions: suggest(key, known),
    }
  }

  pub(crate) fn configuration(key: &str, reason: impl Into<String>) -> Self {
    Error::Configuration {
      key: key.to_owned(),
      reason: reason.into(),
    }
  }

  /// The key the failed operation was addressing, if it addressed one.
  pub fn key(&self) -> Option<&str> {
    match self {
      Error::KeyConflict { key }
      | Error::KeyNotFound { key, .. }
      | Error::FrozenRegistry { key }
      | Error::Configuration { key, .. }
      | Error::StubKeyMissing { key }
      | Error::TypeMismatch { key, .. }
      | Error::CircularDependency { key } => Some(key),
      Error::UnsupportedOperation { .. } => None,
    }
  }

  /// Near-miss keys for a `KeyNotFound` error. Empty for every other variant.
  pub fn suggestions(&self) -> &[String] {
    match self {
      Error::KeyNotFound { suggestions, .. } => suggestions,
      _ => &[],
    }
  }
}

/// A specialized `Result` type for container operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

fn suggest<'a, I>(key: &str, known: I) -> Vec<String>
where
  I: IntoIterator<Item = &'a str>,
{
  let mut scored: Vec<(usize, &str)> = known
    .into_iter()
    .map(|candidate| (strsim::levenshtein(key, candidate), candidate))
    .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
    .collect();
  scored.sort_by_key(|(distance, _)| *distance);
  scored
    .into_iter()
    .take(MAX_SUGGESTIONS)
    .map(|(_, candidate)| candidate.to_owned())
    .collect()
}

fn did_you_mean(suggestions: &[String]) -> String {
  match suggestions {
    [] => String::new(),
    [only] => format!(" (did you mean {only:?}?)"),
    many => {
      let quoted: Vec<String> = many.iter().map(|s| format!("{s:?}")).collect();
      format!(" (did you mean one of {}?)", quoted.join(", "))
    }
  }
}
