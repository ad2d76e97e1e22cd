use fibre_container::{Container, ContainerHost, Error, Namespace};
use pretty_assertions::assert_eq;
use std::sync::Arc;

// --- Test Fixtures ---

struct Application {
  name: &'static str,
  services: Container,
}

impl Application {
  fn new(name: &'static str) -> Self {
    Self {
      name,
      services: Container::new(),
    }
  }
}

impl ContainerHost for Application {
  fn container(&self) -> &Container {
    &self.services
  }
}

// --- Tests ---

#[test]
fn test_host_registers_and_resolves() {
  let app = Application::new("demo");

  app
    .register("greeting", "hello")
    .unwrap()
    .register_factory("answer", || 42_u32)
    .unwrap();

  assert_eq!(*app.resolve_as::<&str>("greeting").unwrap(), "hello");
  assert_eq!(*app.resolve_as::<u32>("answer").unwrap(), 42);
  assert_eq!(app.keys(), vec!["greeting", "answer"]);
  assert_eq!(app.name, "demo");
}

#[test]
fn test_host_shares_state_with_its_container() {
  let app = Application::new("demo");

  app.register("key", 1_u8).unwrap();

  assert!(app.services.contains_key("key"));
  assert!(app.contains_key("key"));
}

#[test]
fn test_host_namespaces_and_imports() {
  let app = Application::new("demo");
  let ns = Namespace::new("repos", |ns| {
    ns.register("users", "user repo")?;
    Ok(())
  });

  app
    .namespace("settings", |ns| {
      ns.register("port", 8080_u16)?;
      Ok(())
    })
    .unwrap()
    .import(ns)
    .unwrap();

  assert_eq!(*app.resolve_as::<u16>("settings.port").unwrap(), 8080);
  assert_eq!(*app.resolve_as::<&str>("repos.users").unwrap(), "user repo");
}

#[test]
fn test_host_merges_decorates_and_freezes() {
  // Arrange
  let app = Application::new("demo");
  let other = Container::new();
  other.register("name", "other").unwrap();

  // Act
  app.merge(&other, Some("ext")).unwrap();
  app
    .decorate("ext.name", |v: fibre_container::Instance| {
      Arc::new(format!("<{}>", v.downcast_ref::<&str>().unwrap())) as fibre_container::Instance
    })
    .unwrap();
  app.freeze();

  // Assert
  assert_eq!(*app.resolve_as::<String>("ext.name").unwrap(), "<other>");
  assert!(app.services.is_frozen());
  assert!(matches!(app.register("late", 1), Err(Error::FrozenRegistry { .. })));
}

#[test]
fn test_host_fallback_and_missing_keys() {
  let app = Application::new("demo");
  app.register("database", "db").unwrap();

  let fallback = app
    .resolve_or_else("cache", || Arc::new("memory") as fibre_container::Instance)
    .unwrap();
  let err = app.resolve("databse").unwrap_err();

  assert_eq!(fallback.downcast_ref::<&str>(), Some(&"memory"));
  assert_eq!(err.suggestions(), ["database".to_string()]);
}

#[test]
fn test_host_configures_its_container() {
  let app = Application::new("demo");

  app
    .configure(|config| config.namespace_separator = "-".into())
    .namespace("db", |ns| {
      ns.register("url", "postgres://localhost")?;
      Ok(())
    })
    .unwrap();

  assert_eq!(app.config().namespace_separator, "-");
  assert!(app.contains_key("db-url"));
}

#[test]
fn test_host_iterates_and_gets() {
  let app = Application::new("demo");
  app.register("one", 1_u8).unwrap().register("two", 2_u8).unwrap();

  let mut keys = Vec::new();
  app.each_key(|key| keys.push(key.to_string()));
  let mut sum = 0;
  app
    .each(|_, value| sum += *value.downcast_ref::<u8>().unwrap())
    .unwrap();

  assert_eq!(keys, vec!["one", "two"]);
  assert_eq!(sum, 3);
  assert!(app.get("one").is_some());
  assert!(app.get("three").is_none());
}

#[test]
fn test_host_merges_with_a_conflict_resolver() {
  let app = Application::new("demo");
  app.register("key", "mine").unwrap();
  let other = Container::new();
  other.register("key", "theirs").unwrap();

  app.merge_with(&other, None, |_, left, _| left).unwrap();

  assert_eq!(*app.resolve_as::<&str>("key").unwrap(), "mine");
}

#[test]
fn test_host_decorates_with_a_constructor() {
  struct Wrapped(fibre_container::Instance);

  let app = Application::new("demo");
  app.register_factory("key", || 7_u32).unwrap();

  app.decorate_with("key", Wrapped).unwrap();

  let wrapped = app.resolve_as::<Wrapped>("key").unwrap();
  assert_eq!(wrapped.0.downcast_ref::<u32>(), Some(&7));
}

#[test]
fn test_host_dup_and_clone() {
  let app = Application::new("demo");
  app.register("key", 1_u8).unwrap();

  let copy = app.dup();
  copy.register("extra", 2_u8).unwrap();
  app.freeze();
  let shared = app.clone_container();

  assert!(app.is_frozen());
  assert!(!app.contains_key("extra"));
  assert!(!copy.is_frozen());
  assert!(Arc::ptr_eq(shared.registry(), app.services.registry()));
}
