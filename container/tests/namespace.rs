use fibre_container::{Container, Error, Namespace};
use pretty_assertions::assert_eq;

#[test]
fn test_namespace_prefixes_registered_keys() {
  // Arrange
  let container = Container::new();

  // Act
  container
    .namespace("one", |ns| {
      ns.register("two", 2)?;
      Ok(())
    })
    .unwrap();

  // Assert
  assert_eq!(*container.resolve_as::<i32>("one.two").unwrap(), 2);
  assert!(!container.contains_key("two"));
}

#[test]
fn test_nested_namespaces_compose_prefixes() {
  let container = Container::new();

  container
    .namespace("one", |ns| {
      ns.namespace("two", |ns| {
        ns.register("three", 3)?;
        Ok(())
      })?;
      Ok(())
    })
    .unwrap();

  assert_eq!(*container.resolve_as::<i32>("one.two.three").unwrap(), 3);
  assert_eq!(container.keys(), vec!["one.two.three"]);
}

#[test]
fn test_custom_separator_changes_composed_keys() {
  let container = Container::new();
  container.configure(|config| config.namespace_separator = "-".to_string());

  container
    .namespace("a", |ns| {
      ns.namespace("b", |ns| {
        ns.register("c", 1)?;
        Ok(())
      })?;
      Ok(())
    })
    .unwrap();

  assert_eq!(*container.resolve_as::<i32>("a-b-c").unwrap(), 1);
  assert!(!container.contains_key("a.b.c"));
}

#[test]
fn test_scope_resolves_siblings_relative_to_its_prefix() {
  let container = Container::new();

  container
    .namespace("one", |ns| {
      ns.register("two", 2)?;
      let two = ns.resolve_as::<i32>("two")?;
      ns.register("three", *two)?;
      Ok(())
    })
    .unwrap();

  assert_eq!(*container.resolve_as::<i32>("one.three").unwrap(), 2);
}

#[test]
fn test_scope_falls_back_to_existing_container_entries() {
  let container = Container::new();
  container.register("one.base", 40).unwrap();

  container
    .namespace("one", |ns| {
      let base = ns.resolve_as::<i32>("base")?;
      ns.register("answer", *base + 2)?;
      Ok(())
    })
    .unwrap();

  assert_eq!(*container.resolve_as::<i32>("one.answer").unwrap(), 42);
}

#[test]
fn test_scope_reports_its_full_prefix() {
  let container = Container::new();
  let mut seen = Vec::new();

  container
    .namespace("one", |ns| {
      seen.push(ns.prefix().to_string());
      ns.namespace("two", |inner| {
        seen.push(inner.qualify("key"));
        Ok(())
      })?;
      Ok(())
    })
    .unwrap();

  assert_eq!(seen, vec!["one", "one.two.key"]);
}

#[test]
fn test_import_detached_namespace() {
  let container = Container::new();
  let ns = Namespace::new("one", |ns| {
    ns.register("two", 2)?;
    Ok(())
  });

  container.import(ns).unwrap();

  assert_eq!(*container.resolve_as::<i32>("one.two").unwrap(), 2);
}

#[test]
fn test_import_inside_a_namespace_composes_prefixes() {
  let container = Container::new();
  let ns = Namespace::new("two", |ns| {
    ns.register("three", 3)?;
    Ok(())
  });

  container
    .namespace("one", |outer| {
      outer.import(ns)?;
      Ok(())
    })
    .unwrap();

  assert_eq!(*container.resolve_as::<i32>("one.two.three").unwrap(), 3);
}

#[test]
fn test_failed_namespace_registers_nothing() {
  // Arrange
  let container = Container::new();
  container.register("one.taken", 0).unwrap();

  // Act: the first key is fine, the second collides with an existing entry.
  let err = container
    .namespace("one", |ns| {
      ns.register("fresh", 1)?;
      ns.register("taken", 2)?;
      Ok(())
    })
    .unwrap_err();

  // Assert
  assert_eq!(err, Error::KeyConflict { key: "one.taken".into() });
  assert!(!container.contains_key("one.fresh"));
  assert_eq!(*container.resolve_as::<i32>("one.taken").unwrap(), 0);
}

#[test]
fn test_error_inside_the_block_aborts_the_namespace() {
  let container = Container::new();

  let result = container.namespace("one", |ns| {
    ns.register("two", 2)?;
    ns.resolve("missing")?;
    Ok(())
  });

  assert!(matches!(result, Err(Error::KeyNotFound { ref key, .. }) if key == "one.missing"));
  assert!(container.is_empty());
}

#[test]
fn test_duplicate_key_inside_one_block_conflicts() {
  let container = Container::new();

  let result = container.namespace("one", |ns| {
    ns.register("two", 2)?;
    ns.register("two", 3)?;
    Ok(())
  });

  assert!(matches!(result, Err(Error::KeyConflict { ref key }) if key == "one.two"));
}

#[test]
fn test_namespace_on_frozen_container_fails() {
  let container = Container::new();
  container.freeze();

  let result = container.namespace("one", |ns| {
    ns.register("two", 2)?;
    Ok(())
  });

  assert!(matches!(result, Err(Error::FrozenRegistry { ref key }) if key == "one.two"));
}
