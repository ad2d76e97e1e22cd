use fibre_container::{Container, Error, Instance};
use std::sync::Arc;

fn main() {
  let container = Container::new();
  container.register("database", "primary").unwrap();
  container.register("data_dir", "/var/lib/app").unwrap();

  // --- Fallible Resolution ---
  println!("Resolving a misspelled key...");
  match container.resolve("databse") {
    Ok(_) => panic!("Should not have found the key!"),
    Err(err @ Error::KeyNotFound { .. }) => {
      println!("{}", err);
      println!("suggestions: {:?}", err.suggestions());
      assert_eq!(err.suggestions()[0], "database");
    }
    Err(other) => panic!("unexpected error: {}", other),
  }

  // --- Optional Resolution ---
  assert!(container.get("cache").is_none());
  println!("Correctly received `None` for the missing key.");

  // --- Fallbacks ---
  let cache = container
    .resolve_or_else("cache", || Arc::new("in-memory") as Instance)
    .unwrap();
  println!("cache: {}", cache.downcast_ref::<&str>().unwrap());
  assert!(!container.contains_key("cache"));
}
