use fibre_container::{Container, Namespace};
use std::sync::Arc;

struct Repository {
  table: &'static str,
}

fn main() {
  let container = Arc::new(Container::new());

  // --- Inline Namespaces ---
  container
    .namespace("settings", |ns| {
      ns.register("database_url", "postgres://localhost/app")?;
      ns.namespace("http", |http| {
        http.register("port", 8080_u16)?;
        Ok(())
      })?;
      Ok(())
    })
    .unwrap();

  // --- Reusable Namespaces ---
  // A namespace can be declared once and imported into any container.
  let repositories = Namespace::new("repositories", |ns| {
    ns.register_factory("users", || Repository { table: "users" })?;
    ns.register_factory("orders", || Repository { table: "orders" })?;
    Ok(())
  });
  container.import(repositories).unwrap();

  // --- Resolution ---
  let url = container.resolve_as::<&str>("settings.database_url").unwrap();
  let port = container.resolve_as::<u16>("settings.http.port").unwrap();
  let users = container.resolve_as::<Repository>("repositories.users").unwrap();

  println!("database: {}", url);
  println!("port: {}", port);
  println!("users table: {}", users.table);

  container.each_key(|key| println!("registered: {}", key));

  assert_eq!(*port, 8080);
  assert_eq!(users.table, "users");
  assert_eq!(container.len(), 4);
}
