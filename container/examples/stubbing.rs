use fibre_container::Container;

fn deliver(container: &Container) -> String {
  let transport = container.resolve_as::<&str>("mailer.transport").unwrap();
  format!("delivered via {}", transport)
}

fn main() {
  let container = Container::new();
  container.register("mailer.transport", "smtp").unwrap();
  container.freeze();

  // Stubs live outside the registry, so a frozen container can still be stubbed.
  container.enable_stubs();

  // --- Scoped Stubs ---
  let during = container
    .stub_scoped("mailer.transport", "in-memory", deliver)
    .unwrap();
  println!("inside the scope: {}", during);

  // --- Manual Stubs ---
  container.stub("mailer.transport", "null").unwrap();
  println!("stubbed: {}", deliver(&container));
  container.unstub("mailer.transport").unwrap();

  let after = deliver(&container);
  println!("restored: {}", after);

  assert_eq!(during, "delivered via in-memory");
  assert_eq!(after, "delivered via smtp");
}
