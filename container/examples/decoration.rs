use fibre_container::{Container, Instance};
use std::sync::Arc;

// --- Abstraction and Implementations ---
trait Greeter: Send + Sync {
  fn greet(&self, name: &str) -> String;
}

struct Plain;
impl Greeter for Plain {
  fn greet(&self, name: &str) -> String {
    format!("Hello, {}", name)
  }
}

// Wraps another greeter and shouts its output.
struct Loud {
  inner: Arc<dyn Greeter>,
}
impl Greeter for Loud {
  fn greet(&self, name: &str) -> String {
    self.inner.greet(name).to_uppercase()
  }
}

fn main() {
  let container = Container::new();

  // Trait objects are stored behind an extra `Arc` so they can be downcast.
  container
    .register_memoized("greeter", || Arc::new(Plain) as Arc<dyn Greeter>)
    .unwrap();

  // --- Decoration ---
  container
    .decorate("greeter", |value: Instance| {
      let inner = value.downcast_ref::<Arc<dyn Greeter>>().unwrap().clone();
      Arc::new(Arc::new(Loud { inner }) as Arc<dyn Greeter>) as Instance
    })
    .unwrap();

  let greeter = container.resolve_as::<Arc<dyn Greeter>>("greeter").unwrap();
  let message = greeter.greet("fibre");
  println!("{}", message);

  assert_eq!(message, "HELLO, FIBRE");
}
