//! Write-once bootstrap of a dependency injection container, assembled from modules
//! contributed by independent parts of an application.
//!
//! # Simple use case
//!
//! ```
//! # use std::sync::Arc;
//! # use hanami_context::*;
//! // Define traits and implementors
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! #[derive(Default)]
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "Hello world".to_string()
//!     }
//! }
//!
//! // Define a module declaring the bindings
//! #[derive(Default)]
//! struct GreetModule;
//!
//! impl Module for GreetModule {
//!     fn load(&self, binder: &mut Binder<'_>) -> Result<(), WiringError> {
//!         binder.add_binding(
//!             Binding::bind::<dyn Greeter>()
//!                 .to_constructor(|_| {
//!                     let greeter: Arc<dyn Greeter> = Arc::new(English);
//!                     Ok(greeter)
//!                 })
//!                 .in_singleton_scope()
//!                 .build(),
//!         );
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<(), BootstrapError> {
//! // Any part of the application can contribute modules and deferred actions
//! let context = BootstrapCoordinator::new();
//! context.add_module::<GreetModule>().use_action(|container| {
//!     if let Ok(greeter) = container.resolve::<dyn Greeter>() {
//!         println!("{}", greeter.greet());
//!     }
//! });
//!
//! // The first call builds the container, the others do nothing
//! context.initialize()?;
//! context.initialize()?;
//! assert!(context.initialized());
//! # Ok(())
//! # }
//! ```
//!
//! # Mechanism
//!
//! The [BootstrapCoordinator] accumulates module factories, deduplicated by module type, and
//! deferred actions. Its first [initialize](BootstrapCoordinator::initialize) call constructs
//! the modules, builds a [Container] from them in registration order, then runs the deferred
//! actions against it. The coordinator is frozen afterwards: new modules and the auto-injection
//! toggle are ignored.
//!
//! * A [Module] declares its [Binding]s through a [Binder]. The binder reports every binding
//!   to a [BindingRecorder] before storing it.
//! * A [Binding] can activate its service through a constructor function or through property
//!   injection ([InjectProperties]).
//! * [AutoInjection] records all bound service types. When enabled with
//!   [with_auto_injection](BootstrapCoordinator::with_auto_injection), it is installed in the
//!   container as an [InjectionHeuristic] and property injection is preferred for these types.

mod auto_inject;
mod binding;
mod context;
mod helpers;
mod inject;
mod module;
mod resolve;

pub use auto_inject::AutoInjection;
pub use binding::{Binding, BindingBuilder, Factory, InjectProperties, Scope, Strategy};
pub use context::{BootstrapCoordinator, BootstrapError};
pub use inject::{Container, Inject, InjectionHeuristic};
pub use module::{Binder, BindingRecorder, Module, ModuleId, NoRecorder};
pub use resolve::{ServiceKey, WiringError};
