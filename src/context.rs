//! Write-once bootstrap of the application container.
//!
//! Independent parts of an application register their modules and deferred actions on a
//! [BootstrapCoordinator], then any of them calls [BootstrapCoordinator::initialize]. The first
//! call builds the container, later calls have no effect.

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::helpers::lock;
use crate::*;

type BoxError = Box<dyn StdError + Send + Sync>;
type ModuleFactory = Box<dyn Fn() -> Result<Box<dyn Module>, BoxError> + Send>;
type Action = Box<dyn FnOnce(&Arc<Container>) + Send>;

// The process-wide coordinator, created on first access
static GLOBAL_COORDINATOR: Lazy<BootstrapCoordinator> = Lazy::new(BootstrapCoordinator::new);

/// Errors aborting the initialization.
///
/// The coordinator stays uninitialized after any of them and [BootstrapCoordinator::initialize]
/// can be called again.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Failed to construct module {module}")]
    ModuleConstruction {
        module: &'static str,
        #[source]
        source: BoxError,
    },
    #[error(transparent)]
    Container(#[from] WiringError),
}

struct ModuleEntry {
    id: ModuleId,
    factory: ModuleFactory,
}

#[derive(Default)]
struct State {
    modules: Vec<ModuleEntry>,
    auto_injection: bool,
    actions: VecDeque<Action>,
    // Built but still running its deferred actions
    built: Option<Arc<Container>>,
    // Set once, when all deferred actions have run
    container: Option<Arc<Container>>,
}

/// Collect modules and deferred actions, then build the container exactly once.
///
/// All operations are serialized by a single lock, including the container construction:
/// concurrent calls to [initialize](Self::initialize) wait for the first one to complete.
/// Deferred actions run while this lock is held and must not call back into the coordinator.
pub struct BootstrapCoordinator {
    state: Mutex<State>,
    auto_inject: Arc<AutoInjection>,
}

impl Default for BootstrapCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl BootstrapCoordinator {
    /// Create an independent coordinator, for use at an explicit composition root or in tests.
    pub fn new() -> Self {
        Self {
            state: Mutex::default(),
            auto_inject: Arc::new(AutoInjection::new()),
        }
    }

    /// The process-wide coordinator
    pub fn global() -> &'static BootstrapCoordinator {
        &GLOBAL_COORDINATOR
    }

    /// Register a default-constructed module of type ```T```.
    ///
    /// Nothing happens if the coordinator is initialized or if a module of the same type is
    /// already registered.
    pub fn add_module<T: Module + Default>(&self) -> &Self {
        self.add_module_with(|| Ok::<T, std::convert::Infallible>(T::default()))
    }

    /// Register a module of type ```T``` built by the given factory.
    ///
    /// The factory is called during [initialize](Self::initialize), where its failure aborts
    /// the initialization. Skipped under the same conditions as [add_module](Self::add_module).
    pub fn add_module_with<T, F, E>(&self, factory: F) -> &Self
    where
        T: Module,
        F: Fn() -> Result<T, E> + Send + 'static,
        E: Into<BoxError>,
    {
        let id = ModuleId::of::<T>();
        let mut state = lock(&self.state);
        if state.container.is_some() {
            tracing::trace!("Already initialized, ignoring module {}", id);
            return self;
        }
        if state.modules.iter().any(|m| m.id == id) {
            tracing::trace!("Module {} is already registered", id);
            return self;
        }

        tracing::debug!("Registering module {}", id);
        state.modules.push(ModuleEntry {
            id,
            factory: Box::new(move || -> Result<Box<dyn Module>, BoxError> {
                factory()
                    .map(|m| Box::new(m) as Box<dyn Module>)
                    .map_err(Into::into)
            }),
        });
        self
    }

    /// Install the auto-injection heuristic when the container is built
    pub fn with_auto_injection(&self) -> &Self {
        let mut state = lock(&self.state);
        if state.container.is_none() && !state.auto_injection {
            tracing::debug!("Enabling auto-injection");
            state.auto_injection = true;
        }
        self
    }

    /// Run an action against the built container.
    ///
    /// Before initialization the action is queued and runs during
    /// [initialize](Self::initialize), in registration order. Once initialized, it runs
    /// immediately on the calling thread.
    pub fn use_action<F>(&self, action: F) -> &Self
    where
        F: FnOnce(&Arc<Container>) + Send + 'static,
    {
        let mut state = lock(&self.state);
        let Some(container) = state.container.clone() else {
            state.actions.push_back(Box::new(action));
            return self;
        };
        drop(state);

        tracing::debug!("Already initialized, running action immediately");
        action(&container);
        self
    }

    /// Build the container, unless it already exists.
    ///
    /// Modules are constructed and loaded in registration order, the auto-injection heuristic
    /// is installed if enabled, and the queued actions are executed. If the build fails nothing
    /// is committed: the registered modules and actions are kept for another attempt.
    ///
    /// If a deferred action panics, the built container and the actions not yet started are
    /// kept: the next call resumes with them instead of building again.
    pub fn initialize(&self) -> Result<(), BootstrapError> {
        let mut state = lock(&self.state);
        if state.container.is_some() {
            tracing::trace!("Container already initialized");
            return Ok(());
        }

        let container = match state.built.clone() {
            Some(container) => {
                tracing::debug!("Resuming deferred actions on the built container");
                container
            }
            None => match self.build(&state) {
                Ok(container) => {
                    let container = Arc::new(container);
                    state.built = Some(container.clone());
                    container
                }
                Err(e) => {
                    tracing::error!("Container initialization failed: {}", e);
                    self.auto_inject.clear();
                    return Err(e);
                }
            },
        };

        let mut action_count = 0;
        while let Some(action) = state.actions.pop_front() {
            action(&container);
            action_count += 1;
        }

        state.built = None;
        state.container = Some(container);
        tracing::info!(
            "Container initialized with {} module(s), {} deferred action(s), auto-injection {}",
            state.modules.len(),
            action_count,
            if state.auto_injection { "on" } else { "off" }
        );
        Ok(())
    }

    fn build(&self, state: &State) -> Result<Container, BootstrapError> {
        let modules = state
            .modules
            .iter()
            .map(|entry| {
                (entry.factory)().map_err(|source| BootstrapError::ModuleConstruction {
                    module: entry.id.name(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut container = Container::with_recorder(&modules, &*self.auto_inject)?;
        if state.auto_injection {
            let heuristic: Arc<dyn InjectionHeuristic> = self.auto_inject.clone();
            container.register_component(heuristic);
        }
        Ok(container)
    }

    pub fn initialized(&self) -> bool {
        lock(&self.state).container.is_some()
    }

    pub fn auto_injection_enabled(&self) -> bool {
        lock(&self.state).auto_injection
    }

    /// Registered modules, in load order
    pub fn modules(&self) -> Vec<ModuleId> {
        lock(&self.state).modules.iter().map(|m| m.id).collect()
    }

    /// Service types recorded for property injection
    pub fn inject_types(&self) -> Vec<ServiceKey> {
        let _state = lock(&self.state);
        self.auto_inject.should_inject_property_types()
    }

    /// The built container, once initialized
    pub fn container(&self) -> Option<Arc<Container>> {
        lock(&self.state).container.clone()
    }
}

impl fmt::Debug for BootstrapCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("BootstrapCoordinator")
            .field(
                "modules",
                &state.modules.iter().map(|m| m.id.name()).collect::<Vec<_>>(),
            )
            .field("auto_injection", &state.auto_injection)
            .field("pending_actions", &state.actions.len())
            .field("initialized", &state.container.is_some())
            .finish()
    }
}
