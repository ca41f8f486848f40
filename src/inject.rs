use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::hash_map::{Entry, HashMap};
use std::sync::{Arc, Mutex};

use crate::helpers::lock;
use crate::*;

/// Application-level dependency injection
pub trait Inject<T> {
    /// Obtain an instance of the target type.
    ///
    /// Return an error if the type could not be resolved
    fn inject(&self) -> Result<T, WiringError>;
}

/// Decide, at resolution time, which services are activated through their properties
pub trait InjectionHeuristic: Send + Sync {
    fn should_inject(&self, service: &ServiceKey) -> bool;
}

/// Dependency injection container built from a list of modules.
///
/// Bindings are frozen once the container is built. Singletons are created lazily on first
/// resolution and shared afterwards.
pub struct Container {
    bindings: HashMap<TypeId, Binding>,
    singletons: Mutex<TypeMap>,
    components: TypeMap,
}

impl Container {
    /// Load all modules in order, without intercepting their bindings.
    pub fn new(modules: &[Box<dyn Module>]) -> Result<Self, WiringError> {
        Self::with_recorder(modules, &NoRecorder)
    }

    /// Load all modules in order, reporting each added binding to the recorder.
    ///
    /// A binding replaces any binding registered for the same service by an earlier module.
    pub fn with_recorder(
        modules: &[Box<dyn Module>],
        recorder: &dyn BindingRecorder,
    ) -> Result<Self, WiringError> {
        let mut bindings = HashMap::new();
        for module in modules {
            let mut binder = Binder::new(module.name(), recorder);
            module.load(&mut binder)?;
            for binding in binder.into_bindings() {
                let service = binding.service();
                if bindings.insert(service.type_id(), binding).is_some() {
                    tracing::debug!(
                        "Module {} overrides the binding for {}",
                        module.name(),
                        service
                    );
                }
            }
        }
        tracing::debug!(
            "Container built from {} module(s) with {} binding(s)",
            modules.len(),
            bindings.len()
        );

        Ok(Self {
            bindings,
            singletons: Mutex::default(),
            components: TypeMap::default(),
        })
    }

    /// Add a component implementing the ```C``` capability, typically a trait object.
    pub fn register_component<C: ?Sized + Send + Sync + 'static>(&mut self, component: Arc<C>) {
        self.components
            .get_or_default::<Vec<Arc<C>>>()
            .push(component);
    }

    /// All registered components for the ```C``` capability, in registration order
    pub fn components<C: ?Sized + Send + Sync + 'static>(&self) -> &[Arc<C>] {
        self.components
            .get::<Vec<Arc<C>>>()
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_bound<T: ?Sized + 'static>(&self) -> bool {
        self.bindings.contains_key(&TypeId::of::<T>())
    }

    /// Strategy used to activate the given service
    pub fn strategy_for(&self, service: &ServiceKey) -> Strategy {
        let property = self
            .components::<dyn InjectionHeuristic>()
            .iter()
            .any(|h| h.should_inject(service));
        if property {
            Strategy::Property
        } else {
            Strategy::Constructor
        }
    }

    /// Obtain an instance of the service type ```T```.
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, WiringError> {
        let key = ServiceKey::of::<T>();
        let binding = self
            .bindings
            .get(&key.type_id())
            .ok_or(WiringError::Unbound {
                service: key.name(),
            })?;
        let singleton = binding.scope() == Scope::Singleton;

        if singleton {
            if let Some(instance) = lock(&self.singletons).get::<Arc<T>>() {
                return Ok(instance.clone());
            }
        }

        let instance = {
            let _guard = ResolutionGuard::enter(self, &key)?;
            binding
                .activation::<T>()?
                .activate(self.strategy_for(&key), &key, self)?
        };

        if !singleton {
            return Ok(instance);
        }
        // Another thread may have won the race, keep the first instance
        let mut singletons = lock(&self.singletons);
        Ok(singletons.set_if_vacant(instance).clone())
    }
}

impl<T: ?Sized + Send + Sync + 'static> Inject<Arc<T>> for Container {
    fn inject(&self) -> Result<Arc<T>, WiringError> {
        self.resolve()
    }
}

// Services being resolved on this thread, identified by container address and type
type ResolvingSlot = (usize, TypeId);

thread_local! {
    static RESOLVING: RefCell<Vec<ResolvingSlot>> = const { RefCell::new(Vec::new()) };
}

/// Mark a service as being resolved by a container on the current thread
struct ResolutionGuard(ResolvingSlot);

impl ResolutionGuard {
    fn enter(container: &Container, key: &ServiceKey) -> Result<Self, WiringError> {
        // The container is borrowed for the whole resolution, its address is stable
        let slot = (container as *const Container as usize, key.type_id());
        RESOLVING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(&slot) {
                return Err(WiringError::CyclicResolution {
                    service: key.name(),
                });
            }
            stack.push(slot);
            Ok(ResolutionGuard(slot))
        })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLVING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(pos) = stack.iter().rposition(|slot| *slot == self.0) {
                stack.remove(pos);
            }
        });
    }
}

/// Store values of [Any] type, one per type
#[derive(Default)]
struct TypeMap(HashMap<TypeId, Box<dyn Any + Send + Sync>>);

impl TypeMap {
    /// Retrieve a stored value if it exists
    fn get<T: Any>(&self) -> Option<&T> {
        self.0
            .get(&TypeId::of::<T>())
            .and_then(|b| b.downcast_ref::<T>())
    }

    fn get_or_default<T: Any + Default + Send + Sync>(&mut self) -> &mut T {
        self.0
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::<T>::default())
            .downcast_mut::<T>()
            .expect("type map entries are keyed by their own type")
    }

    /// Fill a free spot, or return the value already in place
    fn set_if_vacant<T: Any + Send + Sync>(&mut self, data: T) -> &T {
        let entry = match self.0.entry(TypeId::of::<T>()) {
            Entry::Vacant(v) => v.insert(Box::new(data)),
            Entry::Occupied(o) => o.into_mut(),
        };
        entry
            .downcast_ref::<T>()
            .expect("type map entries are keyed by their own type")
    }
}
