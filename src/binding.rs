//! Bindings associate a service type with the way its instances are activated.
//!
//! A binding can carry two activations for the same service:
//!
//! * a constructor activation, a function building the instance from its injected dependencies,
//! * a property activation, which default-constructs a concrete type and then fills its
//!   properties from the container (see [InjectProperties]).
//!
//! The container picks one of them at resolution time, based on its injection heuristics.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::{Container, ServiceKey, WiringError};

/// Build an instance of a service from the container
pub type Factory<T> = Arc<dyn Fn(&Container) -> Result<Arc<T>, WiringError> + Send + Sync>;

/// Lifetime of the instances produced by a binding
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scope {
    /// A new instance on each resolution
    #[default]
    Transient,
    /// A single shared instance, created on first resolution
    Singleton,
}

/// Injection strategy selected for a service at resolution time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Constructor,
    Property,
}

/// Types which can be default-constructed and then receive their dependencies through properties.
pub trait InjectProperties: Default {
    fn inject_properties(&mut self, container: &Container) -> Result<(), WiringError>;
}

/// Activation paths for a single service type
pub(crate) struct Activation<T: ?Sized> {
    constructor: Option<Factory<T>>,
    properties: Option<Factory<T>>,
}

impl<T: ?Sized> Activation<T> {
    /// Activate using the preferred strategy, falling back to the other one if it is missing.
    pub(crate) fn activate(
        &self,
        strategy: Strategy,
        key: &ServiceKey,
        container: &Container,
    ) -> Result<Arc<T>, WiringError> {
        let (preferred, fallback) = match strategy {
            Strategy::Constructor => (&self.constructor, &self.properties),
            Strategy::Property => (&self.properties, &self.constructor),
        };
        match preferred.as_ref().or(fallback.as_ref()) {
            Some(factory) => factory(container),
            None => Err(WiringError::NoActivation {
                service: key.name(),
            }),
        }
    }
}

/// Type-erased association between a service key and its activation
pub struct Binding {
    service: ServiceKey,
    scope: Scope,
    activation: Box<dyn Any + Send + Sync>,
}

impl Binding {
    /// Start a new binding for the service type ```T```
    pub fn bind<T: ?Sized + Send + Sync + 'static>() -> BindingBuilder<T> {
        BindingBuilder {
            constructor: None,
            properties: None,
            scope: Scope::default(),
            _service: PhantomData,
        }
    }

    pub fn service(&self) -> ServiceKey {
        self.service
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub(crate) fn activation<T: ?Sized + 'static>(&self) -> Result<&Activation<T>, WiringError> {
        self.activation
            .downcast_ref::<Activation<T>>()
            .ok_or(WiringError::TypeMismatch {
                service: self.service.name(),
            })
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("service", &self.service)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Fluent construction of a [Binding]
pub struct BindingBuilder<T: ?Sized> {
    constructor: Option<Factory<T>>,
    properties: Option<Factory<T>>,
    scope: Scope,
    _service: PhantomData<fn() -> Box<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> BindingBuilder<T> {
    /// Activate the service by calling a constructor function.
    ///
    /// The function receives the container to resolve its own dependencies.
    pub fn to_constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(&Container) -> Result<Arc<T>, WiringError> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(constructor));
        self
    }

    /// Activate the service by default-constructing ```C``` and injecting its properties.
    ///
    /// The ```wrap``` function converts the concrete instance into the service type,
    /// typically ```|c| Arc::new(c)``` for a trait object.
    pub fn to_properties<C, W>(mut self, wrap: W) -> Self
    where
        C: InjectProperties,
        W: Fn(C) -> Arc<T> + Send + Sync + 'static,
    {
        self.properties = Some(Arc::new(
            move |container: &Container| -> Result<Arc<T>, WiringError> {
                let mut instance = C::default();
                instance.inject_properties(container)?;
                Ok(wrap(instance))
            },
        ));
        self
    }

    /// Always return the same instance
    pub fn to_constant(self, instance: Arc<T>) -> Self {
        self.to_constructor(move |_| Ok(instance.clone()))
    }

    pub fn in_singleton_scope(mut self) -> Self {
        self.scope = Scope::Singleton;
        self
    }

    pub fn in_transient_scope(mut self) -> Self {
        self.scope = Scope::Transient;
        self
    }

    pub fn build(self) -> Binding {
        Binding {
            service: ServiceKey::of::<T>(),
            scope: self.scope,
            activation: Box::new(Activation {
                constructor: self.constructor,
                properties: self.properties,
            }),
        }
    }
}
