//! Service keys and the errors raised while wiring a [Container](crate::Container).
//!
//! A [ServiceKey] identifies the requested type of a binding. It wraps the [TypeId] of the
//! service, which can be a concrete type or a trait object such as ```dyn Logger```, and keeps
//! the type name around for diagnostics.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use thiserror::Error;

/// Identify a service type
#[derive(Clone, Copy, Debug)]
pub struct ServiceKey {
    id: TypeId,
    name: &'static str,
}

impl ServiceKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Full type name of the service, as reported by [type_name]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

// Type names are not guaranteed to be unique, only the TypeId is used for identity
impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Errors triggered while loading modules or resolving services
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WiringError {
    #[error("No binding registered for {service}")]
    Unbound { service: &'static str },
    #[error("Cyclic dependencies: {service} is already being resolved")]
    CyclicResolution { service: &'static str },
    #[error("Consistency error: the binding for {service} does not produce this type")]
    TypeMismatch { service: &'static str },
    #[error("The binding for {service} has neither a constructor nor a property activation")]
    NoActivation { service: &'static str },
    #[error("Module {module} could not be loaded: {reason}")]
    InvalidModule { module: &'static str, reason: String },
}
