use std::any::{type_name, TypeId};
use std::fmt;

use crate::{Binding, ServiceKey, WiringError};

/// A unit declaring a set of service bindings.
///
/// Modules never touch the container directly: all bindings go through the [Binder]
/// handed to [Module::load], which reports each of them to its [BindingRecorder].
pub trait Module: Send + Sync + 'static {
    fn load(&self, binder: &mut Binder<'_>) -> Result<(), WiringError>;

    fn name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// Identify a module by its concrete type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModuleId {
    type_id: TypeId,
    name: &'static str,
}

impl ModuleId {
    pub fn of<T: Module>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Observe every binding added by a module
pub trait BindingRecorder: Send + Sync {
    fn record_binding(&self, service: &ServiceKey);
}

/// Recorder ignoring all bindings
pub struct NoRecorder;

impl BindingRecorder for NoRecorder {
    fn record_binding(&self, _service: &ServiceKey) {}
}

/// Collect the bindings of a single module
pub struct Binder<'a> {
    module: &'static str,
    recorder: &'a dyn BindingRecorder,
    bindings: Vec<Binding>,
}

impl<'a> Binder<'a> {
    pub(crate) fn new(module: &'static str, recorder: &'a dyn BindingRecorder) -> Self {
        Self {
            module,
            recorder,
            bindings: Vec::new(),
        }
    }

    /// Name of the module being loaded
    pub fn module(&self) -> &'static str {
        self.module
    }

    /// Record the service type of the binding, then register it.
    pub fn add_binding(&mut self, binding: Binding) -> &mut Self {
        self.recorder.record_binding(&binding.service());
        self.bindings.push(binding);
        self
    }

    pub(crate) fn into_bindings(self) -> Vec<Binding> {
        self.bindings
    }
}
