//! Tag bound service types for property injection.
//!
//! [AutoInjection] sits on both sides of the container: while modules load it records the
//! service type of every binding, and once installed as an [InjectionHeuristic] it tells the
//! container to prefer property activation for the recorded types.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::helpers::lock;
use crate::*;

/// Set of service types requiring property injection
#[derive(Default)]
pub struct AutoInjection {
    types: Mutex<HashSet<ServiceKey>>,
}

impl AutoInjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a service type to the set. Recording the same type again has no effect.
    pub fn record_binding(&self, service: &ServiceKey) {
        if lock(&self.types).insert(*service) {
            tracing::trace!("Recorded {} for property injection", service);
        }
    }

    /// Snapshot of the recorded service types, in no particular order
    pub fn should_inject_property_types(&self) -> Vec<ServiceKey> {
        lock(&self.types).iter().copied().collect()
    }

    pub fn contains(&self, service: &ServiceKey) -> bool {
        lock(&self.types).contains(service)
    }

    pub fn len(&self) -> usize {
        lock(&self.types).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.types).is_empty()
    }

    /// Forget all recorded types
    pub(crate) fn clear(&self) {
        lock(&self.types).clear();
    }
}

impl BindingRecorder for AutoInjection {
    fn record_binding(&self, service: &ServiceKey) {
        AutoInjection::record_binding(self, service)
    }
}

impl InjectionHeuristic for AutoInjection {
    fn should_inject(&self, service: &ServiceKey) -> bool {
        self.contains(service)
    }
}
