//! Process-wide engine registry.
//!
//! Maps engine identifiers to backend instances. Built once at startup
//! and shared by reference into the orchestrator; never mutated after
//! construction. Unknown identifiers resolve to `None` — the caller
//! reports them per engine, never as a fatal error.

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::{EngineBackend, EngineDescriptor};
use crate::engines::{Aol, Ask, Bing, DuckDuckGo, Startpage, Torch, Yahoo};

/// Immutable engine-id → backend map.
pub struct EngineRegistry {
    backends: HashMap<&'static str, Arc<dyn EngineBackend>>,
}

impl EngineRegistry {
    /// Creates an empty registry.
    pub fn empty() -> Self {
        Self {
            backends: HashMap::new(),
        }
    }

    /// Creates the registry of built-in engines.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(Bing::new()));
        registry.register(Arc::new(Yahoo::new()));
        registry.register(Arc::new(Aol::new()));
        registry.register(Arc::new(DuckDuckGo::new()));
        registry.register(Arc::new(Startpage::new()));
        registry.register(Arc::new(Ask::new()));
        registry.register(Arc::new(Torch::new()));
        registry
    }

    /// Registers a backend under its descriptor id. Intended for
    /// registry construction at startup (and custom backends in tests).
    pub fn register(&mut self, backend: Arc<dyn EngineBackend>) {
        self.backends.insert(backend.descriptor().id, backend);
    }

    /// Looks up a backend by identifier.
    pub fn get(&self, id: &str) -> Option<Arc<dyn EngineBackend>> {
        self.backends.get(id).cloned()
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.backends.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Descriptors of all registered engines, sorted by id.
    pub fn descriptors(&self) -> Vec<EngineDescriptor> {
        let mut descriptors: Vec<_> = self
            .backends
            .values()
            .map(|b| b.descriptor().clone())
            .collect();
        descriptors.sort_by_key(|d| d.id);
        descriptors
    }

    /// Number of registered engines.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
