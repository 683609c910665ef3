//! Resource Registry
//!
//! Composes resource definitions by type name. Nothing registers itself: the
//! caller builds the registry and adds each definition explicitly.

use super::schema::Schema;
use std::collections::BTreeMap;

/// Schema plus metadata for one resource type
#[derive(Debug, Clone)]
pub struct ResourceDefinition {
    pub type_name: &'static str,
    pub schema: Schema,
    /// Existing resources can be adopted from their id
    pub importable: bool,
}

/// Resource definitions keyed by type name
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    resources: BTreeMap<&'static str, ResourceDefinition>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every resource this crate implements
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(super::elastic_pool::elastic_pool_definition());
        registry
    }

    /// Add a definition, returning the one it replaced
    pub fn register(&mut self, definition: ResourceDefinition) -> Option<ResourceDefinition> {
        tracing::debug!("Registering resource type {}", definition.type_name);
        self.resources.insert(definition.type_name, definition)
    }

    pub fn get(&self, type_name: &str) -> Option<&ResourceDefinition> {
        self.resources.get(type_name)
    }

    /// All registered type names (sorted)
    pub fn type_names(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
