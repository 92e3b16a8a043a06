//! Extension trait for packages of scalar functions.

use crate::registry::FunctionRegistry;

/// Trait that every function extension implements.
///
/// Extensions are loaded once into a `FunctionRegistry` at startup via
/// `FunctionRegistry::load`.
pub trait ScalarExtension: Send + Sync {
    /// Extension name (e.g., "json").
    fn name(&self) -> &str;

    /// Register every function this extension provides.
    fn register(&self, registry: &mut FunctionRegistry);
}
