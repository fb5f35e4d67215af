//! Module registry
//!
//! An explicit startup-time registry of [`McpModule`] implementations,
//! keyed by each module's self-reported `metadata().name`. Built-ins are
//! registered from a constructor table; iteration follows registration
//! order so output stays deterministic.

use crate::module::cipher::CipherModule;
use crate::module::serena::SerenaModule;
use crate::module::traits::{McpModule, ModuleMetadata};

/// Constructor for a built-in module
type ModuleCtor = fn() -> Box<dyn McpModule>;

/// Built-in module constructors, in registration order
const BUILTIN: &[ModuleCtor] = &[
    || Box::new(SerenaModule::new()),
    || Box::new(CipherModule::new()),
];

/// Registry of available modules
#[derive(Default)]
pub struct ModuleRegistry {
    /// Registered modules in registration order
    modules: Vec<Box<dyn McpModule>>,
}

impl ModuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry populated with all built-in modules
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for ctor in BUILTIN {
            registry.register(ctor());
        }
        registry
    }

    /// Register a module under its self-reported metadata name.
    ///
    /// A module with the same name replaces the existing one in place,
    /// preserving registration order.
    pub fn register(&mut self, module: Box<dyn McpModule>) {
        let meta = module.metadata();
        match self
            .modules
            .iter_mut()
            .find(|m| m.metadata().name == meta.name)
        {
            Some(existing) => {
                tracing::warn!("Replacing already-registered module: {}", meta.name);
                *existing = module;
            }
            None => {
                tracing::debug!("Registered module: {} v{}", meta.name, meta.version);
                self.modules.push(module);
            }
        }
    }

    /// Look up a module by name
    pub fn get(&self, name: &str) -> Option<&dyn McpModule> {
        self.modules
            .iter()
            .find(|m| m.metadata().name == name)
            .map(|m| m.as_ref())
    }

    /// Modules matching the requested names, in registration order.
    ///
    /// Unknown names are dropped with a warning; checking that every
    /// requested name exists is the installer's job, not this lookup's.
    pub fn enabled(&self, names: &[String]) -> Vec<&dyn McpModule> {
        for name in names {
            if self.get(name).is_none() {
                tracing::warn!("Module {} not found", name);
            }
        }
        self.modules
            .iter()
            .filter(|m| names.iter().any(|n| *n == m.metadata().name))
            .map(|m| m.as_ref())
            .collect()
    }

    /// Requested names with no registered module
    pub fn unknown_names(&self, names: &[String]) -> Vec<String> {
        names
            .iter()
            .filter(|name| self.get(name).is_none())
            .cloned()
            .collect()
    }

    /// Metadata for every registered module, in registration order
    pub fn list(&self) -> Vec<ModuleMetadata> {
        self.modules.iter().map(|m| m.metadata()).collect()
    }

    /// Validate requirements for the requested modules.
    ///
    /// Aggregates every failure (including unknown names) instead of
    /// stopping at the first.
    pub fn validate_all(&self, names: &[String]) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        for name in names {
            match self.get(name) {
                Some(module) => {
                    if let Err(error) = module.validate_requirements() {
                        errors.push(format!("{}: {}", name, error));
                    }
                }
                None => errors.push(format!("Module '{}' not found", name)),
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Forget a module and re-register it from the built-in table.
    ///
    /// The fresh instance takes the old one's registration slot, so
    /// iteration order is unchanged. Development convenience only; returns
    /// true if the module was known and is registered again afterwards.
    pub fn reload(&mut self, name: &str) -> bool {
        let Some(index) = self
            .modules
            .iter()
            .position(|m| m.metadata().name == name)
        else {
            return false;
        };
        for ctor in BUILTIN {
            let module = ctor();
            if module.metadata().name == name {
                self.modules[index] = module;
                return true;
            }
        }
        // Known but not built-in: forget it entirely.
        self.modules.remove(index);
        false
    }

    /// Number of registered modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
