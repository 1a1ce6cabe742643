//! Effect definition registry
//!
//! Write-once-per-name catalog of effect definitions. Names, status
//! attributes, and modifier keys/targets are lower-cased on insert,
//! making every later lookup case-insensitive by construction. There
//! is no removal: effect catalogs are closed after load time.

use crate::{EffectDefinition, Error, Result};
use indexmap::IndexMap;

/// Catalog of registered effect definitions keyed by normalized name
#[derive(Debug, Clone, Default)]
pub struct EffectRegistry {
    defs: IndexMap<String, EffectDefinition>,
}

impl EffectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition
    ///
    /// Fails with `DuplicateName` if the normalized name is already
    /// present and `InvalidConfig` if the definition is stackable
    /// without a positive `max_stacks`. Both are fatal catalog errors
    /// at load time.
    pub fn register(&mut self, mut def: EffectDefinition) -> Result<()> {
        def.name = def.name.to_ascii_lowercase();

        if self.defs.contains_key(&def.name) {
            return Err(Error::DuplicateName(def.name));
        }
        if def.stackable && !def.max_stacks.is_some_and(|max| max > 0) {
            return Err(Error::InvalidConfig(format!(
                "stackable effect `{}` requires a positive max_stacks",
                def.name
            )));
        }

        for attr in &mut def.status_attributes {
            *attr = attr.to_ascii_lowercase();
        }
        def.modifiers = def
            .modifiers
            .into_iter()
            .map(|(trigger, target)| (trigger.to_ascii_lowercase(), target.to_ascii_lowercase()))
            .collect();

        self.defs.insert(def.name.clone(), def);
        Ok(())
    }

    /// Look up a definition by name, case-insensitively
    pub fn lookup(&self, name: &str) -> Option<&EffectDefinition> {
        if let Some(def) = self.defs.get(name) {
            return Some(def);
        }
        // registry keys are already folded; only refold mixed-case input
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            self.defs.get(&name.to_ascii_lowercase())
        } else {
            None
        }
    }

    /// Iterate over registered (normalized) names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(String::as_str)
    }

    /// Number of registered definitions
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Check if no definitions are registered
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
