//! RON catalog loader
//!
//! Scans `.ron` catalog files for effect definitions and registers
//! them into an [`EffectRegistry`]. Behavior hooks live in code, not
//! assets: attach them by effect name through [`Hooks`] before
//! registration.

use crate::error::Result;
use crate::schema::EffectSchema;
use afflict_core::{AttributeStore, EffectDefinition, EffectRegistry, EntityId};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Behavior hooks keyed by (lower-cased) effect name
#[derive(Default)]
pub struct Hooks {
    tick: HashMap<String, afflict_core::EffectHook>,
    completion: HashMap<String, afflict_core::EffectHook>,
}

impl Hooks {
    /// Create an empty hook table
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a per-tick hook to a named effect
    pub fn on_tick(
        mut self,
        effect: impl Into<String>,
        hook: impl Fn(EntityId, &mut AttributeStore) + Send + Sync + 'static,
    ) -> Self {
        self.tick
            .insert(effect.into().to_ascii_lowercase(), Arc::new(hook));
        self
    }

    /// Attach a completion hook to a named effect
    pub fn on_completed(
        mut self,
        effect: impl Into<String>,
        hook: impl Fn(EntityId, &mut AttributeStore) + Send + Sync + 'static,
    ) -> Self {
        self.completion
            .insert(effect.into().to_ascii_lowercase(), Arc::new(hook));
        self
    }

    fn attach(&self, mut def: EffectDefinition) -> EffectDefinition {
        let name = def.name.to_ascii_lowercase();
        if let Some(hook) = self.tick.get(&name) {
            def.effect = Some(hook.clone());
        }
        if let Some(hook) = self.completion.get(&name) {
            def.completion = Some(hook.clone());
        }
        def
    }
}

/// Loader for RON effect catalogs
#[derive(Default)]
pub struct CatalogLoader {
    schemas: Vec<EffectSchema>,
    hooks: Hooks,
}

impl CatalogLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply the hook table applied at registration
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Load a catalog from a RON string
    pub fn load_str(&mut self, content: &str) -> Result<()> {
        #[derive(serde::Deserialize)]
        struct CatalogFile {
            effects: Vec<EffectSchema>,
        }

        let file: CatalogFile = ron::from_str(content)?;
        self.schemas.extend(file.effects);
        Ok(())
    }

    /// Load a single catalog file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let content = fs::read_to_string(path.as_ref())?;
        self.load_str(&content)
    }

    /// Load every `.ron` file under a directory, recursively
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )
            .into());
        }

        for entry in fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.extension().map(|e| e == "ron").unwrap_or(false) {
                self.load_file(&file_path)?;
            } else if file_path.is_dir() {
                self.load_directory(&file_path)?;
            }
        }

        Ok(())
    }

    /// Number of definitions loaded so far
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Check if nothing has been loaded
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Register every loaded definition into the registry
    ///
    /// Hooks are attached by name first. Duplicate names and invalid
    /// stacking configuration surface as registration errors; these
    /// are fatal catalog errors and should abort startup.
    pub fn register_into(self, registry: &mut EffectRegistry) -> Result<()> {
        for schema in self.schemas {
            let def = self.hooks.attach(schema.into_definition());
            registry.register(def)?;
        }
        Ok(())
    }
}
