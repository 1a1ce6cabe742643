//! Serde schema for effect catalogs
//!
//! Assets describe only the data half of a definition; behavior hooks
//! are code and get attached by name at registration time.

use afflict_core::EffectDefinition;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One effect definition as it appears in a RON catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectSchema {
    /// Unique effect name (case-insensitive)
    pub name: String,
    /// Total lifetime of one instance, in seconds
    pub duration: f64,
    /// Seconds between tick-hook invocations; 0 disables ticking
    #[serde(default)]
    pub tick_interval: f64,
    /// Whether repeated application compounds into stacks
    #[serde(default)]
    pub stackable: bool,
    /// Stack cap; required when `stackable`
    #[serde(default)]
    pub max_stacks: Option<u32>,
    /// Attribute names external observers key off for this effect
    #[serde(default)]
    pub status_attributes: Vec<String>,
    /// Trigger-attribute name -> target-effect name transitions
    #[serde(default)]
    pub modifiers: IndexMap<String, String>,
}

impl EffectSchema {
    /// Convert into a hook-less core definition
    ///
    /// Validation (stackable cap, duplicates) is the registry's job;
    /// the schema is a plain carrier.
    pub fn into_definition(self) -> EffectDefinition {
        let mut def = EffectDefinition::new(self.name, self.duration, self.tick_interval);
        def.stackable = self.stackable;
        def.max_stacks = self.max_stacks;
        def.status_attributes = self.status_attributes;
        def.modifiers = self.modifiers;
        def
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_defaults() {
        let schema: EffectSchema = ron::from_str(
            r#"(
                name: "shield",
                duration: 5.0,
            )"#,
        )
        .unwrap();

        assert_eq!(schema.tick_interval, 0.0);
        assert!(!schema.stackable);
        assert!(schema.max_stacks.is_none());
        assert!(schema.modifiers.is_empty());
    }

    #[test]
    fn test_into_definition() {
        let schema: EffectSchema = ron::from_str(
            r#"(
                name: "burn",
                duration: 6.0,
                tick_interval: 1.0,
                stackable: true,
                max_stacks: Some(3),
                status_attributes: ["onfire"],
                modifiers: { "soaked": "steam" },
            )"#,
        )
        .unwrap();

        let def = schema.into_definition();
        assert_eq!(def.name, "burn");
        assert!(def.stackable);
        assert_eq!(def.max_stacks, Some(3));
        assert_eq!(def.modifiers.get("soaked").map(String::as_str), Some("steam"));
        assert!(def.effect.is_none());
    }
}
