//! Effect definition templates
//!
//! A definition is the immutable description of one status effect:
//! timing, stacking policy, attribute metadata, modifier transitions,
//! and the behavior hooks the engine runs on tick and completion.

use crate::{AttributeStore, EntityId};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Side-effecting behavior hook run by the engine
///
/// Hooks receive the afflicted entity and mutable access to the
/// attribute store. They run synchronously on the engine's control
/// thread; writes they make never re-trigger modifier transitions.
pub type EffectHook = Arc<dyn Fn(EntityId, &mut AttributeStore) + Send + Sync>;

/// Immutable template describing a status effect
///
/// Names, status attributes, and modifier keys/targets are lower-cased
/// by the registry on insert, so every later comparison is direct.
#[derive(Clone)]
pub struct EffectDefinition {
    /// Unique name; the registry key and the entity presence flag
    pub name: String,
    /// Total lifetime of one instance, in seconds
    pub duration: f64,
    /// Seconds between tick-hook invocations; `<= 0` disables ticking
    pub tick_interval: f64,
    /// Hook run on every periodic tick
    pub effect: Option<EffectHook>,
    /// Hook run once per terminal transition of an instance
    pub completion: Option<EffectHook>,
    /// Whether repeated application compounds into stacks
    pub stackable: bool,
    /// Stack cap; required positive when `stackable`
    pub max_stacks: Option<u32>,
    /// Attribute names external observers key off for this effect
    pub status_attributes: Vec<String>,
    /// Trigger-attribute name -> target-effect name transitions
    pub modifiers: IndexMap<String, String>,
}

impl EffectDefinition {
    /// Create a non-stacking definition with no hooks
    pub fn new(name: impl Into<String>, duration: f64, tick_interval: f64) -> Self {
        Self {
            name: name.into(),
            duration,
            tick_interval,
            effect: None,
            completion: None,
            stackable: false,
            max_stacks: None,
            status_attributes: Vec::new(),
            modifiers: IndexMap::new(),
        }
    }

    /// Allow stacking up to `max_stacks` concurrent instances
    pub fn stacking(mut self, max_stacks: u32) -> Self {
        self.stackable = true;
        self.max_stacks = Some(max_stacks);
        self
    }

    /// Declare an attribute name external observers watch for this effect
    pub fn status_attribute(mut self, name: impl Into<String>) -> Self {
        self.status_attributes.push(name.into());
        self
    }

    /// Declare a modifier transition: when `trigger` changes on the
    /// entity, the active instance is replaced by the `target` effect
    pub fn modifier(mut self, trigger: impl Into<String>, target: impl Into<String>) -> Self {
        self.modifiers.insert(trigger.into(), target.into());
        self
    }

    /// Attach the per-tick behavior hook
    pub fn on_tick(
        mut self,
        hook: impl Fn(EntityId, &mut AttributeStore) + Send + Sync + 'static,
    ) -> Self {
        self.effect = Some(Arc::new(hook));
        self
    }

    /// Attach the completion behavior hook
    pub fn on_completed(
        mut self,
        hook: impl Fn(EntityId, &mut AttributeStore) + Send + Sync + 'static,
    ) -> Self {
        self.completion = Some(Arc::new(hook));
        self
    }

    /// Attribute key holding this effect's stack counter
    pub fn counter_attribute(&self) -> String {
        stack_counter(&self.name)
    }
}

/// Attribute key holding the stack counter for an effect name
pub fn stack_counter(name: &str) -> String {
    format!("{}_stacks", name)
}

impl fmt::Debug for EffectDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectDefinition")
            .field("name", &self.name)
            .field("duration", &self.duration)
            .field("tick_interval", &self.tick_interval)
            .field("stackable", &self.stackable)
            .field("max_stacks", &self.max_stacks)
            .field("status_attributes", &self.status_attributes)
            .field("modifiers", &self.modifiers)
            .field("has_tick_hook", &self.effect.is_some())
            .field("has_completion_hook", &self.completion.is_some())
            .finish()
    }
}
