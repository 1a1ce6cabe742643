//! Applied-effect engine
//!
//! The engine is the single owner of per-entity effect state: which
//! instances are live, their timers, and the effect-owned attribute
//! keys (presence flags and stack counters). It is an explicit service
//! object constructed once and handed to callers; there is no ambient
//! global.
//!
//! All mutation happens on one control thread. Timer events are pulled
//! synchronously through [`StatusEffectEngine::advance`], so apply and
//! remove never race against tick or completion handling.

use crate::definition::stack_counter;
use crate::timer::{TimerEventKind, TimerService, TimerSpec};
use crate::{
    AttrValue, AttributeStore, EffectDefinition, EffectRegistry, EntityId, Error, Result, TimerId,
};
use indexmap::IndexMap;
use log::{debug, warn};
use std::sync::Arc;

/// Which side of the simulation owns effect state
///
/// Only the owning authority may mutate; a remote context gets
/// `NotAuthorized` from every control call, with no state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    /// The owning context; mutation allowed
    Server,
    /// A non-owning context (e.g. a client replica); read-only
    Remote,
}

impl Authority {
    /// Check whether this context owns effect state
    pub fn is_owner(&self) -> bool {
        matches!(self, Authority::Server)
    }
}

/// One live, timed occurrence of an effect on one entity
#[derive(Debug, Clone)]
struct ActiveInstance {
    /// Normalized base effect name (the registry key)
    effect: String,
    /// Owned timer handle; stopped when the instance is torn down
    timer: TimerId,
    /// Stack level baked into the instance key; 0 for non-stacking
    level: u32,
}

/// Status-effect scheduling and lifecycle engine
///
/// Tracks applied instances per entity, drives the stacking state
/// machine, and runs the modifier transition protocol. Owns the timer
/// service and the attribute store; the registry is shared, read-only.
pub struct StatusEffectEngine {
    authority: Authority,
    registry: Arc<EffectRegistry>,
    timers: TimerService,
    attributes: AttributeStore,
    /// entity -> instance key -> live instance
    active: IndexMap<EntityId, IndexMap<String, ActiveInstance>>,
    /// reverse index for timer event dispatch
    by_timer: IndexMap<TimerId, (EntityId, String)>,
}

impl StatusEffectEngine {
    /// Create an engine for the given authority context
    pub fn new(authority: Authority, registry: Arc<EffectRegistry>) -> Self {
        Self {
            authority,
            registry,
            timers: TimerService::new(),
            attributes: AttributeStore::new(),
            active: IndexMap::new(),
            by_timer: IndexMap::new(),
        }
    }

    /// Create an owning (server-side) engine
    pub fn server(registry: Arc<EffectRegistry>) -> Self {
        Self::new(Authority::Server, registry)
    }

    /// The registry this engine resolves effect names against
    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    /// Read access to entity attributes for external observers
    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    /// Look up an effect definition by name, case-insensitively
    pub fn lookup(&self, name: &str) -> Option<&EffectDefinition> {
        self.registry.lookup(name)
    }

    /// Check an effect's presence flag on an entity
    pub fn has_effect(&self, entity: EntityId, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        self.attributes.get_bool(entity, &name).unwrap_or(false)
    }

    /// Current stack count of an effect on an entity
    pub fn stacks(&self, entity: EntityId, name: &str) -> i64 {
        let counter = stack_counter(&name.to_ascii_lowercase());
        self.attributes.get_int_or(entity, &counter, 0)
    }

    /// Instance keys currently live on an entity
    pub fn active_keys(&self, entity: EntityId) -> impl Iterator<Item = &str> {
        self.active
            .get(&entity)
            .into_iter()
            .flat_map(|instances| instances.keys().map(String::as_str))
    }

    /// Number of live instances on an entity
    pub fn active_count(&self, entity: EntityId) -> usize {
        self.active.get(&entity).map_or(0, |instances| instances.len())
    }

    /// Apply a registered effect to an entity
    ///
    /// Non-stacking effects hold one live instance; re-applying one
    /// restarts it with a fresh timer. Stackable effects add one
    /// independently-timed instance per call until `max_stacks`, after
    /// which further applications are silently ignored.
    pub fn apply(&mut self, entity: EntityId, name: &str) -> Result<()> {
        self.ensure_authority()?;
        self.apply_internal(entity, name)
    }

    /// Remove a live instance by its key
    ///
    /// A miss is a no-op, not an error. Removing a stackable effect's
    /// base name after its counter has drained sweeps any instances
    /// still tracked under that name.
    pub fn remove(&mut self, entity: EntityId, instance_key: &str) -> Result<()> {
        self.ensure_authority()?;
        self.remove_internal(entity, instance_key);
        Ok(())
    }

    /// Write an entity attribute on behalf of an external caller
    ///
    /// This is the modifier trigger point: after the write, every live
    /// instance on the entity whose definition maps the changed key is
    /// given one chance to transition into its target effect.
    pub fn set_attribute(
        &mut self,
        entity: EntityId,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> Result<()> {
        self.ensure_authority()?;
        let key = name.to_ascii_lowercase();
        self.attributes.set(entity, key.clone(), value);
        self.dispatch_modifiers(entity, &key);
        Ok(())
    }

    /// Advance all timers by `dt` seconds and dispatch their events
    ///
    /// Ticks run the definition's tick hook; completions drive the
    /// stacking state machine and tear the instance down.
    pub fn advance(&mut self, dt: f64) {
        for event in self.timers.advance(dt) {
            // instances torn down earlier in this batch drop out here
            let Some((entity, key)) = self.by_timer.get(&event.timer).cloned() else {
                continue;
            };
            match event.kind {
                TimerEventKind::Tick => self.run_tick(entity, &key),
                TimerEventKind::Completed => self.complete(entity, &key),
            }
        }
    }

    fn ensure_authority(&self) -> Result<()> {
        if self.authority.is_owner() {
            Ok(())
        } else {
            Err(Error::NotAuthorized)
        }
    }

    fn apply_internal(&mut self, entity: EntityId, name: &str) -> Result<()> {
        let def = match self.registry.lookup(name) {
            Some(def) => def.clone(),
            None => return Err(Error::UnknownEffect(name.to_string())),
        };

        let (instance_key, level) = if def.stackable {
            // registry validation guarantees a positive cap here
            let max = i64::from(def.max_stacks.unwrap_or(0));
            let counter = def.counter_attribute();
            let count = self.attributes.get_int_or(entity, &counter, 0);
            if count >= max {
                debug!(
                    "{} already at {} stacks of `{}`, apply ignored",
                    entity, max, def.name
                );
                return Ok(());
            }
            self.attributes.set(entity, counter, count + 1);
            let level = self.next_level(entity, &def.name);
            (format!("{}{}", def.name, level), level)
        } else {
            (def.name.clone(), 0)
        };

        let timer = self
            .timers
            .start(TimerSpec::new(&instance_key, def.duration, def.tick_interval));

        let replaced = self
            .active
            .entry(entity)
            .or_default()
            .insert(
                instance_key.clone(),
                ActiveInstance {
                    effect: def.name.clone(),
                    timer,
                    level,
                },
            );
        // re-applied non-stacking instance: the old timer must never fire
        if let Some(old) = replaced {
            self.timers.stop(old.timer);
            self.by_timer.shift_remove(&old.timer);
        }

        self.by_timer.insert(timer, (entity, instance_key));
        self.attributes.set(entity, def.name, true);
        Ok(())
    }

    /// Next free stack level: one past the highest level still live,
    /// so re-applying after a lower level expired never mints a key
    /// that collides with a running instance.
    fn next_level(&self, entity: EntityId, effect: &str) -> u32 {
        self.active
            .get(&entity)
            .into_iter()
            .flat_map(|instances| instances.values())
            .filter(|inst| inst.effect == effect)
            .map(|inst| inst.level)
            .max()
            .unwrap_or(0)
            + 1
    }

    fn remove_internal(&mut self, entity: EntityId, instance_key: &str) {
        let key = instance_key.to_ascii_lowercase();
        let removed = self
            .active
            .get_mut(&entity)
            .and_then(|instances| instances.shift_remove(&key));

        match removed {
            Some(instance) => {
                self.timers.stop(instance.timer);
                self.by_timer.shift_remove(&instance.timer);
                self.decrement_counter(entity, &instance.effect);
                self.finish_instance(entity, &instance.effect);
            }
            None => self.sweep_if_drained(entity, &key),
        }
    }

    /// Defensive teardown for `remove(entity, "<base name>")` on a
    /// stackable effect whose counter already reached zero: stop and
    /// drop every instance still tracked under that name.
    fn sweep_if_drained(&mut self, entity: EntityId, key: &str) {
        let Some(def) = self.registry.lookup(key) else {
            return;
        };
        if !def.stackable {
            return;
        }
        let name = def.name.clone();
        let counter = def.counter_attribute();
        if self.attributes.get_int_or(entity, &counter, 0) != 0 {
            return;
        }

        let stale: Vec<(String, TimerId)> = self
            .active
            .get(&entity)
            .map(|instances| {
                instances
                    .iter()
                    .filter(|(_, inst)| inst.effect == name)
                    .map(|(k, inst)| (k.clone(), inst.timer))
                    .collect()
            })
            .unwrap_or_default();

        for (stale_key, timer) in stale {
            self.timers.stop(timer);
            self.by_timer.shift_remove(&timer);
            if let Some(instances) = self.active.get_mut(&entity) {
                instances.shift_remove(&stale_key);
            }
        }
        self.attributes.clear(entity, &name);
        self.attributes.clear(entity, &counter);
    }

    fn run_tick(&mut self, entity: EntityId, instance_key: &str) {
        let effect = self
            .active
            .get(&entity)
            .and_then(|instances| instances.get(instance_key))
            .map(|inst| inst.effect.clone());
        let Some(effect) = effect else { return };

        let hook = self.registry.lookup(&effect).and_then(|def| def.effect.clone());
        if let Some(hook) = hook {
            hook(entity, &mut self.attributes);
        }
    }

    /// Natural expiry of one instance's timer
    fn complete(&mut self, entity: EntityId, instance_key: &str) {
        let Some(instance) = self
            .active
            .get_mut(&entity)
            .and_then(|instances| instances.shift_remove(instance_key))
        else {
            return;
        };
        self.by_timer.shift_remove(&instance.timer);
        self.decrement_counter(entity, &instance.effect);
        self.finish_instance(entity, &instance.effect);
    }

    /// Keep the stack counter equal to the number of live instances:
    /// every teardown of a stackable level, manual or natural, takes
    /// one off, and zero clears the attribute entirely.
    fn decrement_counter(&mut self, entity: EntityId, effect: &str) {
        let counter = self
            .registry
            .lookup(effect)
            .filter(|def| def.stackable)
            .map(|def| def.counter_attribute());
        let Some(counter) = counter else { return };

        let count = self.attributes.get_int_or(entity, &counter, 0) - 1;
        if count <= 0 {
            self.attributes.clear(entity, &counter);
        } else {
            self.attributes.set(entity, counter, count);
        }
    }

    /// Terminal bookkeeping shared by expiry and manual removal:
    /// clear the presence flag (and any counter remnant) once the last
    /// instance of the effect is gone, then run the completion hook
    /// exactly once.
    fn finish_instance(&mut self, entity: EntityId, effect: &str) {
        let remaining = self
            .active
            .get(&entity)
            .is_some_and(|instances| instances.values().any(|inst| inst.effect == effect));
        if !remaining {
            self.attributes.clear(entity, effect);
            let counter = self
                .registry
                .lookup(effect)
                .filter(|def| def.stackable)
                .map(|def| def.counter_attribute());
            if let Some(counter) = counter {
                self.attributes.clear(entity, &counter);
            }
        }

        let hook = self
            .registry
            .lookup(effect)
            .and_then(|def| def.completion.clone());
        if let Some(hook) = hook {
            hook(entity, &mut self.attributes);
        }
    }

    /// One-hop modifier scan for an externally changed attribute
    ///
    /// The scan snapshots the live instances first, so an effect
    /// applied by a transition never retriggers within the same change
    /// event. That is the cycle guard: A -> B -> A chains need a new
    /// external change per hop.
    fn dispatch_modifiers(&mut self, entity: EntityId, changed: &str) {
        let snapshot: Vec<(String, String)> = self
            .active
            .get(&entity)
            .map(|instances| {
                instances
                    .iter()
                    .map(|(key, inst)| (key.clone(), inst.effect.clone()))
                    .collect()
            })
            .unwrap_or_default();

        for (instance_key, effect) in snapshot {
            let target = self
                .registry
                .lookup(&effect)
                .and_then(|def| def.modifiers.get(changed))
                .cloned();
            let Some(target) = target else { continue };

            if self.registry.lookup(&target).is_none() {
                debug!(
                    "modifier on `{}` maps `{}` to unregistered effect `{}`, transition suppressed",
                    effect, changed, target
                );
                continue;
            }
            if self.attributes.get_bool(entity, &target).unwrap_or(false) {
                debug!(
                    "`{}` already active on {}, transition from `{}` suppressed",
                    target, entity, effect
                );
                continue;
            }
            // an earlier transition in this scan may have torn us down
            let still_live = self
                .active
                .get(&entity)
                .is_some_and(|instances| instances.contains_key(&instance_key));
            if !still_live {
                continue;
            }

            // the trigger convention couples attribute names to
            // instance keys, so the changed name is removed as a key
            // in its own right before the triggering instance goes
            self.remove_internal(entity, changed);
            self.remove_internal(entity, &instance_key);
            if let Err(err) = self.apply_internal(entity, &target) {
                warn!("modifier transition to `{}` failed: {}", target, err);
            }
        }
    }
}

impl std::fmt::Debug for StatusEffectEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusEffectEngine")
            .field("authority", &self.authority)
            .field("registered", &self.registry.len())
            .field("live_timers", &self.timers.len())
            .field("tracked_entities", &self.active.len())
            .finish()
    }
}
