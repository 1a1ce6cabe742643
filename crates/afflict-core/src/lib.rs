//! Afflict Core - Status-effect scheduling and lifecycle engine
//!
//! This crate provides the runtime core for timed, possibly-stacking
//! status effects on game entities:
//! - Dynamic attribute values (`AttrValue`) and per-entity bags
//!   (`AttributeStore`)
//! - Entity and timer identifiers
//! - Immutable effect templates (`EffectDefinition`) and their catalog
//!   (`EffectRegistry`)
//! - A tick-driven countdown scheduler (`TimerService`) emitting typed
//!   tick/completion events
//! - The applied-effect engine (`StatusEffectEngine`): stacking state
//!   machine, modifier transitions, authority gating
//!
//! ## Ownership model
//!
//! The engine is an explicit service object: construct one per owning
//! authority and pass it by reference. It is the sole owner of timer
//! handles and the sole writer of effect-owned attribute keys (the
//! `<name>` presence flag and the `<name>_stacks` counter); external
//! observers read freely and write other keys through
//! [`StatusEffectEngine::set_attribute`].

mod attribute;
mod definition;
mod engine;
mod error;
mod identity;
mod registry;
pub mod timer;
mod value;

pub use attribute::AttributeStore;
pub use definition::{stack_counter, EffectDefinition, EffectHook};
pub use engine::{Authority, StatusEffectEngine};
pub use error::{Error, Result};
pub use identity::{EntityId, TimerId};
pub use registry::EffectRegistry;
pub use timer::{TimerEvent, TimerEventKind, TimerService, TimerSpec};
pub use value::AttrValue;
