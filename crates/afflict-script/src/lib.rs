//! Afflict Script - RON catalog loader for effect definitions
//!
//! Loads status-effect catalogs from RON files:
//! - Timing, stacking, and modifier data per effect
//! - Recursive directory scanning for `.ron` catalogs
//! - Hook attachment by effect name at registration time

mod error;
mod loader;
mod schema;

pub use error::{Error, Result};
pub use loader::{CatalogLoader, Hooks};
pub use schema::EffectSchema;
