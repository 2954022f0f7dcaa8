//! Model selection and routing.
//!
//! Provides the static model catalog, environment-driven restriction
//! enforcement, provider-family detection, and the scoring-based model
//! selector that picks a model for a task when the caller asks for
//! `"auto"`.

pub mod catalog;
pub mod provider;
pub mod restrictions;
pub mod selector;

pub use catalog::{Complexity, CostTier, ModelCatalog, ModelDescriptor, SpeedTier};
pub use provider::Provider;
pub use restrictions::{RestrictionPolicy, RestrictionSettings};
pub use selector::{ModelSelector, Selection, Thresholds};
