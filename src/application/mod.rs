//! Application layer: Use cases and services.
//!
//! Orchestrates domain logic with the classifier and artifact ports.

mod context;
mod prediction;

pub use context::{load_schema, ModelContext};
pub use prediction::PredictionService;
