//! Reward claim orchestration and event management.

mod catalog;
mod orchestrator;

pub use catalog::{CatalogError, EventCatalog};
pub use orchestrator::{ClaimError, ClaimOrchestrator};
