//! Core types and traits for the event reward service.
//!
//! Wire shapes use camelCase to match the gateway and delegate contracts.

mod claim;
mod dto;
mod event;
mod traits;

pub use claim::*;
pub use dto::*;
pub use event::*;
pub use traits::*;
