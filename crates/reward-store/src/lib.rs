//! Event store and claim log store: in-memory and SQLite implementations.

mod memory;

#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::{InMemoryClaimLogStore, InMemoryEventStore};
pub use reward_types::{ClaimLog, ClaimLogStore, ClaimLogStoreError, Event, EventStore, EventStoreError};

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteClaimLogStore, SqliteEventStore};
