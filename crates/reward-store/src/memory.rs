//! In-memory stores (process lifetime only).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reward_types::{
    sort_newest_first, ClaimLog, ClaimLogStore, ClaimLogStoreError, Event, EventStore,
    EventStoreError, UpdateEventRequest,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

fn newest_first(events: &mut [Event]) {
    events.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// In-memory EventStore keyed by event id.
pub struct InMemoryEventStore {
    events: Arc<RwLock<HashMap<String, Event>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn insert(&self, event: Event) -> Result<(), EventStoreError> {
        let mut guard = self.events.write().await;
        if guard.contains_key(&event.id) {
            return Err(EventStoreError::Other(format!(
                "event {} already exists",
                event.id
            )));
        }
        guard.insert(event.id.clone(), event);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Event>, EventStoreError> {
        Ok(self.events.read().await.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Event>, EventStoreError> {
        let mut out: Vec<Event> = self.events.read().await.values().cloned().collect();
        newest_first(&mut out);
        Ok(out)
    }

    async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<Event>, EventStoreError> {
        let mut out: Vec<Event> = self
            .events
            .read()
            .await
            .values()
            .filter(|e| e.is_claimable_at(now))
            .cloned()
            .collect();
        newest_first(&mut out);
        Ok(out)
    }

    async fn update(
        &self,
        id: &str,
        patch: &UpdateEventRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<Event>, EventStoreError> {
        let mut guard = self.events.write().await;
        let Some(current) = guard.get_mut(id) else {
            return Ok(None);
        };
        let mut patched = current.clone();
        patch.apply(&mut patched, now);
        patched.check().map_err(EventStoreError::Invalid)?;
        *current = patched.clone();
        Ok(Some(patched))
    }
}

/// In-memory ClaimLogStore: logs kept in append order.
pub struct InMemoryClaimLogStore {
    logs: Arc<RwLock<Vec<ClaimLog>>>,
}

impl InMemoryClaimLogStore {
    pub fn new() -> Self {
        Self {
            logs: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.logs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.logs.read().await.is_empty()
    }
}

impl Default for InMemoryClaimLogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClaimLogStore for InMemoryClaimLogStore {
    async fn append(&self, log: ClaimLog) -> Result<(), ClaimLogStoreError> {
        self.logs.write().await.push(log);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<ClaimLog>, ClaimLogStoreError> {
        let mut out = self.logs.read().await.clone();
        sort_newest_first(&mut out);
        Ok(out)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ClaimLog>, ClaimLogStoreError> {
        let mut out: Vec<ClaimLog> = self
            .logs
            .read()
            .await
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        sort_newest_first(&mut out);
        Ok(out)
    }
}
