//! EventCatalog: operator-side event management on top of an EventStore.

use chrono::{DateTime, Utc};
use reward_types::{CreateEventRequest, Event, EventStore, EventStoreError, UpdateEventRequest};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("event not found: {0}")]
    NotFound(String),
    #[error("invalid event: {0}")]
    InvalidEvent(String),
    #[error(transparent)]
    Store(#[from] EventStoreError),
}

pub struct EventCatalog {
    store: Arc<dyn EventStore>,
}

impl EventCatalog {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, req: CreateEventRequest) -> Result<Event, CatalogError> {
        let event = Event::from_request(req, Utc::now());
        event.check().map_err(CatalogError::InvalidEvent)?;
        self.store.insert(event.clone()).await?;
        tracing::info!(event_id = %event.id, created_by = %event.created_by, "event created");
        Ok(event)
    }

    pub async fn list_all(&self) -> Result<Vec<Event>, CatalogError> {
        Ok(self.store.list_all().await?)
    }

    /// Events claimable right now.
    pub async fn list_active(&self) -> Result<Vec<Event>, CatalogError> {
        self.list_active_at(Utc::now()).await
    }

    pub async fn list_active_at(&self, now: DateTime<Utc>) -> Result<Vec<Event>, CatalogError> {
        Ok(self.store.list_active(now).await?)
    }

    pub async fn get(&self, id: &str) -> Result<Event, CatalogError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Apply the present fields. The store re-checks the patched event inside its
    /// read-modify-write; a failing check is `InvalidEvent` and nothing is written.
    pub async fn update(&self, id: &str, patch: UpdateEventRequest) -> Result<Event, CatalogError> {
        if patch.is_empty() {
            return self.get(id).await;
        }
        let updated = match self.store.update(id, &patch, Utc::now()).await {
            Ok(Some(event)) => event,
            Ok(None) => return Err(CatalogError::NotFound(id.to_string())),
            Err(EventStoreError::Invalid(reason)) => return Err(CatalogError::InvalidEvent(reason)),
            Err(e) => return Err(e.into()),
        };
        tracing::info!(event_id = %updated.id, enabled = updated.is_enabled, "event updated");
        Ok(updated)
    }

    /// Whether the event is enabled and inside its window right now.
    pub async fn is_event_active(&self, id: &str) -> Result<bool, CatalogError> {
        let event = self.get(id).await?;
        Ok(event.is_claimable_at(Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use reward_store::InMemoryEventStore;
    use serde_json::json;

    fn catalog() -> EventCatalog {
        EventCatalog::new(Arc::new(InMemoryEventStore::new()))
    }

    fn create_req(start: DateTime<Utc>, end: DateTime<Utc>) -> CreateEventRequest {
        CreateEventRequest {
            description: "attendance".to_string(),
            desired_condition: json!({ "loginDays": 7 }),
            reward: json!({ "currency": 500 }),
            start_date: start,
            end_date: end,
            is_enabled: true,
            created_by: "operator".to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_get() {
        let c = catalog();
        let now = Utc::now();
        let ev = c.create(create_req(now, now + Duration::days(1))).await.unwrap();
        let got = c.get(&ev.id).await.unwrap();
        assert_eq!(got, ev);
        assert!(matches!(c.get("nope").await, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn create_rejects_inverted_window() {
        let c = catalog();
        let now = Utc::now();
        let err = c.create(create_req(now, now - Duration::days(1))).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidEvent(_)));
        assert!(c.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_non_object_reward() {
        let c = catalog();
        let now = Utc::now();
        let mut req = create_req(now, now + Duration::days(1));
        req.reward = json!(1000);
        assert!(matches!(c.create(req).await, Err(CatalogError::InvalidEvent(_))));
    }

    #[tokio::test]
    async fn update_validates_resulting_window() {
        let c = catalog();
        let now = Utc::now();
        let ev = c.create(create_req(now, now + Duration::days(1))).await.unwrap();
        let bad = UpdateEventRequest {
            end_date: Some(now - Duration::days(1)),
            ..Default::default()
        };
        assert!(matches!(c.update(&ev.id, bad).await, Err(CatalogError::InvalidEvent(_))));
        assert_eq!(c.get(&ev.id).await.unwrap().end_date, ev.end_date);

        let good = UpdateEventRequest {
            description: Some("attendance v2".to_string()),
            ..Default::default()
        };
        let updated = c.update(&ev.id, good).await.unwrap();
        assert_eq!(updated.description, "attendance v2");
        assert!(updated.updated_at >= ev.updated_at);
    }

    /// Yields after every read so concurrent updates interleave between lookup and write.
    struct InterleavingStore {
        inner: InMemoryEventStore,
    }

    #[async_trait::async_trait]
    impl EventStore for InterleavingStore {
        async fn insert(&self, event: Event) -> Result<(), EventStoreError> {
            self.inner.insert(event).await
        }

        async fn get(&self, id: &str) -> Result<Option<Event>, EventStoreError> {
            let found = self.inner.get(id).await;
            tokio::task::yield_now().await;
            found
        }

        async fn list_all(&self) -> Result<Vec<Event>, EventStoreError> {
            self.inner.list_all().await
        }

        async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<Event>, EventStoreError> {
            self.inner.list_active(now).await
        }

        async fn update(
            &self,
            id: &str,
            patch: &UpdateEventRequest,
            now: DateTime<Utc>,
        ) -> Result<Option<Event>, EventStoreError> {
            tokio::task::yield_now().await;
            self.inner.update(id, patch, now).await
        }
    }

    #[tokio::test]
    async fn overlapping_updates_cannot_invert_the_window() {
        let c = EventCatalog::new(Arc::new(InterleavingStore {
            inner: InMemoryEventStore::new(),
        }));
        let now = Utc::now();
        let ev = c.create(create_req(now, now + Duration::days(10))).await.unwrap();

        let later_start = UpdateEventRequest {
            start_date: Some(now + Duration::days(8)),
            ..Default::default()
        };
        let earlier_end = UpdateEventRequest {
            end_date: Some(now + Duration::days(2)),
            ..Default::default()
        };
        let (a, b) = tokio::join!(c.update(&ev.id, later_start), c.update(&ev.id, earlier_end));

        let rejected = [&a, &b]
            .into_iter()
            .filter(|r| matches!(r, Err(CatalogError::InvalidEvent(_))))
            .count();
        assert_eq!(rejected, 1);
        assert!(a.is_ok() || b.is_ok());
        let stored = c.get(&ev.id).await.unwrap();
        assert!(stored.start_date <= stored.end_date);
    }

    #[tokio::test]
    async fn empty_patch_returns_current_event() {
        let c = catalog();
        let now = Utc::now();
        let ev = c.create(create_req(now, now + Duration::days(1))).await.unwrap();
        let same = c.update(&ev.id, UpdateEventRequest::default()).await.unwrap();
        assert_eq!(same, ev);
        assert!(matches!(
            c.update("nope", UpdateEventRequest::default()).await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_unknown_is_not_found() {
        let c = catalog();
        let patch = UpdateEventRequest {
            is_enabled: Some(true),
            ..Default::default()
        };
        assert!(matches!(c.update("nope", patch).await, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn active_listing_and_flag() {
        let c = catalog();
        let now = Utc::now();
        let live = c.create(create_req(now - Duration::hours(1), now + Duration::hours(1))).await.unwrap();
        let future = c.create(create_req(now + Duration::days(1), now + Duration::days(2))).await.unwrap();

        let active = c.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, live.id);
        assert!(c.is_event_active(&live.id).await.unwrap());
        assert!(!c.is_event_active(&future.id).await.unwrap());

        let later = c.list_active_at(now + Duration::hours(36)).await.unwrap();
        assert_eq!(later.len(), 1);
        assert_eq!(later[0].id, future.id);
        assert_eq!(c.list_all().await.unwrap().len(), 2);
    }
}
