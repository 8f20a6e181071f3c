use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{Category, Event, EventId, User, UserId},
    protocol::{EventPatch, NewEvent, StaticCatalog},
};
use tracing::{debug, warn};

use crate::{
    error::{StoreError, StoreResult},
    rest::{decode_json, normalize_base_url, send_checked},
    EventStore,
};

pub const CATALOG_RESOURCE: &str = "events.json";

/// Read-only store answering every lookup from one preloaded `events.json`.
#[derive(Debug, Clone, Default)]
pub struct StaticEventStore {
    catalog: StaticCatalog,
}

impl StaticEventStore {
    pub fn new(catalog: StaticCatalog) -> Self {
        Self { catalog }
    }

    /// Fetches `{base_url}/events.json`.
    pub async fn fetch(http: &Client, base_url: &str) -> StoreResult<Self> {
        let url = normalize_base_url(base_url)?.join(CATALOG_RESOURCE)?;
        Self::fetch_url(http, url.as_str()).await
    }

    pub async fn fetch_url(http: &Client, url: &str) -> StoreResult<Self> {
        let response = send_checked(http, http.get(url), None).await?;
        let catalog: StaticCatalog = decode_json(response).await?;
        debug!(
            url,
            events = catalog.events.len(),
            users = catalog.users.len(),
            "catalog: loaded"
        );
        Ok(Self::new(catalog))
    }

    pub async fn from_path(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path).await.map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog: StaticCatalog = serde_json::from_slice(&raw)?;
        debug!(
            path = %path.display(),
            events = catalog.events.len(),
            users = catalog.users.len(),
            "catalog: loaded"
        );
        Ok(Self::new(catalog))
    }

    /// Loads from an `http(s)://` URL or, failing that, a local file path.
    /// Use [`StaticEventStore::fetch`] when only the API base URL is known.
    pub async fn load(http: &Client, location: &str) -> StoreResult<Self> {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::fetch_url(http, location).await
        } else {
            Self::from_path(location).await
        }
    }
}

#[async_trait]
impl EventStore for StaticEventStore {
    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        Ok(self.catalog.events.clone())
    }

    async fn get_event(&self, id: EventId) -> StoreResult<Event> {
        self.catalog
            .events
            .iter()
            .find(|event| event.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("event", id.0))
    }

    async fn create_event(&self, _event: &NewEvent) -> StoreResult<Event> {
        warn!("catalog: rejected create on read-only catalog");
        Err(StoreError::ReadOnly)
    }

    async fn update_event(&self, id: EventId, _patch: &EventPatch) -> StoreResult<Option<Event>> {
        warn!(event_id = id.0, "catalog: rejected update on read-only catalog");
        Err(StoreError::ReadOnly)
    }

    async fn delete_event(&self, id: EventId) -> StoreResult<()> {
        warn!(event_id = id.0, "catalog: rejected delete on read-only catalog");
        Err(StoreError::ReadOnly)
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(self.catalog.categories.clone())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.catalog.users.clone())
    }

    async fn get_user(&self, id: UserId) -> StoreResult<User> {
        self.catalog
            .users
            .iter()
            .find(|user| user.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("user", id.0))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;
    use shared::domain::CategoryId;

    use super::*;

    fn catalog_json() -> serde_json::Value {
        json!({
            "events": [
                { "id": 1, "createdBy": 2, "title": "Jazz Night", "categoryIds": ["1"] },
                { "id": 2, "createdBy": 9, "title": "Art Expo", "categoryIds": [2] }
            ],
            "users": [
                { "id": 1, "name": "Ignacio Doe", "image": "" },
                { "id": 2, "name": "Jane Bennett", "image": "" }
            ]
        })
    }

    async fn store_from_temp_file() -> StaticEventStore {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(catalog_json().to_string().as_bytes())
            .expect("write catalog");
        StaticEventStore::from_path(file.path())
            .await
            .expect("load catalog")
    }

    #[tokio::test]
    async fn lookups_are_answered_from_the_catalog() {
        let store = store_from_temp_file().await;

        let events = store.list_events().await.expect("events");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].category_ids, vec![CategoryId(1)]);

        let event = store.get_event(EventId(2)).await.expect("event");
        assert_eq!(event.title, "Art Expo");

        let creator = store.get_user(UserId(2)).await.expect("user");
        assert_eq!(creator.name, "Jane Bennett");
        assert!(store.list_categories().await.expect("categories").is_empty());
    }

    #[tokio::test]
    async fn absent_records_are_not_found() {
        let store = store_from_temp_file().await;
        assert!(store
            .get_event(EventId(99))
            .await
            .expect_err("missing event")
            .is_not_found());
        assert!(store
            .get_user(UserId(9))
            .await
            .expect_err("dangling creator")
            .is_not_found());
    }

    #[tokio::test]
    async fn writes_are_rejected() {
        let store = StaticEventStore::default();
        let err = store
            .delete_event(EventId(1))
            .await
            .expect_err("read-only");
        assert!(matches!(err, StoreError::ReadOnly));
    }

    #[tokio::test]
    async fn fetches_catalog_next_to_the_api() {
        use axum::{routing::get, Json, Router};

        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let app = Router::new().route(
            "/api/events.json",
            get(|| async { Json(catalog_json()) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let http = Client::new();
        let store = StaticEventStore::fetch(&http, &format!("http://{addr}/api"))
            .await
            .expect("fetch catalog");
        assert_eq!(store.list_events().await.expect("events").len(), 2);
        assert_eq!(
            store.get_user(UserId(1)).await.expect("user").name,
            "Ignacio Doe"
        );

        let err = StaticEventStore::fetch(&http, &format!("http://{addr}"))
            .await
            .expect_err("no catalog at the root");
        assert_eq!(err.class(), crate::ErrorClass::Status);
    }

    #[tokio::test]
    async fn missing_file_reports_the_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("events.json");
        let err = StaticEventStore::from_path(&path)
            .await
            .expect_err("missing file");
        assert!(err.to_string().contains("events.json"), "unexpected error: {err}");
    }
}
