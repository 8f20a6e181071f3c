//! In-memory store double shared by the view and task tests.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use shared::{
    domain::{Category, Event, EventId, User, UserId},
    protocol::{EventPatch, NewEvent},
};
use tokio::sync::Mutex;

use crate::{EventStore, StoreError, StoreResult};

pub(crate) struct MemoryStore {
    pub events: Mutex<Vec<Event>>,
    pub categories: Vec<Category>,
    pub users: Vec<User>,
    pub fail_with_status: Option<u16>,
    pub events_delay: Option<Duration>,
    /// Accept updates without echoing the stored event, like a 204 backend.
    pub silent_updates: bool,
}

impl MemoryStore {
    pub fn seeded() -> Self {
        Self {
            events: Mutex::new(sample_events()),
            categories: sample_categories(),
            users: serde_json::from_value(json!([
                { "id": 1, "name": "Ignacio Doe", "image": "" },
                { "id": 2, "name": "Jane Bennett", "image": "" }
            ]))
            .expect("users"),
            fail_with_status: None,
            events_delay: None,
            silent_updates: false,
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Self::seeded()
        }
    }

    fn check(&self, method: &str, path: &str) -> StoreResult<()> {
        match self.fail_with_status {
            Some(status) => Err(StoreError::Status {
                method: method.to_string(),
                url: format!("memory://{path}"),
                status,
            }),
            None => Ok(()),
        }
    }
}

pub(crate) fn sample_events() -> Vec<Event> {
    serde_json::from_value(json!([
        { "id": 1, "createdBy": 1, "title": "Jazz Night", "description": "live music", "categoryIds": [1] },
        { "id": 2, "createdBy": 9, "title": "Art Expo", "description": "paintings", "categoryIds": [2] }
    ]))
    .expect("events")
}

pub(crate) fn sample_categories() -> Vec<Category> {
    serde_json::from_value(json!([
        { "id": 1, "name": "Music" },
        { "id": 2, "name": "Art" }
    ]))
    .expect("categories")
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        if let Some(delay) = self.events_delay {
            tokio::time::sleep(delay).await;
        }
        self.check("GET", "events")?;
        Ok(self.events.lock().await.clone())
    }

    async fn get_event(&self, id: EventId) -> StoreResult<Event> {
        self.check("GET", "events/id")?;
        self.events
            .lock()
            .await
            .iter()
            .find(|event| event.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("event", id.0))
    }

    async fn create_event(&self, event: &NewEvent) -> StoreResult<Event> {
        self.check("POST", "events")?;
        event.validate()?;
        let mut events = self.events.lock().await;
        let id = events.iter().map(|e| e.id.0).max().unwrap_or(0) + 1;
        let created = Event {
            id: EventId(id),
            created_by: Some(event.created_by),
            title: event.title.clone(),
            description: event.description.clone(),
            image: event.image.clone(),
            start_time: Some(event.start_time),
            end_time: Some(event.end_time),
            category_ids: event.category_ids.clone(),
            location: event.location.clone(),
        };
        events.push(created.clone());
        Ok(created)
    }

    async fn update_event(&self, id: EventId, patch: &EventPatch) -> StoreResult<Option<Event>> {
        self.check("PATCH", "events/id")?;
        let mut events = self.events.lock().await;
        let event = events
            .iter_mut()
            .find(|event| event.id == id)
            .ok_or_else(|| StoreError::not_found("event", id.0))?;
        event.apply_patch(patch);
        if self.silent_updates {
            return Ok(None);
        }
        Ok(Some(event.clone()))
    }

    async fn delete_event(&self, id: EventId) -> StoreResult<()> {
        self.check("DELETE", "events/id")?;
        let mut events = self.events.lock().await;
        let before = events.len();
        events.retain(|event| event.id != id);
        if events.len() == before {
            return Err(StoreError::not_found("event", id.0));
        }
        Ok(())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        self.check("GET", "categories")?;
        Ok(self.categories.clone())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.check("GET", "users")?;
        Ok(self.users.clone())
    }

    async fn get_user(&self, id: UserId) -> StoreResult<User> {
        self.check("GET", "users/id")?;
        self.users
            .iter()
            .find(|user| user.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("user", id.0))
    }
}
