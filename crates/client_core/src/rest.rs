use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{keep_valid, Category, Event, EventId, Record, User, UserId},
    protocol::{EventPatch, NewEvent},
};
use tracing::{debug, info};
use url::Url;

use crate::{
    error::{StoreError, StoreResult},
    EventStore,
};

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Store backed by the `/events`, `/categories` and `/users` REST resources.
#[derive(Debug, Clone)]
pub struct RestEventStore {
    http: Client,
    base_url: Url,
}

impl RestEventStore {
    pub fn new(base_url: &str) -> StoreResult<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> StoreResult<Self> {
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> StoreResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn request(&self, method: Method, path: &str) -> StoreResult<RequestBuilder> {
        Ok(self.http.request(method, self.endpoint(path)?))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        missing: Option<(&'static str, i64)>,
    ) -> StoreResult<T> {
        let response = send_checked(&self.http, self.request(Method::GET, path)?, missing).await?;
        decode_json(response).await
    }

    /// Fetches a collection, dropping entries that do not decode.
    async fn get_records<T: DeserializeOwned>(
        &self,
        path: &str,
        kind: &'static str,
    ) -> StoreResult<Vec<T>> {
        let records: Vec<Record<T>> = self.get_json(path, None).await?;
        Ok(keep_valid(records, kind))
    }
}

/// Joining against a base without a trailing slash would replace its last
/// path segment, so one is always added.
pub(crate) fn normalize_base_url(raw: &str) -> StoreResult<Url> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Sends `request` and maps non-success statuses onto [`StoreError`]. A 404 on
/// a single-entity route becomes [`StoreError::NotFound`] when `missing`
/// names the entity.
pub(crate) async fn send_checked(
    http: &Client,
    request: RequestBuilder,
    missing: Option<(&'static str, i64)>,
) -> StoreResult<Response> {
    let request = request.build()?;
    let method = request.method().to_string();
    let url = request.url().to_string();
    debug!(%method, %url, "store: sending request");

    let response = http.execute(request).await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    debug!(%method, %url, status = status.as_u16(), "store: request rejected");
    match missing {
        Some((entity, id)) if status == StatusCode::NOT_FOUND => {
            Err(StoreError::not_found(entity, id))
        }
        _ => Err(StoreError::Status {
            method,
            url,
            status: status.as_u16(),
        }),
    }
}

pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Like [`decode_json`], but an empty body (204, or 200 with nothing in it)
/// decodes as `None`.
pub(crate) async fn decode_optional_json<T: DeserializeOwned>(
    response: Response,
) -> StoreResult<Option<T>> {
    let body = response.bytes().await?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(&body)?))
}

#[async_trait]
impl EventStore for RestEventStore {
    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        self.get_records("events", "event").await
    }

    async fn get_event(&self, id: EventId) -> StoreResult<Event> {
        self.get_json(&format!("events/{id}"), Some(("event", id.0)))
            .await
    }

    async fn create_event(&self, event: &NewEvent) -> StoreResult<Event> {
        event.validate()?;
        let request = self.request(Method::POST, "events")?.json(event);
        let response = send_checked(&self.http, request, None).await?;
        let created: Event = decode_json(response).await?;
        info!(event_id = created.id.0, title = %created.title, "store: event created");
        Ok(created)
    }

    async fn update_event(&self, id: EventId, patch: &EventPatch) -> StoreResult<Option<Event>> {
        patch.validate()?;
        let request = self
            .request(Method::PATCH, &format!("events/{id}"))?
            .json(patch);
        let response = send_checked(&self.http, request, Some(("event", id.0))).await?;
        let updated = decode_optional_json(response).await?;
        info!(event_id = id.0, echoed = updated.is_some(), "store: event updated");
        Ok(updated)
    }

    async fn delete_event(&self, id: EventId) -> StoreResult<()> {
        let request = self.request(Method::DELETE, &format!("events/{id}"))?;
        send_checked(&self.http, request, Some(("event", id.0))).await?;
        info!(event_id = id.0, "store: event deleted");
        Ok(())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        self.get_records("categories", "category").await
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.get_records("users", "user").await
    }

    async fn get_user(&self, id: UserId) -> StoreResult<User> {
        self.get_json(&format!("users/{id}"), Some(("user", id.0)))
            .await
    }
}

#[cfg(test)]
#[path = "tests/rest_tests.rs"]
mod tests;
