use async_trait::async_trait;
use shared::{
    domain::{Category, Event, EventId, User, UserId},
    protocol::{EventPatch, NewEvent},
};

pub mod error;
pub mod rest;
pub mod static_catalog;
pub mod task;
pub mod view;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

pub use error::{ErrorClass, StoreError, StoreResult};
pub use rest::{RestEventStore, DEFAULT_API_URL};
pub use static_catalog::StaticEventStore;
pub use task::{load_event_detail, load_events_page, ViewTask};
pub use view::{
    DetailAction, EventDetail, EventsPage, LoadTarget, Notification, NotificationKind, PageAction,
};

/// Source of event, category and user records.
///
/// Implementations never cache between calls; each call reflects whatever the
/// backing source holds at that moment.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn list_events(&self) -> StoreResult<Vec<Event>>;
    async fn get_event(&self, id: EventId) -> StoreResult<Event>;
    /// Returns the stored event, carrying the id the backend assigned.
    async fn create_event(&self, event: &NewEvent) -> StoreResult<Event>;
    /// Returns the stored event when the backend echoes it back, `None` when
    /// it accepted the patch without a body.
    async fn update_event(&self, id: EventId, patch: &EventPatch) -> StoreResult<Option<Event>>;
    async fn delete_event(&self, id: EventId) -> StoreResult<()>;
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn get_user(&self, id: UserId) -> StoreResult<User>;
}
