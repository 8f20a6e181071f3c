//! View state for the event list and event detail screens.
//!
//! Both containers follow one rule: state changes only through `apply`, and
//! everything displayed is derived from the current state. Fetch results and
//! user input arrive as actions; failures that the user should see become
//! [`Notification`]s.

use shared::{
    domain::{Category, CategoryId, Event, EventId, User},
    filter::{filter_events, resolve_category_names, CategoryLabel, FilterState},
    protocol::{EventPatch, NewEvent},
};
use tracing::{debug, warn};

use crate::{
    error::{ErrorClass, StoreError},
    EventStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: title.into(),
            description: description.into(),
        }
    }

    fn from_store_error(summary: &str, error: &StoreError) -> Self {
        Self::error("Error", format!("{summary}: {error}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTarget {
    Events,
    Categories,
}

#[derive(Debug)]
pub enum PageAction {
    EventsLoaded(Vec<Event>),
    CategoriesLoaded(Vec<Category>),
    LoadFailed {
        target: LoadTarget,
        error: StoreError,
    },
    SearchChanged(String),
    CategorySelected(Option<CategoryId>),
    EventCreated(Event),
    CreateFailed(StoreError),
}

/// State of the event list screen.
#[derive(Debug)]
pub struct EventsPage {
    events: Vec<Event>,
    categories: Vec<Category>,
    filter: FilterState,
    loading: bool,
    events_failed: bool,
    notifications: Vec<Notification>,
}

impl Default for EventsPage {
    fn default() -> Self {
        Self::new()
    }
}

impl EventsPage {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            categories: Vec::new(),
            filter: FilterState::default(),
            loading: true,
            events_failed: false,
            notifications: Vec::new(),
        }
    }

    pub fn apply(&mut self, action: PageAction) {
        match action {
            PageAction::EventsLoaded(events) => {
                debug!(count = events.len(), "view: events loaded");
                self.events = events;
                self.loading = false;
                self.events_failed = false;
            }
            PageAction::CategoriesLoaded(categories) => {
                debug!(count = categories.len(), "view: categories loaded");
                self.categories = categories;
            }
            PageAction::LoadFailed { target, error } => {
                warn!(?target, %error, "view: failed to load list data");
                if target == LoadTarget::Events {
                    self.loading = false;
                    self.events_failed = true;
                }
                let summary = match target {
                    LoadTarget::Events => "Could not load events",
                    LoadTarget::Categories => "Could not load categories",
                };
                self.notify_failure(summary, &error);
            }
            PageAction::SearchChanged(search_term) => {
                self.filter.search_term = search_term;
            }
            PageAction::CategorySelected(selected) => {
                self.filter.selected_category = selected;
            }
            PageAction::EventCreated(event) => {
                self.notifications.push(Notification::success(
                    "Event added",
                    format!("\"{}\" was added successfully.", event.title),
                ));
                self.events.insert(0, event);
            }
            PageAction::CreateFailed(error) => {
                warn!(%error, "view: failed to create event");
                self.notifications.push(Notification::from_store_error(
                    "Something went wrong while adding the event",
                    &error,
                ));
            }
        }
    }

    fn notify_failure(&mut self, summary: &str, error: &StoreError) {
        if error.class() != ErrorClass::Missing {
            self.notifications
                .push(Notification::from_store_error(summary, error));
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True when the last events fetch failed rather than came back empty.
    pub fn events_failed(&self) -> bool {
        self.events_failed
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn visible_events(&self) -> Vec<&Event> {
        filter_events(&self.events, &self.filter, &self.categories)
    }

    pub fn category_label(&self, event: &Event) -> CategoryLabel {
        resolve_category_names(&event.category_ids, &self.categories)
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}

#[derive(Debug)]
pub enum DetailAction {
    EventLoaded(Event),
    EventLoadFailed(StoreError),
    CreatorLoaded(User),
    CreatorFailed(StoreError),
    Updated(Event),
    UpdateFailed(StoreError),
    Deleted,
    DeleteFailed(StoreError),
}

/// State of the single-event screen.
#[derive(Debug)]
pub struct EventDetail {
    event_id: EventId,
    event: Option<Event>,
    creator: Option<User>,
    deleted: bool,
    notifications: Vec<Notification>,
}

impl EventDetail {
    pub fn new(event_id: EventId) -> Self {
        Self {
            event_id,
            event: None,
            creator: None,
            deleted: false,
            notifications: Vec::new(),
        }
    }

    pub fn apply(&mut self, action: DetailAction) {
        match action {
            DetailAction::EventLoaded(event) => {
                if event.id != self.event_id {
                    warn!(
                        expected = self.event_id.0,
                        actual = event.id.0,
                        "view: ignoring event for another page"
                    );
                    return;
                }
                self.event = Some(event);
            }
            DetailAction::EventLoadFailed(error) => {
                warn!(event_id = self.event_id.0, %error, "view: failed to load event");
                self.notifications.push(Notification::from_store_error(
                    "Could not load the event",
                    &error,
                ));
            }
            DetailAction::CreatorLoaded(user) => {
                self.creator = Some(user);
            }
            DetailAction::CreatorFailed(error) => {
                // The page stays in its loading state without a creator.
                warn!(event_id = self.event_id.0, %error, "view: creator unavailable");
                if error.class() != ErrorClass::Missing {
                    self.notifications.push(Notification::from_store_error(
                        "Could not load the event creator",
                        &error,
                    ));
                }
            }
            DetailAction::Updated(event) => {
                if event.id != self.event_id {
                    warn!(
                        expected = self.event_id.0,
                        actual = event.id.0,
                        "view: ignoring update for another page"
                    );
                    return;
                }
                self.event = Some(event);
                self.notifications.push(Notification::success(
                    "Event updated",
                    "The event details were updated successfully.",
                ));
            }
            DetailAction::UpdateFailed(error) => {
                warn!(event_id = self.event_id.0, %error, "view: failed to update event");
                self.notifications.push(Notification::from_store_error(
                    "Something went wrong while updating the event",
                    &error,
                ));
            }
            DetailAction::Deleted => {
                self.deleted = true;
                self.notifications.push(Notification::success(
                    "Event deleted",
                    "The event was deleted successfully.",
                ));
            }
            DetailAction::DeleteFailed(error) => {
                warn!(event_id = self.event_id.0, %error, "view: failed to delete event");
                self.notifications.push(Notification::from_store_error(
                    "Something went wrong while deleting the event",
                    &error,
                ));
            }
        }
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    /// True until both the event and its creator are known.
    pub fn is_loading(&self) -> bool {
        self.event.is_none() || self.creator.is_none()
    }

    pub fn event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    pub fn creator(&self) -> Option<&User> {
        self.creator.as_ref()
    }

    /// Set once the event is deleted; the screen should return to the list.
    pub fn should_leave(&self) -> bool {
        self.deleted
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}

pub async fn create_event<S: EventStore + ?Sized>(store: &S, event: &NewEvent) -> PageAction {
    match store.create_event(event).await {
        Ok(created) => PageAction::EventCreated(created),
        Err(error) => PageAction::CreateFailed(error),
    }
}

/// Patches `current`. When the backend accepts the patch without echoing the
/// stored event, the patch is applied to `current` locally.
pub async fn update_event<S: EventStore + ?Sized>(
    store: &S,
    current: &Event,
    patch: &EventPatch,
) -> DetailAction {
    match store.update_event(current.id, patch).await {
        Ok(Some(updated)) => DetailAction::Updated(updated),
        Ok(None) => {
            debug!(event_id = current.id.0, "view: applying patch locally");
            let mut updated = current.clone();
            updated.apply_patch(patch);
            DetailAction::Updated(updated)
        }
        Err(error) => DetailAction::UpdateFailed(error),
    }
}

pub async fn delete_event<S: EventStore + ?Sized>(store: &S, id: EventId) -> DetailAction {
    match store.delete_event(id).await {
        Ok(()) => DetailAction::Deleted,
        Err(error) => DetailAction::DeleteFailed(error),
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
