use std::{future::Future, sync::Arc};

use shared::domain::EventId;
use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
    view::{DetailAction, LoadTarget, PageAction},
    EventStore,
};

/// A spawned fetch tied to the lifetime of the view that started it.
///
/// Dropping the handle aborts the task, so results of a view the user has
/// already left are never delivered.
#[derive(Debug)]
pub struct ViewTask {
    handle: Option<JoinHandle<()>>,
}

impl ViewTask {
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: Some(tokio::spawn(future)),
        }
    }

    pub fn cancel(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Waits for the task to run to completion.
    pub async fn finished(mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                if !err.is_cancelled() {
                    warn!(error = %err, "view task panicked");
                }
            }
        }
    }
}

impl Drop for ViewTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Fetches events and categories concurrently, delivering each result as soon
/// as it arrives.
pub fn load_events_page(
    store: Arc<dyn EventStore>,
    actions: UnboundedSender<PageAction>,
) -> ViewTask {
    ViewTask::spawn(async move {
        let events = async {
            let action = match store.list_events().await {
                Ok(events) => PageAction::EventsLoaded(events),
                Err(error) => PageAction::LoadFailed {
                    target: LoadTarget::Events,
                    error,
                },
            };
            deliver(&actions, action);
        };
        let categories = async {
            let action = match store.list_categories().await {
                Ok(categories) => PageAction::CategoriesLoaded(categories),
                Err(error) => PageAction::LoadFailed {
                    target: LoadTarget::Categories,
                    error,
                },
            };
            deliver(&actions, action);
        };
        futures::join!(events, categories);
    })
}

/// Fetches one event, then its creator.
pub fn load_event_detail(
    store: Arc<dyn EventStore>,
    event_id: EventId,
    actions: UnboundedSender<DetailAction>,
) -> ViewTask {
    ViewTask::spawn(async move {
        let event = match store.get_event(event_id).await {
            Ok(event) => event,
            Err(error) => {
                deliver(&actions, DetailAction::EventLoadFailed(error));
                return;
            }
        };
        let created_by = event.created_by;
        deliver(&actions, DetailAction::EventLoaded(event));

        let Some(user_id) = created_by else {
            debug!(event_id = event_id.0, "view task: event has no creator");
            return;
        };
        let action = match store.get_user(user_id).await {
            Ok(user) => DetailAction::CreatorLoaded(user),
            Err(error) => DetailAction::CreatorFailed(error),
        };
        deliver(&actions, action);
    })
}

fn deliver<A>(actions: &UnboundedSender<A>, action: A) {
    if actions.send(action).is_err() {
        debug!("view task: receiver dropped, discarding result");
    }
}

#[cfg(test)]
#[path = "tests/task_tests.rs"]
mod tests;
