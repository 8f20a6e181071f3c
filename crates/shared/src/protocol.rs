use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{valid_records, Category, CategoryId, Event, User, UserId},
    error::ValidationError,
    time::{self, format_timestamp},
};

/// The creator preselected by the add-event form.
pub const DEFAULT_CREATOR: UserId = UserId(1);

/// Body of `POST /events`. The backend assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub created_by: UserId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(with = "time::required")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "time::required")]
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
    pub location: String,
}

impl NewEvent {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        location: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            created_by: DEFAULT_CREATOR,
            title: title.into(),
            description: description.into(),
            image: String::new(),
            start_time,
            end_time,
            category_ids: Vec::new(),
            location: location.into(),
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_creator(mut self, created_by: UserId) -> Self {
        self.created_by = created_by;
        self
    }

    /// Adds categories, keeping the first occurrence of each id.
    pub fn with_categories(mut self, category_ids: impl IntoIterator<Item = CategoryId>) -> Self {
        for id in category_ids {
            if !self.category_ids.contains(&id) {
                self.category_ids.push(id);
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_text("description", &self.description)?;
        require_text("location", &self.location)?;
        check_time_range(&self.start_time, &self.end_time)
    }
}

/// Body of `PATCH /events/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(
        default,
        with = "time::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "time::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_ids: Option<Vec<CategoryId>>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(location) = &self.location {
            require_text("location", location)?;
        }
        match (&self.start_time, &self.end_time) {
            (Some(start), Some(end)) => check_time_range(start, end),
            _ => Ok(()),
        }
    }

    /// Validates the patch against the event it will be applied to, so a
    /// lone new start time cannot land after the existing end time.
    pub fn validate_against(&self, event: &Event) -> Result<(), ValidationError> {
        self.validate()?;
        let start = self.start_time.or(event.start_time);
        let end = self.end_time.or(event.end_time);
        match (start, end) {
            (Some(start), Some(end)) => check_time_range(&start, &end),
            _ => Ok(()),
        }
    }
}

impl Event {
    pub fn apply_patch(&mut self, patch: &EventPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(image) = &patch.image {
            self.image = image.clone();
        }
        if let Some(location) = &patch.location {
            self.location = location.clone();
        }
        if patch.start_time.is_some() {
            self.start_time = patch.start_time;
        }
        if patch.end_time.is_some() {
            self.end_time = patch.end_time;
        }
        if let Some(category_ids) = &patch.category_ids {
            self.category_ids = category_ids.clone();
        }
    }
}

/// The single static `events.json` document served in catalog mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticCatalog {
    #[serde(default, deserialize_with = "valid_records")]
    pub events: Vec<Event>,
    #[serde(default, deserialize_with = "valid_records")]
    pub users: Vec<User>,
    #[serde(default, deserialize_with = "valid_records")]
    pub categories: Vec<Category>,
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::missing(field));
    }
    Ok(())
}

fn check_time_range(start: &DateTime<Utc>, end: &DateTime<Utc>) -> Result<(), ValidationError> {
    if start > end {
        return Err(ValidationError::StartAfterEnd {
            start: format_timestamp(start),
            end: format_timestamp(end),
        });
    }
    Ok(())
}
