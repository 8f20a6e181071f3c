//! Plain-text rendering of view state.

use chrono::{DateTime, Utc};
use client_core::{Notification, NotificationKind};
use shared::{
    domain::{Category, Event, User},
    filter::{CategoryLabel, LOADING_LABEL},
};

pub const NOT_SPECIFIED: &str = "not specified";
pub const NO_EVENTS: &str = "No events found.";

fn format_time(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|value| value.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

pub fn event_card(event: &Event, label: &CategoryLabel) -> String {
    let mut lines = vec![format!("#{} {}", event.id, event.title)];
    if !event.description.is_empty() {
        lines.push(format!("    {}", event.description));
    }
    lines.push(format!("    location: {}", event.location));
    lines.push(format!("    start: {}", format_time(event.start_time)));
    lines.push(format!("    end: {}", format_time(event.end_time)));
    lines.push(format!("    categories: {label}"));
    lines.join("\n")
}

pub fn event_list(events: &[&Event], label: impl Fn(&Event) -> CategoryLabel) -> String {
    if events.is_empty() {
        return NO_EVENTS.to_string();
    }
    events
        .iter()
        .map(|event| event_card(event, &label(*event)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn event_detail(event: &Event, creator: Option<&User>) -> String {
    let mut lines = vec![event.title.clone()];
    if !event.description.is_empty() {
        lines.push(event.description.clone());
    }
    lines.push(format!("location: {}", event.location));
    lines.push(format!("start: {}", format_time(event.start_time)));
    lines.push(format!("end: {}", format_time(event.end_time)));
    if !event.image.is_empty() {
        lines.push(format!("image: {}", event.image));
    }
    let created_by = match creator {
        Some(user) => user.name.clone(),
        None => LOADING_LABEL.to_string(),
    };
    lines.push(format!("created by: {created_by}"));
    lines.join("\n")
}

pub fn category_table(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|category| format!("{:>4}  {}", category.id.0, category.name))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn user_table(users: &[User]) -> String {
    users
        .iter()
        .map(|user| format!("{:>4}  {}", user.id.0, user.name))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn notification(notification: &Notification) -> String {
    let kind = match notification.kind {
        NotificationKind::Success => "ok",
        NotificationKind::Error => "error",
    };
    format!(
        "[{kind}] {}: {}",
        notification.title, notification.description
    )
}
