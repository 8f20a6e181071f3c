//! Search and category filtering over an in-memory event list.
//!
//! Everything here is a pure function of its inputs. View state owns the
//! loaded collections and the [`FilterState`] and re-runs [`filter_events`]
//! whenever either changes.

use std::fmt;

use crate::{
    domain::{Category, CategoryId, Event},
    error::ParseIdError,
};

pub const LOADING_LABEL: &str = "Loading...";

/// Resolved category names for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryLabel {
    /// The category collection is empty, so names are unknown rather than
    /// absent.
    Loading,
    Names(String),
}

impl CategoryLabel {
    pub fn known(&self) -> Option<&str> {
        match self {
            CategoryLabel::Loading => None,
            CategoryLabel::Names(names) => Some(names),
        }
    }
}

impl fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryLabel::Loading => f.write_str(LOADING_LABEL),
            CategoryLabel::Names(names) => f.write_str(names),
        }
    }
}

/// Joins the names of the categories referenced by `category_ids`, in the
/// order of `categories`. Ids without a matching category are dropped.
pub fn resolve_category_names(category_ids: &[CategoryId], categories: &[Category]) -> CategoryLabel {
    if categories.is_empty() {
        return CategoryLabel::Loading;
    }

    let names: Vec<&str> = categories
        .iter()
        .filter(|category| category_ids.contains(&category.id))
        .map(|category| category.name.as_str())
        .collect();
    CategoryLabel::Names(names.join(", "))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search_term: String,
    pub selected_category: Option<CategoryId>,
}

impl FilterState {
    pub fn new(search_term: impl Into<String>, selected_category: Option<CategoryId>) -> Self {
        Self {
            search_term: search_term.into(),
            selected_category,
        }
    }

    pub fn with_search(mut self, search_term: impl Into<String>) -> Self {
        self.search_term = search_term.into();
        self
    }

    pub fn with_category(mut self, selected_category: Option<CategoryId>) -> Self {
        self.selected_category = selected_category;
        self
    }

    /// Applies a raw category selection. Blank input clears the selection.
    pub fn select_category_input(&mut self, input: &str) -> Result<(), ParseIdError> {
        self.selected_category = if input.trim().is_empty() {
            None
        } else {
            Some(input.parse()?)
        };
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.search_term.is_empty() && self.selected_category.is_none()
    }

    pub fn matches(&self, event: &Event, categories: &[Category]) -> bool {
        let query = self.search_term.to_lowercase();
        matches_search(event, &query, categories) && self.matches_category(event)
    }

    fn matches_category(&self, event: &Event) -> bool {
        self.selected_category
            .map_or(true, |selected| event.has_category(selected))
    }
}

/// `query` must already be lowercased.
fn matches_search(event: &Event, query: &str, categories: &[Category]) -> bool {
    if query.is_empty() {
        return true;
    }
    if event.title.to_lowercase().contains(query)
        || event.description.to_lowercase().contains(query)
    {
        return true;
    }

    resolve_category_names(&event.category_ids, categories)
        .known()
        .is_some_and(|names| names.to_lowercase().contains(query))
}

/// Returns the events matching `filter`, in their original order.
pub fn filter_events<'a>(
    events: &'a [Event],
    filter: &FilterState,
    categories: &[Category],
) -> Vec<&'a Event> {
    let query = filter.search_term.to_lowercase();
    events
        .iter()
        .filter(|event| {
            matches_search(event, &query, categories) && filter.matches_category(event)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventId;

    fn event(id: i64, title: &str, description: &str, category_ids: &[i64]) -> Event {
        Event {
            id: EventId(id),
            created_by: None,
            title: title.to_string(),
            description: description.to_string(),
            image: String::new(),
            start_time: None,
            end_time: None,
            category_ids: category_ids.iter().copied().map(CategoryId).collect(),
            location: String::new(),
        }
    }

    fn category(id: i64, name: &str) -> Category {
        Category {
            id: CategoryId(id),
            name: name.to_string(),
        }
    }

    fn scenario() -> (Vec<Event>, Vec<Category>) {
        (
            vec![
                event(1, "Jazz Night", "live music", &[1]),
                event(2, "Art Expo", "paintings", &[2]),
            ],
            vec![category(1, "Music"), category(2, "Art")],
        )
    }

    fn ids(events: &[&Event]) -> Vec<i64> {
        events.iter().map(|event| event.id.0).collect()
    }

    #[test]
    fn names_follow_category_collection_order() {
        let categories = vec![category(1, "Sports"), category(2, "Games"), category(3, "Relaxation")];
        let label = resolve_category_names(&[CategoryId(3), CategoryId(1)], &categories);
        assert_eq!(label, CategoryLabel::Names("Sports, Relaxation".to_string()));
    }

    #[test]
    fn unknown_ids_are_dropped() {
        let categories = vec![category(1, "Sports")];
        let label = resolve_category_names(&[CategoryId(9), CategoryId(1)], &categories);
        assert_eq!(label.to_string(), "Sports");
    }

    #[test]
    fn empty_ids_differ_from_unloaded_categories() {
        let (_, categories) = scenario();
        assert_eq!(
            resolve_category_names(&[], &categories),
            CategoryLabel::Names(String::new())
        );
        assert_eq!(resolve_category_names(&[CategoryId(1)], &[]), CategoryLabel::Loading);
        assert_eq!(CategoryLabel::Loading.to_string(), LOADING_LABEL);
        assert_eq!(CategoryLabel::Loading.known(), None);
    }

    #[test]
    fn no_filters_is_identity() {
        let (events, categories) = scenario();
        let visible = filter_events(&events, &FilterState::default(), &categories);
        assert_eq!(ids(&visible), vec![1, 2]);
        assert!(FilterState::default().is_empty());
    }

    #[test]
    fn search_matches_title_case_insensitively() {
        let (events, categories) = scenario();
        let visible = filter_events(&events, &FilterState::default().with_search("jazz"), &categories);
        assert_eq!(ids(&visible), vec![1]);
    }

    #[test]
    fn search_matches_description() {
        let (events, categories) = scenario();
        let visible = filter_events(&events, &FilterState::default().with_search("PAINT"), &categories);
        assert_eq!(ids(&visible), vec![2]);
    }

    #[test]
    fn search_matches_resolved_category_names() {
        let (events, categories) = scenario();
        let visible = filter_events(&events, &FilterState::default().with_search("music"), &categories);
        assert_eq!(ids(&visible), vec![1]);

        let events = vec![event(3, "Quiz", "trivia", &[2])];
        let visible = filter_events(&events, &FilterState::default().with_search("art"), &categories);
        assert_eq!(ids(&visible), vec![3]);
    }

    #[test]
    fn loading_sentinel_is_never_searched() {
        let (events, _) = scenario();
        let visible = filter_events(&events, &FilterState::default().with_search("loading"), &[]);
        assert!(visible.is_empty());
    }

    #[test]
    fn category_selection_filters_by_id() {
        let (events, categories) = scenario();
        let visible = filter_events(
            &events,
            &FilterState::default().with_category(Some(CategoryId(2))),
            &categories,
        );
        assert_eq!(ids(&visible), vec![2]);
    }

    #[test]
    fn selection_input_accepts_form_strings() {
        let (events, categories) = scenario();
        let mut filter = FilterState::default();
        filter.select_category_input("2").expect("numeric input");
        assert_eq!(filter.selected_category, Some(CategoryId(2)));
        assert_eq!(ids(&filter_events(&events, &filter, &categories)), vec![2]);

        filter.select_category_input("  ").expect("blank input");
        assert_eq!(filter.selected_category, None);

        assert!(filter.select_category_input("music").is_err());
    }

    #[test]
    fn search_and_category_must_both_hold() {
        let (events, categories) = scenario();
        let filter = FilterState::new("jazz", Some(CategoryId(2)));
        assert!(filter_events(&events, &filter, &categories).is_empty());
        let filter = FilterState::new("expo", Some(CategoryId(2)));
        assert_eq!(ids(&filter_events(&events, &filter, &categories)), vec![2]);
    }

    #[test]
    fn empty_text_fields_do_not_match_non_empty_terms() {
        let events = vec![event(5, "", "", &[])];
        let (_, categories) = scenario();
        assert!(filter_events(&events, &FilterState::default().with_search("x"), &categories).is_empty());
        assert_eq!(
            ids(&filter_events(&events, &FilterState::default(), &categories)),
            vec![5]
        );
    }

    #[test]
    fn every_hit_contains_the_term() {
        let (mut events, categories) = scenario();
        events.push(event(3, "Open Mic", "bring your guitar", &[1, 2]));
        events.push(event(4, "Book club", "reading", &[]));

        for term in ["a", "mu", "art", "o", "zzz", "GUITAR"] {
            let lowered = term.to_lowercase();
            for hit in filter_events(&events, &FilterState::default().with_search(term), &categories) {
                let names = resolve_category_names(&hit.category_ids, &categories).to_string();
                assert!(
                    hit.title.to_lowercase().contains(&lowered)
                        || hit.description.to_lowercase().contains(&lowered)
                        || names.to_lowercase().contains(&lowered),
                    "event {} should not match {term:?}",
                    hit.id
                );
            }
        }
    }

    #[test]
    fn filtering_is_stable_and_idempotent() {
        let (mut events, categories) = scenario();
        events.insert(0, event(9, "Jazz brunch", "music and food", &[1]));
        let filter = FilterState::default().with_search("jazz");

        let first = filter_events(&events, &filter, &categories);
        let second = filter_events(&events, &filter, &categories);
        assert_eq!(first, second);
        assert_eq!(ids(&first), vec![9, 1]);
    }

    #[test]
    fn matches_agrees_with_filter_events() {
        let (events, categories) = scenario();
        let filter = FilterState::new("music", None);
        let expected: Vec<bool> = events
            .iter()
            .map(|event| filter.matches(event, &categories))
            .collect();
        assert_eq!(expected, vec![true, false]);
    }
}
