//! Audit trail records and the filters applied to them.

use std::num::NonZeroU32;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use super::error::DomainError;
use super::paging::PageState;
use crate::util::timezone::{end_of_day, start_of_day};

/// One server-supplied audit record. Missing text columns arrive as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub timestamp: OffsetDateTime,
    pub description: String,
    pub event_type: String,
    pub category: String,
    pub performed_by: String,
}

/// Filter applied to the audit list. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditCriteria {
    pub category: Option<String>,
    pub action: Option<String>,
    pub user_search: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

impl AuditCriteria {
    /// Build criteria from raw form values, treating blank strings as unset.
    pub fn from_parts(
        category: Option<String>,
        action: Option<String>,
        user_search: Option<String>,
        start_date: Option<Date>,
        end_date: Option<Date>,
    ) -> Self {
        Self {
            category: non_blank(category),
            action: non_blank(action),
            user_search: non_blank(user_search),
            start_date,
            end_date,
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn matches(&self, event: &AuditEvent, tz: Tz) -> bool {
        if let Some(category) = &self.category
            && event.category != *category
        {
            return false;
        }

        if let Some(action) = &self.action
            && event.event_type != *action
        {
            return false;
        }

        if let Some(needle) = &self.user_search
            && !event
                .performed_by
                .to_lowercase()
                .contains(&needle.to_lowercase())
        {
            return false;
        }

        if let Some(start) = self.start_date
            && event.timestamp < start_of_day(start, tz)
        {
            return false;
        }

        if let Some(end) = self.end_date
            && event.timestamp > end_of_day(end, tz)
        {
            return false;
        }

        true
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

/// Events satisfying `criteria`, in their original order.
pub fn filter_events<'a>(
    events: &'a [AuditEvent],
    criteria: &AuditCriteria,
    tz: Tz,
) -> Vec<&'a AuditEvent> {
    events
        .iter()
        .filter(|event| criteria.matches(event, tz))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetCount {
    pub value: String,
    pub count: usize,
}

/// Distinct categories and event types of a list, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFacets {
    pub categories: Vec<FacetCount>,
    pub event_types: Vec<FacetCount>,
}

impl AuditFacets {
    pub fn collect(events: &[AuditEvent]) -> Self {
        let mut facets = Self::default();
        for event in events {
            bump(&mut facets.categories, &event.category);
            bump(&mut facets.event_types, &event.event_type);
        }
        facets
    }
}

fn bump(counts: &mut Vec<FacetCount>, value: &str) {
    if value.is_empty() {
        return;
    }
    match counts.iter_mut().find(|entry| entry.value == value) {
        Some(entry) => entry.count += 1,
        None => counts.push(FacetCount {
            value: value.to_string(),
            count: 1,
        }),
    }
}

/// Criteria plus the page being viewed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditView {
    criteria: AuditCriteria,
    page: PageState,
}

impl AuditView {
    pub fn new(rows_per_page: NonZeroU32) -> Self {
        Self {
            criteria: AuditCriteria::default(),
            page: PageState::new(rows_per_page),
        }
    }

    pub fn criteria(&self) -> &AuditCriteria {
        &self.criteria
    }

    pub fn page(&self) -> &PageState {
        &self.page
    }

    /// Replace the criteria. A different filter always returns to page 1.
    pub fn update_criteria(&mut self, criteria: AuditCriteria) {
        if criteria != self.criteria {
            self.criteria = criteria;
            self.page.reset();
        }
    }

    pub fn set_rows_per_page(&mut self, rows_per_page: NonZeroU32) {
        if rows_per_page.get() != self.page.rows_per_page() {
            self.page.set_rows_per_page(rows_per_page);
        }
    }

    /// `matching` is the length of the filtered list.
    pub fn go_to_page(&mut self, page: u32, matching: usize) -> Result<(), DomainError> {
        self.page.go_to(page, matching)
    }
}
