//! Workshop catalog: read-only browsing with projection and filters.

use crate::error::Result;
use crate::projection::{FieldSet, WorkshopField, WorkshopView};
use crate::providers::WorkshopRepository;
use crate::types::{Workshop, WorkshopId};
use crate::validation::Validator;
use chrono::NaiveDate;
use serde::Deserialize;
use std::cmp::Ordering;
use std::sync::Arc;

/// Column a workshop listing is sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Start instant.
    #[default]
    StartTime,
    /// Workshop name.
    Name,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    /// Descending.
    #[serde(alias = "DESC")]
    Desc,
}

/// Listing query as received from a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkshopQuery {
    /// Case-insensitive substring of name or description.
    pub search: Option<String>,
    /// Category enum value.
    pub category: Option<String>,
    /// `YYYY-MM-DD`.
    pub event_date: Option<String>,
    /// Only list workshops with free seats.
    #[serde(default)]
    pub hide_full: bool,
    /// Sort column.
    #[serde(default)]
    pub sort_by: SortKey,
    /// Sort direction.
    #[serde(default)]
    pub order: SortOrder,
}

/// Validated listing filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkshopFilter {
    /// Case-insensitive substring of name or description.
    pub search: Option<String>,
    /// Category enum value.
    pub category: Option<String>,
    /// Calendar date.
    pub event_date: Option<NaiveDate>,
    /// Only list workshops with free seats.
    pub hide_full: bool,
    /// Sort column.
    pub sort_by: SortKey,
    /// Sort direction.
    pub order: SortOrder,
}

impl WorkshopFilter {
    /// Whether a workshop passes every filter.
    #[must_use]
    pub fn matches(&self, workshop: &Workshop) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !workshop.name.to_lowercase().contains(&needle)
                && !workshop.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if self.category.as_ref().is_some_and(|c| *c != workshop.category) {
            return false;
        }
        if self.event_date.is_some_and(|d| d != workshop.event_date) {
            return false;
        }
        !(self.hide_full && workshop.registered_count >= workshop.total_seats)
    }

    /// Listing order: the sort column in the requested direction, then id
    /// ascending.
    #[must_use]
    pub fn compare(&self, a: &Workshop, b: &Workshop) -> Ordering {
        let primary = match self.sort_by {
            SortKey::StartTime => a.start_time.cmp(&b.start_time),
            SortKey::Name => a.name.cmp(&b.name),
        };
        let primary = match self.order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Browses workshops.
pub struct WorkshopCatalog<G> {
    gateway: Arc<G>,
    validator: Validator,
}

impl<G: WorkshopRepository> WorkshopCatalog<G> {
    /// Create a catalog.
    #[must_use]
    pub const fn new(gateway: Arc<G>, validator: Validator) -> Self {
        Self { gateway, validator }
    }

    /// Load one workshop, projected to the requested fields.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` for a bad projection and `WorkshopNotFound`
    /// for a missing workshop.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: WorkshopId, fields: Option<&str>) -> Result<WorkshopView> {
        let fields = FieldSet::<WorkshopField>::parse(fields)?;
        self.gateway.find_workshop(id, &fields).await
    }

    /// Validate a client query into a filter.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEnumValue` for an unknown category and `InvalidDate`
    /// for a malformed date.
    pub fn filter(&self, query: WorkshopQuery) -> Result<WorkshopFilter> {
        let category = non_blank(query.category);
        if let Some(category) = &category {
            self.validator.workshop_category(category)?;
        }
        let event_date = non_blank(query.event_date)
            .map(|d| Validator::parse_date(&d))
            .transpose()?;

        Ok(WorkshopFilter {
            search: non_blank(query.search),
            category,
            event_date,
            hide_full: query.hide_full,
            sort_by: query.sort_by,
            order: query.order,
        })
    }

    /// List workshops.
    ///
    /// # Errors
    ///
    /// Returns validation errors from [`Self::filter`] or a storage failure.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, query: WorkshopQuery) -> Result<Vec<Workshop>> {
        let filter = self.filter(query)?;
        self.gateway.list_workshops(&filter).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn workshop(id: i64, name: &str, start: &str, seats: i32, taken: i32) -> Workshop {
        Workshop {
            id: WorkshopId::new(id),
            name: name.to_string(),
            description: "Hands-on session".to_string(),
            category: "Club".to_string(),
            affiliation: "Robotics Club".to_string(),
            event_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            start_time: start.parse().unwrap(),
            end_time: start.parse::<chrono::DateTime<chrono::Utc>>().unwrap()
                + chrono::Duration::hours(1),
            location: "Hall".to_string(),
            total_seats: seats,
            registered_count: taken,
        }
    }

    #[test]
    fn test_matches_search_case_insensitively() {
        let filter = WorkshopFilter {
            search: Some("ROBO".to_string()),
            ..WorkshopFilter::default()
        };
        assert!(filter.matches(&workshop(1, "Robotics 101", "2026-03-14T03:00:00Z", 10, 0)));
        assert!(!filter.matches(&workshop(2, "Chemistry", "2026-03-14T03:00:00Z", 10, 0)));
    }

    #[test]
    fn test_hide_full() {
        let filter = WorkshopFilter {
            hide_full: true,
            ..WorkshopFilter::default()
        };
        assert!(!filter.matches(&workshop(1, "Full", "2026-03-14T03:00:00Z", 10, 10)));
        assert!(filter.matches(&workshop(2, "Open", "2026-03-14T03:00:00Z", 10, 9)));
    }

    #[test]
    fn test_ties_broken_by_id() {
        let filter = WorkshopFilter {
            sort_by: SortKey::Name,
            order: SortOrder::Desc,
            ..WorkshopFilter::default()
        };
        let mut list = vec![
            workshop(3, "Alpha", "2026-03-14T03:00:00Z", 1, 0),
            workshop(2, "Beta", "2026-03-14T03:00:00Z", 1, 0),
            workshop(1, "Alpha", "2026-03-14T03:00:00Z", 1, 0),
        ];
        list.sort_by(|a, b| filter.compare(a, b));
        let ids: Vec<i64> = list.iter().map(|w| w.id.get()).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_query_defaults() {
        let query: WorkshopQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.sort_by, SortKey::StartTime);
        assert_eq!(query.order, SortOrder::Asc);
        assert!(!query.hide_full);

        let query: WorkshopQuery =
            serde_json::from_str(r#"{"sort_by":"name","order":"DESC"}"#).unwrap();
        assert_eq!(query.sort_by, SortKey::Name);
        assert_eq!(query.order, SortOrder::Desc);
    }
}
