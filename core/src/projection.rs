//! Field projection over allow-listed columns.
//!
//! Clients choose which fields of a workshop or profile they want through a
//! `fields=a,b` query parameter. Names are parsed into closed enums here, so
//! storage adapters only ever see static column names.

use crate::error::{DomainError, Result};
use crate::types::{ParticipantType, User, UserId, Workshop, WorkshopId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// A projectable field of some entity.
pub trait FieldName: Copy + Eq + Sized + 'static {
    /// Every field, in column order.
    const ALL: &'static [Self];

    /// Projection used when the caller asks for nothing.
    const DEFAULT: &'static [Self];

    /// Column and JSON name.
    fn name(self) -> &'static str;

    /// Look up a field by its column name.
    #[must_use]
    fn parse(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == raw)
    }
}

/// Ordered, duplicate-free set of requested fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet<F> {
    fields: Vec<F>,
}

impl<F: FieldName> FieldSet<F> {
    /// Parse a comma-separated field list.
    ///
    /// Blank entries are ignored; an absent or blank list yields
    /// [`FieldName::DEFAULT`].
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UnknownField`] for a name outside the allow-list.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        let mut fields = Vec::new();
        for name in raw.unwrap_or_default().split(',').map(str::trim) {
            if name.is_empty() {
                continue;
            }
            let field = F::parse(name).ok_or_else(|| DomainError::UnknownField {
                field: name.to_string(),
            })?;
            if !fields.contains(&field) {
                fields.push(field);
            }
        }

        if fields.is_empty() {
            return Ok(Self::default_fields());
        }
        Ok(Self { fields })
    }

    /// The default projection.
    #[must_use]
    pub fn default_fields() -> Self {
        Self::of(F::DEFAULT)
    }

    /// Every field.
    #[must_use]
    pub fn all() -> Self {
        Self::of(F::ALL)
    }

    /// Exactly the given fields.
    #[must_use]
    pub fn of(fields: &[F]) -> Self {
        let mut set = Vec::with_capacity(fields.len());
        for field in fields {
            if !set.contains(field) {
                set.push(*field);
            }
        }
        Self { fields: set }
    }

    /// Whether `field` is selected.
    #[must_use]
    pub fn contains(&self, field: F) -> bool {
        self.fields.contains(&field)
    }

    /// Selected fields in request order.
    pub fn iter(&self) -> impl Iterator<Item = F> + '_ {
        self.fields.iter().copied()
    }

    /// Static column names of the selected fields.
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.iter().map(FieldName::name)
    }
}

/// Projectable workshop fields. Check-in codes are never projectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkshopField {
    /// `id`
    Id,
    /// `name`
    Name,
    /// `description`
    Description,
    /// `category`
    Category,
    /// `affiliation`
    Affiliation,
    /// `event_date`
    EventDate,
    /// `start_time`
    StartTime,
    /// `end_time`
    EndTime,
    /// `location`
    Location,
    /// `total_seats`
    TotalSeats,
    /// `registered_count`
    RegisteredCount,
}

impl FieldName for WorkshopField {
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::Name,
        Self::Description,
        Self::Category,
        Self::Affiliation,
        Self::EventDate,
        Self::StartTime,
        Self::EndTime,
        Self::Location,
        Self::TotalSeats,
        Self::RegisteredCount,
    ];

    const DEFAULT: &'static [Self] = &[Self::Name];

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Description => "description",
            Self::Category => "category",
            Self::Affiliation => "affiliation",
            Self::EventDate => "event_date",
            Self::StartTime => "start_time",
            Self::EndTime => "end_time",
            Self::Location => "location",
            Self::TotalSeats => "total_seats",
            Self::RegisteredCount => "registered_count",
        }
    }
}

/// Projectable user profile fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    /// `id`
    Id,
    /// `email`
    Email,
    /// `first_name`
    FirstName,
    /// `last_name`
    LastName,
    /// `gender`
    Gender,
    /// `phone_number`
    PhoneNumber,
    /// `participant_type`
    ParticipantType,
    /// `transport_mode`
    TransportMode,
    /// `is_from_bangkok`
    IsFromBangkok,
    /// `origin_location`
    OriginLocation,
    /// `attendance_dates`
    AttendanceDates,
    /// `interested_activities`
    InterestedActivities,
    /// `discovery_channel`
    DiscoveryChannel,
    /// `extra_attributes`
    ExtraAttributes,
    /// `created_at`
    CreatedAt,
    /// `updated_at`
    UpdatedAt,
}

impl FieldName for UserField {
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::Email,
        Self::FirstName,
        Self::LastName,
        Self::Gender,
        Self::PhoneNumber,
        Self::ParticipantType,
        Self::TransportMode,
        Self::IsFromBangkok,
        Self::OriginLocation,
        Self::AttendanceDates,
        Self::InterestedActivities,
        Self::DiscoveryChannel,
        Self::ExtraAttributes,
        Self::CreatedAt,
        Self::UpdatedAt,
    ];

    const DEFAULT: &'static [Self] = &[Self::Email];

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Email => "email",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Gender => "gender",
            Self::PhoneNumber => "phone_number",
            Self::ParticipantType => "participant_type",
            Self::TransportMode => "transport_mode",
            Self::IsFromBangkok => "is_from_bangkok",
            Self::OriginLocation => "origin_location",
            Self::AttendanceDates => "attendance_dates",
            Self::InterestedActivities => "interested_activities",
            Self::DiscoveryChannel => "discovery_channel",
            Self::ExtraAttributes => "extra_attributes",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

/// A workshop with only the requested fields populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[allow(missing_docs)]
pub struct WorkshopView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<WorkshopId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_seats: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered_count: Option<i32>,
}

impl WorkshopView {
    /// Copy the selected fields out of a full workshop.
    #[must_use]
    pub fn project(workshop: &Workshop, fields: &FieldSet<WorkshopField>) -> Self {
        let mut view = Self::default();
        for field in fields.iter() {
            match field {
                WorkshopField::Id => view.id = Some(workshop.id),
                WorkshopField::Name => view.name = Some(workshop.name.clone()),
                WorkshopField::Description => view.description = Some(workshop.description.clone()),
                WorkshopField::Category => view.category = Some(workshop.category.clone()),
                WorkshopField::Affiliation => view.affiliation = Some(workshop.affiliation.clone()),
                WorkshopField::EventDate => view.event_date = Some(workshop.event_date),
                WorkshopField::StartTime => view.start_time = Some(workshop.start_time),
                WorkshopField::EndTime => view.end_time = Some(workshop.end_time),
                WorkshopField::Location => view.location = Some(workshop.location.clone()),
                WorkshopField::TotalSeats => view.total_seats = Some(workshop.total_seats),
                WorkshopField::RegisteredCount => {
                    view.registered_count = Some(workshop.registered_count);
                }
            }
        }
        view
    }
}

/// A user profile with only the requested fields populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct UserView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_type: Option<ParticipantType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_from_bangkok: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance_dates: Option<Vec<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interested_activities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery_channel: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_attributes: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserView {
    /// Copy the selected fields out of a full user.
    #[must_use]
    pub fn project(user: &User, fields: &FieldSet<UserField>) -> Self {
        let mut view = Self::default();
        for field in fields.iter() {
            match field {
                UserField::Id => view.id = Some(user.id),
                UserField::Email => view.email = Some(user.email.clone()),
                UserField::FirstName => view.first_name = Some(user.first_name.clone()),
                UserField::LastName => view.last_name = Some(user.last_name.clone()),
                UserField::Gender => view.gender = Some(user.gender.clone()),
                UserField::PhoneNumber => view.phone_number = Some(user.phone_number.clone()),
                UserField::ParticipantType => view.participant_type = Some(user.participant_type),
                UserField::TransportMode => view.transport_mode = Some(user.transport_mode.clone()),
                UserField::IsFromBangkok => view.is_from_bangkok = Some(user.is_from_bangkok),
                UserField::OriginLocation => {
                    view.origin_location = Some(user.origin_location.clone());
                }
                UserField::AttendanceDates => {
                    view.attendance_dates = Some(user.attendance_dates.clone());
                }
                UserField::InterestedActivities => {
                    view.interested_activities = Some(user.interested_activities.clone());
                }
                UserField::DiscoveryChannel => {
                    view.discovery_channel = Some(user.discovery_channel.clone());
                }
                UserField::ExtraAttributes => {
                    view.extra_attributes = Some(user.extra_attributes.clone());
                }
                UserField::CreatedAt => view.created_at = Some(user.created_at),
                UserField::UpdatedAt => view.updated_at = Some(user.updated_at),
            }
        }
        view
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_projection() {
        let fields = FieldSet::<WorkshopField>::parse(None).unwrap();
        assert_eq!(fields.columns().collect::<Vec<_>>(), vec!["name"]);

        let fields = FieldSet::<UserField>::parse(Some(" , ")).unwrap();
        assert_eq!(fields.columns().collect::<Vec<_>>(), vec!["email"]);
    }

    #[test]
    fn test_parse_dedupes_and_keeps_order() {
        let fields =
            FieldSet::<WorkshopField>::parse(Some("total_seats, name,total_seats")).unwrap();
        assert_eq!(
            fields.columns().collect::<Vec<_>>(),
            vec!["total_seats", "name"]
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = FieldSet::<WorkshopField>::parse(Some("name,check_in_code")).unwrap_err();
        assert_eq!(
            err,
            DomainError::UnknownField {
                field: "check_in_code".to_string()
            }
        );

        let err = FieldSet::<UserField>::parse(Some("email; DROP TABLE users")).unwrap_err();
        assert!(matches!(err, DomainError::UnknownField { .. }));
    }

    #[test]
    fn test_view_serializes_only_selected_fields() {
        let workshop = Workshop {
            id: WorkshopId::new(3),
            name: "Robotics".to_string(),
            description: "Build a line follower".to_string(),
            category: "Department".to_string(),
            affiliation: "Electrical Engineering".to_string(),
            event_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            start_time: "2026-03-14T03:00:00Z".parse().unwrap(),
            end_time: "2026-03-14T04:00:00Z".parse().unwrap(),
            location: "Building 3".to_string(),
            total_seats: 30,
            registered_count: 4,
        };
        let fields = FieldSet::of(&[WorkshopField::Id, WorkshopField::RegisteredCount]);
        let json = serde_json::to_value(WorkshopView::project(&workshop, &fields)).unwrap();
        assert_eq!(json, serde_json::json!({"id": 3, "registered_count": 4}));
    }

    #[test]
    fn test_all_covers_every_name() {
        for field in UserField::ALL {
            assert_eq!(UserField::parse(field.name()), Some(*field));
        }
        assert_eq!(FieldSet::<WorkshopField>::all().iter().count(), 11);
    }
}
