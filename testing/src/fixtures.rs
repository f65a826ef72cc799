//! Test data builders.

#![allow(clippy::expect_used)] // Fixtures take hardcoded literals; a bad literal is a broken test
#![allow(clippy::missing_panics_doc)]

use chrono::{DateTime, Utc};
use openhouse_core::types::{Identity, NewUser, ParticipantType, Workshop, WorkshopId};
use openhouse_core::validation::RegistrationForm;
use serde_json::json;

/// Parse an RFC 3339 timestamp literal.
#[must_use]
pub fn at(raw: &str) -> DateTime<Utc> {
    raw.parse().expect("fixture timestamps are RFC 3339")
}

/// Identity whose subject and email are both `email`.
#[must_use]
pub fn identity(email: &str) -> Identity {
    Identity {
        subject: format!("uid-{email}"),
        email: email.to_string(),
    }
}

/// Builder for seeded workshops.
///
/// Defaults: 10 seats, none taken, category `Department`. The event date is
/// the UTC date of the start time.
///
/// # Example
///
/// ```
/// use openhouse_testing::fixtures::WorkshopSeed;
///
/// let workshop = WorkshopSeed::new("Robotics", "2026-03-14T03:00:00Z", "2026-03-14T04:00:00Z")
///     .seats(1)
///     .into_workshop();
/// assert_eq!(workshop.total_seats, 1);
/// ```
#[derive(Debug, Clone)]
pub struct WorkshopSeed {
    workshop: Workshop,
}

impl WorkshopSeed {
    /// Workshop named `name` running from `start` to `end`.
    #[must_use]
    pub fn new(name: &str, start: &str, end: &str) -> Self {
        let start_time = at(start);
        Self {
            workshop: Workshop {
                id: WorkshopId::new(0),
                name: name.to_string(),
                description: format!("{name} hands-on session"),
                category: "Department".to_string(),
                affiliation: "Faculty of Engineering".to_string(),
                event_date: start_time.date_naive(),
                start_time,
                end_time: at(end),
                location: "Engineering Building 3".to_string(),
                total_seats: 10,
                registered_count: 0,
            },
        }
    }

    /// Set the capacity.
    #[must_use]
    pub const fn seats(mut self, total_seats: i32) -> Self {
        self.workshop.total_seats = total_seats;
        self
    }

    /// Set the number of seats already taken.
    #[must_use]
    pub const fn registered(mut self, registered_count: i32) -> Self {
        self.workshop.registered_count = registered_count;
        self
    }

    /// Set the category.
    #[must_use]
    pub fn category(mut self, category: &str) -> Self {
        self.workshop.category = category.to_string();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.workshop.description = description.to_string();
        self
    }

    /// Finish building.
    #[must_use]
    pub fn into_workshop(self) -> Workshop {
        self.workshop
    }
}

/// Extra attributes that satisfy the shape of `participant_type`.
#[must_use]
pub fn extra_attributes_for(participant_type: ParticipantType) -> serde_json::Value {
    match participant_type {
        ParticipantType::Student => json!({
            "education_level": "m6",
            "school_name": "Triam Udom Suksa",
            "study_plan": "science_math",
            "province": "bangkok",
            "interested_majors": ["computer", "electrical"],
        }),
        ParticipantType::Intania => json!({ "intania_generation": "108" }),
        ParticipantType::OtherUniversityStudent => json!({
            "year_level": "2",
            "faculty": "Science",
            "university": "Mahidol University",
        }),
        ParticipantType::Teacher => json!({
            "school_name": "Suankularb Wittayalai",
            "province": "bangkok",
            "subject_taught": "Physics",
        }),
        ParticipantType::Other => json!({}),
    }
}

/// A valid, already-validated user.
#[must_use]
pub fn new_user(email: &str, participant_type: ParticipantType) -> NewUser {
    NewUser {
        email: email.to_string(),
        first_name: "Somchai".to_string(),
        last_name: "Jaidee".to_string(),
        gender: "male".to_string(),
        phone_number: "0812345678".to_string(),
        participant_type,
        transport_mode: "electric_train".to_string(),
        is_from_bangkok: true,
        origin_location: "pathum_wan".to_string(),
        attendance_dates: vec![at("2026-03-14T00:00:00Z").date_naive()],
        interested_activities: vec!["workshops".to_string()],
        discovery_channel: vec!["instagram".to_string()],
        extra_attributes: extra_attributes_for(participant_type),
    }
}

/// A registration form that passes validation.
#[must_use]
pub fn registration_form(participant_type: ParticipantType) -> RegistrationForm {
    RegistrationForm {
        first_name: "Somchai".to_string(),
        last_name: "Jaidee".to_string(),
        gender: "male".to_string(),
        phone_number: "0812345678".to_string(),
        participant_type: participant_type.as_str().to_string(),
        transport_mode: "electric_train".to_string(),
        is_from_bangkok: true,
        origin_location: "pathum_wan".to_string(),
        attendance_dates: vec!["2026-03-14".to_string(), "2026-03-15".to_string()],
        interested_activities: vec!["workshops".to_string()],
        discovery_channel: vec!["instagram".to_string()],
        extra_attributes: Some(extra_attributes_for(participant_type)),
    }
}
