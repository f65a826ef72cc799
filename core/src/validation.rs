//! Enum reference table and registration validation.
//!
//! The reference table ships inside the binary (`enums.json`). It is parsed
//! once into an immutable [`EnumCatalog`] and shared through an `Arc` by the
//! [`Validator`] and the `GET /enums` endpoint.

use crate::error::{DomainError, Result};
use crate::types::{NewUser, ParticipantType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::HashSet;
use std::sync::Arc;

/// Embedded reference table.
pub const BUILTIN_ENUMS: &str = include_str!("enums.json");

/// Calendar date format accepted from clients.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One selectable option of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumOption {
    /// Human-readable label.
    pub label: String,
    /// Stored value.
    pub value: String,
}

/// The reference table, as served to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumTable {
    /// Gender options.
    pub genders: Vec<EnumOption>,
    /// Participant type options.
    pub participant_types: Vec<EnumOption>,
    /// Transport mode options.
    pub transport_modes: Vec<EnumOption>,
    /// Bangkok districts and provinces.
    pub origin_locations: Vec<EnumOption>,
    /// Workshop categories.
    pub workshop_categories: Vec<EnumOption>,
}

/// Names one enumeration of the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumSet {
    /// `genders`
    Gender,
    /// `participant_types`
    ParticipantType,
    /// `transport_modes`
    TransportMode,
    /// `origin_locations`
    OriginLocation,
    /// `workshop_categories`
    WorkshopCategory,
}

impl EnumSet {
    /// Field name reported in validation errors.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::ParticipantType => "participant_type",
            Self::TransportMode => "transport_mode",
            Self::OriginLocation => "origin_location",
            Self::WorkshopCategory => "category",
        }
    }
}

/// Immutable, indexed reference table.
#[derive(Debug, Clone)]
pub struct EnumCatalog {
    table: EnumTable,
    genders: HashSet<String>,
    participant_types: HashSet<String>,
    transport_modes: HashSet<String>,
    origin_locations: HashSet<String>,
    workshop_categories: HashSet<String>,
}

impl EnumCatalog {
    /// Index a reference table.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Internal`] if the table lists a participant type
    /// the domain does not know.
    pub fn new(table: EnumTable) -> Result<Self> {
        if let Some(unknown) = table
            .participant_types
            .iter()
            .find(|o| o.value.parse::<ParticipantType>().is_err())
        {
            return Err(DomainError::Internal(format!(
                "enum table lists unknown participant type {:?}",
                unknown.value
            )));
        }

        let index = |options: &[EnumOption]| options.iter().map(|o| o.value.clone()).collect();
        Ok(Self {
            genders: index(&table.genders),
            participant_types: index(&table.participant_types),
            transport_modes: index(&table.transport_modes),
            origin_locations: index(&table.origin_locations),
            workshop_categories: index(&table.workshop_categories),
            table,
        })
    }

    /// Parse and index a JSON reference table.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Internal`] if the document is malformed.
    pub fn from_json(raw: &str) -> Result<Self> {
        let table: EnumTable = serde_json::from_str(raw)
            .map_err(|e| DomainError::Internal(format!("Failed to parse enum table: {e}")))?;
        Self::new(table)
    }

    /// The reference table embedded in the binary.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Internal`] if the embedded document is malformed.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_ENUMS)
    }

    /// The table as loaded.
    #[must_use]
    pub const fn table(&self) -> &EnumTable {
        &self.table
    }

    /// Whether `value` belongs to the enumeration.
    #[must_use]
    pub fn contains(&self, set: EnumSet, value: &str) -> bool {
        let values = match set {
            EnumSet::Gender => &self.genders,
            EnumSet::ParticipantType => &self.participant_types,
            EnumSet::TransportMode => &self.transport_modes,
            EnumSet::OriginLocation => &self.origin_locations,
            EnumSet::WorkshopCategory => &self.workshop_categories,
        };
        values.contains(value)
    }
}

/// Registration payload as submitted by a client.
///
/// Enumerations arrive as plain strings and are checked against the
/// reference table by [`Validator::registration`].
#[derive(Debug, Clone, Deserialize)]
#[allow(missing_docs)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub phone_number: String,
    pub participant_type: String,
    pub transport_mode: String,
    pub is_from_bangkok: bool,
    pub origin_location: String,
    pub attendance_dates: Vec<String>,
    #[serde(default)]
    pub interested_activities: Vec<String>,
    #[serde(default)]
    pub discovery_channel: Vec<String>,
    #[serde(default)]
    pub extra_attributes: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
#[allow(dead_code)]
struct StudentAttributes {
    #[serde(default)]
    education_level: String,
    #[serde(default)]
    school_name: String,
    #[serde(default)]
    study_plan: String,
    #[serde(default)]
    province: String,
    #[serde(default)]
    tcas_rank: String,
    #[serde(default)]
    interested_majors: Vec<String>,
    #[serde(default)]
    emergency_contact: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
#[allow(dead_code)]
struct IntaniaAttributes {
    #[serde(default)]
    intania_generation: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
#[allow(dead_code)]
struct OtherUniversityStudentAttributes {
    #[serde(default)]
    year_level: String,
    #[serde(default)]
    faculty: String,
    #[serde(default)]
    university: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
#[allow(dead_code)]
struct TeacherAttributes {
    #[serde(default)]
    school_name: String,
    #[serde(default)]
    province: String,
    #[serde(default)]
    subject_taught: String,
}

/// Validates client input against the reference table and attribute shapes.
#[derive(Debug, Clone)]
pub struct Validator {
    catalog: Arc<EnumCatalog>,
}

impl Validator {
    /// Create a validator over a shared catalog.
    #[must_use]
    pub const fn new(catalog: Arc<EnumCatalog>) -> Self {
        Self { catalog }
    }

    /// The shared catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<EnumCatalog> {
        &self.catalog
    }

    /// Check enum membership.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidEnumValue`] if `value` is not listed.
    pub fn check_enum(&self, set: EnumSet, value: &str) -> Result<()> {
        if self.catalog.contains(set, value) {
            Ok(())
        } else {
            Err(DomainError::InvalidEnumValue {
                field: set.field(),
                value: value.to_string(),
            })
        }
    }

    /// Check a workshop category filter.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidEnumValue`] for an unknown category.
    pub fn workshop_category(&self, category: &str) -> Result<()> {
        self.check_enum(EnumSet::WorkshopCategory, category)
    }

    /// Parse a `YYYY-MM-DD` date.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidDate`] if the value does not parse.
    pub fn parse_date(raw: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| DomainError::InvalidDate {
            value: raw.to_string(),
        })
    }

    /// Check extra attributes against the participant type's shape.
    ///
    /// Returns the payload to store. `other` accepts anything and stores
    /// `{}` when nothing was sent; every other type requires an object whose
    /// keys all belong to its shape.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidExtraAttributes`] for a missing payload,
    /// a non-object payload or an unknown key.
    pub fn extra_attributes(
        participant_type: ParticipantType,
        payload: Option<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let payload = payload.filter(|v| !v.is_null());

        match participant_type {
            ParticipantType::Other => {
                Ok(payload.unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new())))
            }
            ParticipantType::Student => check_shape::<StudentAttributes>(payload),
            ParticipantType::Intania => check_shape::<IntaniaAttributes>(payload),
            ParticipantType::OtherUniversityStudent => {
                check_shape::<OtherUniversityStudentAttributes>(payload)
            }
            ParticipantType::Teacher => check_shape::<TeacherAttributes>(payload),
        }
    }

    /// Validate a registration and bind it to the verified email.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure: an unknown enum value, a
    /// malformed attendance date or mismatched extra attributes.
    pub fn registration(&self, email: &str, form: RegistrationForm) -> Result<NewUser> {
        self.check_enum(EnumSet::Gender, &form.gender)?;
        self.check_enum(EnumSet::ParticipantType, &form.participant_type)?;
        self.check_enum(EnumSet::TransportMode, &form.transport_mode)?;
        self.check_enum(EnumSet::OriginLocation, &form.origin_location)?;
        let participant_type: ParticipantType = form.participant_type.parse()?;

        let attendance_dates = form
            .attendance_dates
            .iter()
            .map(|d| Self::parse_date(d))
            .collect::<Result<Vec<_>>>()?;

        let extra_attributes = Self::extra_attributes(participant_type, form.extra_attributes)?;

        Ok(NewUser {
            email: email.to_string(),
            first_name: form.first_name,
            last_name: form.last_name,
            gender: form.gender,
            phone_number: form.phone_number,
            participant_type,
            transport_mode: form.transport_mode,
            is_from_bangkok: form.is_from_bangkok,
            origin_location: form.origin_location,
            attendance_dates,
            interested_activities: form.interested_activities,
            discovery_channel: form.discovery_channel,
            extra_attributes,
        })
    }
}

fn check_shape<T: DeserializeOwned>(payload: Option<serde_json::Value>) -> Result<serde_json::Value> {
    let payload = payload.ok_or_else(|| DomainError::InvalidExtraAttributes {
        reason: "extra_attributes is required".to_string(),
    })?;
    if !payload.is_object() {
        return Err(DomainError::InvalidExtraAttributes {
            reason: "extra_attributes must be an object".to_string(),
        });
    }
    T::deserialize(&payload).map_err(|e| DomainError::InvalidExtraAttributes {
        reason: e.to_string(),
    })?;
    Ok(payload)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> Validator {
        Validator::new(Arc::new(EnumCatalog::builtin().unwrap()))
    }

    fn form(participant_type: &str, extra: Option<serde_json::Value>) -> RegistrationForm {
        RegistrationForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            gender: "female".to_string(),
            phone_number: "0812345678".to_string(),
            participant_type: participant_type.to_string(),
            transport_mode: "electric_train".to_string(),
            is_from_bangkok: true,
            origin_location: "pathum_wan".to_string(),
            attendance_dates: vec!["2026-03-14".to_string()],
            interested_activities: vec!["robotics".to_string()],
            discovery_channel: vec![],
            extra_attributes: extra,
        }
    }

    #[test]
    fn test_builtin_table_sizes() {
        let catalog = EnumCatalog::builtin().unwrap();
        let table = catalog.table();
        assert_eq!(table.genders.len(), 4);
        assert_eq!(table.participant_types.len(), 5);
        assert_eq!(table.transport_modes.len(), 12);
        assert_eq!(table.origin_locations.len(), 126);
        assert_eq!(table.workshop_categories.len(), 2);
        assert!(catalog.contains(EnumSet::OriginLocation, "chiang_mai"));
        assert!(catalog.contains(EnumSet::WorkshopCategory, "Club"));
        assert!(!catalog.contains(EnumSet::WorkshopCategory, "club"));
    }

    #[test]
    fn test_catalog_rejects_unknown_participant_type() {
        let raw = r#"{"genders":[],"participant_types":[{"label":"Alumni","value":"alumni"}],
            "transport_modes":[],"origin_locations":[],"workshop_categories":[]}"#;
        assert!(matches!(
            EnumCatalog::from_json(raw),
            Err(DomainError::Internal(_))
        ));
    }

    #[test]
    fn test_valid_registration() {
        let user = validator()
            .registration(
                "ada@example.com",
                form(
                    "student",
                    Some(json!({"school_name": "Triam Udom", "interested_majors": ["CP"]})),
                ),
            )
            .unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.participant_type, ParticipantType::Student);
        assert_eq!(
            user.attendance_dates,
            vec![NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()]
        );
    }

    #[test]
    fn test_invalid_enum() {
        let mut f = form("other", None);
        f.transport_mode = "rocket".to_string();
        let err = validator().registration("a@b.c", f).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidEnumValue {
                field: "transport_mode",
                value: "rocket".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_attendance_date() {
        let mut f = form("other", None);
        f.attendance_dates = vec!["14/03/2026".to_string()];
        let err = validator().registration("a@b.c", f).unwrap_err();
        assert!(matches!(err, DomainError::InvalidDate { .. }));
    }

    #[test]
    fn test_extra_attributes_unknown_key() {
        let err = Validator::extra_attributes(
            ParticipantType::Teacher,
            Some(json!({"school_name": "X", "favourite_colour": "blue"})),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidExtraAttributes { .. }));
    }

    #[test]
    fn test_extra_attributes_required_except_other() {
        assert!(Validator::extra_attributes(ParticipantType::Intania, None).is_err());
        assert!(
            Validator::extra_attributes(ParticipantType::Intania, Some(json!(["CP"]))).is_err()
        );
        assert_eq!(
            Validator::extra_attributes(ParticipantType::Other, None).unwrap(),
            json!({})
        );
        assert_eq!(
            Validator::extra_attributes(ParticipantType::Other, Some(json!({"anything": 1})))
                .unwrap(),
            json!({"anything": 1})
        );
    }

    #[test]
    fn test_workshop_category() {
        let validator = validator();
        assert!(validator.workshop_category("Department").is_ok());
        assert!(validator.workshop_category("Faculty").is_err());
    }
}
