//! User repository over the `users` table.

use crate::{PgGateway, db_error, is_unique_violation};
use openhouse_core::error::{DomainError, Result};
use openhouse_core::projection::{FieldName, FieldSet, UserField, UserView};
use openhouse_core::providers::UserRepository;
use openhouse_core::types::{NewUser, Participant, ParticipantType, User, UserId};
use sqlx::Row;
use sqlx::postgres::PgRow;

impl UserRepository for PgGateway {
    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let row = sqlx::query(
            r"
            INSERT INTO users (
                email, first_name, last_name, gender, phone_number,
                participant_type, transport_mode, is_from_bangkok, origin_location,
                attendance_dates, interested_activities, discovery_channel, extra_attributes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, created_at, updated_at
            ",
        )
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.gender)
        .bind(&user.phone_number)
        .bind(user.participant_type.as_str())
        .bind(&user.transport_mode)
        .bind(user.is_from_bangkok)
        .bind(&user.origin_location)
        .bind(&user.attendance_dates)
        .bind(&user.interested_activities)
        .bind(&user.discovery_channel)
        .bind(&user.extra_attributes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::UserAlreadyExists
            } else {
                DomainError::Database(format!("Failed to create user: {e}"))
            }
        })?;

        Ok(User {
            id: UserId::new(row.try_get("id").map_err(db_error("decode user"))?),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            gender: user.gender.clone(),
            phone_number: user.phone_number.clone(),
            participant_type: user.participant_type,
            transport_mode: user.transport_mode.clone(),
            is_from_bangkok: user.is_from_bangkok,
            origin_location: user.origin_location.clone(),
            attendance_dates: user.attendance_dates.clone(),
            interested_activities: user.interested_activities.clone(),
            discovery_channel: user.discovery_channel.clone(),
            extra_attributes: user.extra_attributes.clone(),
            created_at: row.try_get("created_at").map_err(db_error("decode user"))?,
            updated_at: row.try_get("updated_at").map_err(db_error("decode user"))?,
        })
    }

    async fn find_user(&self, email: &str, fields: &FieldSet<UserField>) -> Result<UserView> {
        let columns = fields.columns().collect::<Vec<_>>().join(", ");
        let sql = format!("SELECT {columns} FROM users WHERE email = $1");

        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("get user"))?
            .ok_or(DomainError::UserNotFound)?;

        row_to_user_view(&row, fields).map_err(db_error("decode user"))
    }

    async fn find_participant(&self, email: &str) -> Result<Participant> {
        let row = sqlx::query("SELECT id, participant_type FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("get user"))?
            .ok_or(DomainError::UserNotFound)?;

        let participant_type: String = row
            .try_get("participant_type")
            .map_err(db_error("decode user"))?;
        Ok(Participant {
            id: UserId::new(row.try_get("id").map_err(db_error("decode user"))?),
            participant_type: parse_participant_type(&participant_type)?,
        })
    }
}

fn parse_participant_type(raw: &str) -> Result<ParticipantType> {
    raw.parse()
        .map_err(|_| DomainError::Database(format!("Stored participant type {raw:?} is unknown")))
}

fn row_to_user_view(
    row: &PgRow,
    fields: &FieldSet<UserField>,
) -> std::result::Result<UserView, sqlx::Error> {
    let mut view = UserView::default();
    for field in fields.iter() {
        let column = field.name();
        match field {
            UserField::Id => view.id = Some(UserId::new(row.try_get(column)?)),
            UserField::Email => view.email = Some(row.try_get(column)?),
            UserField::FirstName => view.first_name = Some(row.try_get(column)?),
            UserField::LastName => view.last_name = Some(row.try_get(column)?),
            UserField::Gender => view.gender = Some(row.try_get(column)?),
            UserField::PhoneNumber => view.phone_number = Some(row.try_get(column)?),
            UserField::ParticipantType => {
                let raw: String = row.try_get(column)?;
                view.participant_type = Some(raw.parse().map_err(|_| {
                    sqlx::Error::Decode(format!("unknown participant type {raw:?}").into())
                })?);
            }
            UserField::TransportMode => view.transport_mode = Some(row.try_get(column)?),
            UserField::IsFromBangkok => view.is_from_bangkok = Some(row.try_get(column)?),
            UserField::OriginLocation => view.origin_location = Some(row.try_get(column)?),
            UserField::AttendanceDates => view.attendance_dates = Some(row.try_get(column)?),
            UserField::InterestedActivities => {
                view.interested_activities = Some(row.try_get(column)?);
            }
            UserField::DiscoveryChannel => view.discovery_channel = Some(row.try_get(column)?),
            UserField::ExtraAttributes => view.extra_attributes = Some(row.try_get(column)?),
            UserField::CreatedAt => view.created_at = Some(row.try_get(column)?),
            UserField::UpdatedAt => view.updated_at = Some(row.try_get(column)?),
        }
    }
    Ok(view)
}
