//! Booth repository over the `booths` and `booth_checkins` tables.

use crate::{PgGateway, db_error, is_unique_violation};
use chrono::{DateTime, Utc};
use openhouse_core::error::{DomainError, Result};
use openhouse_core::providers::BoothRepository;
use openhouse_core::types::{Booth, BoothCheckIn, BoothCheckInId, BoothId, UserId};
use sqlx::Row;
use uuid::Uuid;

impl BoothRepository for PgGateway {
    async fn find_booth_by_code(&self, check_in_code: Uuid) -> Result<Booth> {
        let row = sqlx::query("SELECT id, name, check_in_code FROM booths WHERE check_in_code = $1")
            .bind(check_in_code)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("get booth"))?
            .ok_or(DomainError::BoothNotFound)?;

        let decode = db_error("decode booth");
        Ok(Booth {
            id: BoothId::new(row.try_get("id").map_err(&decode)?),
            name: row.try_get("name").map_err(&decode)?,
            check_in_code: row.try_get("check_in_code").map_err(&decode)?,
        })
    }

    async fn insert_booth_check_in(
        &self,
        user_id: UserId,
        booth_id: BoothId,
        checked_in_at: DateTime<Utc>,
    ) -> Result<BoothCheckIn> {
        let id: (i64,) = sqlx::query_as(
            r"
            INSERT INTO booth_checkins (user_id, booth_id, checked_in_at)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(user_id.get())
        .bind(booth_id.get())
        .bind(checked_in_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::AlreadyCheckedInBooth
            } else {
                DomainError::Database(format!("Failed to record booth check-in: {e}"))
            }
        })?;

        Ok(BoothCheckIn {
            id: BoothCheckInId::new(id.0),
            user_id,
            booth_id,
            checked_in_at,
        })
    }
}
