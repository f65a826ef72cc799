//! Booking repository over the `bookings` table.

use crate::{PgGateway, PgUnitOfWork, db_error, is_unique_violation};
use chrono::{DateTime, NaiveDate, Utc};
use openhouse_core::error::{DomainError, Result};
use openhouse_core::providers::BookingRepository;
use openhouse_core::types::{
    BookedSlot, Booking, BookingId, BookingState, BookingStatus, TimeSlot, UserId, WorkshopId,
};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

impl BookingRepository for PgGateway {
    async fn insert_booking(
        &self,
        tx: &mut PgUnitOfWork,
        user_id: UserId,
        workshop_id: WorkshopId,
        created_at: DateTime<Utc>,
    ) -> Result<Booking> {
        let id: (i64,) = sqlx::query_as(
            r"
            INSERT INTO bookings (user_id, workshop_id, status, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(user_id.get())
        .bind(workshop_id.get())
        .bind(BookingStatus::Confirmed.as_str())
        .bind(created_at)
        .fetch_one(&mut *tx.tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::AlreadyBooked
            } else {
                DomainError::Database(format!("Failed to insert booking: {e}"))
            }
        })?;

        Ok(Booking {
            id: BookingId::new(id.0),
            user_id,
            workshop_id,
            status: BookingStatus::Confirmed,
            created_at,
            checked_in_at: None,
        })
    }

    async fn cancel_booking(
        &self,
        tx: &mut PgUnitOfWork,
        user_id: UserId,
        workshop_id: WorkshopId,
    ) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE bookings
            SET status = $1
            WHERE user_id = $2 AND workshop_id = $3 AND status = $4
            ",
        )
        .bind(BookingStatus::Cancelled.as_str())
        .bind(user_id.get())
        .bind(workshop_id.get())
        .bind(BookingStatus::Confirmed.as_str())
        .execute(&mut *tx.tx)
        .await
        .map_err(db_error("cancel booking"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::BookingNotFound);
        }
        Ok(())
    }

    async fn confirmed_bookings_on(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Vec<BookedSlot>> {
        let rows = sqlx::query(
            r"
            SELECT b.id, b.workshop_id, w.start_time, w.end_time
            FROM bookings b
            JOIN workshops w ON w.id = b.workshop_id
            WHERE b.user_id = $1 AND b.status = $2 AND w.event_date = $3
            ",
        )
        .bind(user_id.get())
        .bind(BookingStatus::Confirmed.as_str())
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load bookings"))?;

        let decode = |row: &PgRow| -> std::result::Result<BookedSlot, sqlx::Error> {
            Ok(BookedSlot {
                booking_id: BookingId::new(row.try_get("id")?),
                workshop_id: WorkshopId::new(row.try_get("workshop_id")?),
                slot: TimeSlot::new(row.try_get("start_time")?, row.try_get("end_time")?),
            })
        };
        rows.iter()
            .map(|row| decode(row).map_err(db_error("decode booking")))
            .collect()
    }

    async fn confirmed_bookings(&self, user_id: UserId) -> Result<Vec<Booking>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, workshop_id, status, created_at, checked_in_at
            FROM bookings
            WHERE user_id = $1 AND status = $2
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(user_id.get())
        .bind(BookingStatus::Confirmed.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load bookings"))?;

        rows.iter().map(row_to_booking).collect()
    }

    async fn booking_for_check_in(
        &self,
        email: &str,
        check_in_code: Uuid,
    ) -> Result<Option<BookingState>> {
        let row = sqlx::query(
            r"
            SELECT b.id, b.status
            FROM bookings b
            JOIN users u ON u.id = b.user_id
            JOIN workshops w ON w.id = b.workshop_id
            WHERE u.email = $1 AND w.check_in_code = $2
            ORDER BY
                CASE b.status WHEN 'Confirmed' THEN 0 WHEN 'Attended' THEN 1 ELSE 2 END,
                b.created_at DESC,
                b.id DESC
            LIMIT 1
            ",
        )
        .bind(email)
        .bind(check_in_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("resolve check-in code"))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let status: String = row.try_get("status").map_err(db_error("decode booking"))?;
        Ok(Some(BookingState {
            id: BookingId::new(row.try_get("id").map_err(db_error("decode booking"))?),
            status: status.parse()?,
        }))
    }

    async fn mark_attended(&self, booking_id: BookingId, checked_in_at: DateTime<Utc>) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE bookings
            SET status = $1, checked_in_at = $2
            WHERE id = $3 AND status = $4
            ",
        )
        .bind(BookingStatus::Attended.as_str())
        .bind(checked_in_at)
        .bind(booking_id.get())
        .bind(BookingStatus::Confirmed.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error("mark booking attended"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::InvalidBookingStatus);
        }
        Ok(())
    }
}

fn row_to_booking(row: &PgRow) -> Result<Booking> {
    let decode = db_error("decode booking");
    let status: String = row.try_get("status").map_err(&decode)?;
    Ok(Booking {
        id: BookingId::new(row.try_get("id").map_err(&decode)?),
        user_id: UserId::new(row.try_get("user_id").map_err(&decode)?),
        workshop_id: WorkshopId::new(row.try_get("workshop_id").map_err(&decode)?),
        status: status.parse()?,
        created_at: row.try_get("created_at").map_err(&decode)?,
        checked_in_at: row.try_get("checked_in_at").map_err(&decode)?,
    })
}
