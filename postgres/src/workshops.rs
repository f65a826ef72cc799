//! Workshop repository over the `workshops` table.

use crate::{PgGateway, PgUnitOfWork, db_error, escape_like};
use openhouse_core::catalog::{SortKey, SortOrder, WorkshopFilter};
use openhouse_core::error::{DomainError, Result};
use openhouse_core::projection::{FieldName, FieldSet, WorkshopField, WorkshopView};
use openhouse_core::providers::WorkshopRepository;
use openhouse_core::types::{TimeSlot, Workshop, WorkshopCapacity, WorkshopId};
use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder, Row};

const WORKSHOP_COLUMNS: &str = "id, name, description, category, affiliation, event_date, \
     start_time, end_time, location, total_seats, registered_count";

impl WorkshopRepository for PgGateway {
    async fn find_workshop(
        &self,
        id: WorkshopId,
        fields: &FieldSet<WorkshopField>,
    ) -> Result<WorkshopView> {
        let columns = fields.columns().collect::<Vec<_>>().join(", ");
        let sql = format!("SELECT {columns} FROM workshops WHERE id = $1");

        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("get workshop"))?
            .ok_or(DomainError::WorkshopNotFound)?;

        row_to_workshop_view(&row, fields).map_err(db_error("decode workshop"))
    }

    async fn list_workshops(&self, filter: &WorkshopFilter) -> Result<Vec<Workshop>> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {WORKSHOP_COLUMNS} FROM workshops WHERE TRUE"
        ));

        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", escape_like(search));
            query
                .push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(category) = &filter.category {
            query.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(event_date) = filter.event_date {
            query.push(" AND event_date = ").push_bind(event_date);
        }
        if filter.hide_full {
            query.push(" AND registered_count < total_seats");
        }

        let column = match filter.sort_by {
            SortKey::StartTime => "start_time",
            SortKey::Name => "name",
        };
        let direction = match filter.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        query.push(format!(" ORDER BY {column} {direction}, id ASC"));

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("list workshops"))?;

        rows.iter()
            .map(|row| row_to_workshop(row).map_err(db_error("decode workshop")))
            .collect()
    }

    async fn find_capacity(&self, id: WorkshopId) -> Result<WorkshopCapacity> {
        let row = sqlx::query(
            r"
            SELECT id, event_date, start_time, end_time, total_seats, registered_count
            FROM workshops
            WHERE id = $1
            ",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("get workshop"))?
        .ok_or(DomainError::WorkshopNotFound)?;

        let decode = |row: &PgRow| -> std::result::Result<WorkshopCapacity, sqlx::Error> {
            Ok(WorkshopCapacity {
                id: WorkshopId::new(row.try_get("id")?),
                event_date: row.try_get("event_date")?,
                slot: TimeSlot::new(row.try_get("start_time")?, row.try_get("end_time")?),
                total_seats: row.try_get("total_seats")?,
                registered_count: row.try_get("registered_count")?,
            })
        };
        decode(&row).map_err(db_error("decode workshop"))
    }

    async fn increment_registered_count(&self, tx: &mut PgUnitOfWork, id: WorkshopId) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE workshops
            SET registered_count = registered_count + 1
            WHERE id = $1 AND registered_count < total_seats
            ",
        )
        .bind(id.get())
        .execute(&mut *tx.tx)
        .await
        .map_err(db_error("increment registered count"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::WorkshopFull);
        }
        Ok(())
    }

    async fn decrement_registered_count(&self, tx: &mut PgUnitOfWork, id: WorkshopId) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE workshops
            SET registered_count = registered_count - 1
            WHERE id = $1 AND registered_count > 0
            ",
        )
        .bind(id.get())
        .execute(&mut *tx.tx)
        .await
        .map_err(db_error("decrement registered count"))?;

        if result.rows_affected() == 0 {
            tracing::error!(workshop_id = %id, "Seat counter already at zero on cancellation");
            return Err(DomainError::SeatCounterInconsistent { workshop_id: id });
        }
        Ok(())
    }
}

fn row_to_workshop(row: &PgRow) -> std::result::Result<Workshop, sqlx::Error> {
    Ok(Workshop {
        id: WorkshopId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        affiliation: row.try_get("affiliation")?,
        event_date: row.try_get("event_date")?,
        start_time: row.try_get("start_time")?,
        end_time: row.try_get("end_time")?,
        location: row.try_get("location")?,
        total_seats: row.try_get("total_seats")?,
        registered_count: row.try_get("registered_count")?,
    })
}

fn row_to_workshop_view(
    row: &PgRow,
    fields: &FieldSet<WorkshopField>,
) -> std::result::Result<WorkshopView, sqlx::Error> {
    let mut view = WorkshopView::default();
    for field in fields.iter() {
        let column = field.name();
        match field {
            WorkshopField::Id => view.id = Some(WorkshopId::new(row.try_get(column)?)),
            WorkshopField::Name => view.name = Some(row.try_get(column)?),
            WorkshopField::Description => view.description = Some(row.try_get(column)?),
            WorkshopField::Category => view.category = Some(row.try_get(column)?),
            WorkshopField::Affiliation => view.affiliation = Some(row.try_get(column)?),
            WorkshopField::EventDate => view.event_date = Some(row.try_get(column)?),
            WorkshopField::StartTime => view.start_time = Some(row.try_get(column)?),
            WorkshopField::EndTime => view.end_time = Some(row.try_get(column)?),
            WorkshopField::Location => view.location = Some(row.try_get(column)?),
            WorkshopField::TotalSeats => view.total_seats = Some(row.try_get(column)?),
            WorkshopField::RegisteredCount => view.registered_count = Some(row.try_get(column)?),
        }
    }
    Ok(view)
}
