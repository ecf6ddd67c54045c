//! SQL implementation of the appointment repository
//!
//! The conflict-guarded writes (`insert_if_free`, `update_if_free`) run
//! their availability check and the write as one conditional statement, so
//! two racing bookings can never both pass the check and both commit.

use crate::error::DbError;
use crate::DbClient;
use bookify_common::services::{AppointmentRepository, BoxFuture, BoxedError, GuardedWrite};
use bookify_common::{Appointment, AppointmentStatus};
use chrono::{Duration, NaiveDateTime};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Stored timestamp format; chosen so SQLite's `datetime()` modifiers and
/// plain lexicographic comparison both work on the column.
const DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const COLUMNS: &str = "id, customer_id, scheduled_at, duration_minutes, status, \
     appointment_type, notes, contact_email, created_at, updated_at";

/// Rows whose `[scheduled_at, scheduled_at + duration)` interval intersects
/// the `($start, $end)` bind pair, among `scheduled` appointments.
const OVERLAP_PREDICATE: &str = "status = 'scheduled' \
     AND scheduled_at < $2 \
     AND datetime(scheduled_at, '+' || duration_minutes || ' minutes') > $1";

fn fmt_dt(value: NaiveDateTime) -> String {
    value.format(DT_FORMAT).to_string()
}

fn parse_dt(value: &str) -> Result<NaiveDateTime, DbError> {
    NaiveDateTime::parse_from_str(value, DT_FORMAT)
        .map_err(|e| DbError::MappingError(format!("bad timestamp {value:?}: {e}")))
}

fn row_to_appointment(row: &SqliteRow) -> Result<Appointment, DbError> {
    let id: String = row.try_get("id")?;
    let scheduled_at: String = row.try_get("scheduled_at")?;
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Appointment {
        id: Uuid::parse_str(&id).map_err(|e| DbError::MappingError(format!("bad id {id:?}: {e}")))?,
        customer_id: row.try_get("customer_id")?,
        scheduled_at: parse_dt(&scheduled_at)?,
        duration_minutes: row.try_get("duration_minutes")?,
        status: AppointmentStatus::parse(&status)
            .ok_or_else(|| DbError::MappingError(format!("unknown status {status:?}")))?,
        appointment_type: row.try_get("appointment_type")?,
        notes: row.try_get("notes")?,
        contact_email: row.try_get("contact_email")?,
        created_at: parse_dt(&created_at)?,
        updated_at: parse_dt(&updated_at)?,
    })
}

/// SQL implementation of the appointment repository
#[derive(Debug, Clone)]
pub struct SqlAppointmentRepository {
    /// The database client
    db_client: DbClient,
}

impl SqlAppointmentRepository {
    /// Create a new SQL appointment repository
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    /// Create the appointments table and its indexes if they do not exist.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing appointment schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS appointments (
                id TEXT PRIMARY KEY,
                customer_id TEXT NOT NULL,
                scheduled_at TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                status TEXT NOT NULL,
                appointment_type TEXT NOT NULL,
                notes TEXT,
                contact_email TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
        "#;
        self.db_client.execute(query).await?;
        self.db_client
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_appointments_scheduled_at \
                 ON appointments(scheduled_at)",
            )
            .await?;
        self.db_client
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_appointments_customer \
                 ON appointments(customer_id)",
            )
            .await?;

        info!("Appointment schema initialized successfully");
        Ok(())
    }

    async fn fetch_overlapping(
        &self,
        start: NaiveDateTime,
        duration_minutes: i64,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Appointment>, DbError> {
        let end = start + Duration::minutes(duration_minutes);
        let query = format!(
            "SELECT {COLUMNS} FROM appointments WHERE {OVERLAP_PREDICATE} \
             AND ($3 IS NULL OR id != $3) ORDER BY scheduled_at"
        );
        let rows = sqlx::query(&query)
            .bind(fmt_dt(start))
            .bind(fmt_dt(end))
            .bind(exclude.map(|id| id.to_string()))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to fetch overlapping appointments: {}", e);
                DbError::QueryError(e.to_string())
            })?;
        rows.iter().map(row_to_appointment).collect()
    }

    async fn get_inner(&self, id: Uuid) -> Result<Option<Appointment>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM appointments WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;
        row.as_ref().map(row_to_appointment).transpose()
    }

    async fn insert_inner(&self, appointment: Appointment) -> Result<Appointment, DbError> {
        debug!("Inserting appointment {}", appointment.id);

        let query = r#"
            INSERT INTO appointments (id, customer_id, scheduled_at, duration_minutes,
                status, appointment_type, notes, contact_email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#;
        sqlx::query(query)
            .bind(appointment.id.to_string())
            .bind(&appointment.customer_id)
            .bind(fmt_dt(appointment.scheduled_at))
            .bind(appointment.duration_minutes)
            .bind(appointment.status.as_str())
            .bind(&appointment.appointment_type)
            .bind(&appointment.notes)
            .bind(&appointment.contact_email)
            .bind(fmt_dt(appointment.created_at))
            .bind(fmt_dt(appointment.updated_at))
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert appointment: {}", e);
                DbError::QueryError(e.to_string())
            })?;
        Ok(appointment)
    }

    async fn insert_if_free_inner(
        &self,
        appointment: Appointment,
    ) -> Result<GuardedWrite, DbError> {
        let end = appointment.scheduled_at + Duration::minutes(appointment.duration_minutes);

        // Single conditional statement: the overlap check and the insert
        // commit together or not at all.
        let query = format!(
            "INSERT INTO appointments (id, customer_id, scheduled_at, duration_minutes, \
                 status, appointment_type, notes, contact_email, created_at, updated_at) \
             SELECT $3, $4, $1, $5, $6, $7, $8, $9, $10, $11 \
             WHERE NOT EXISTS (SELECT 1 FROM appointments WHERE {OVERLAP_PREDICATE})"
        );
        let result = sqlx::query(&query)
            .bind(fmt_dt(appointment.scheduled_at))
            .bind(fmt_dt(end))
            .bind(appointment.id.to_string())
            .bind(&appointment.customer_id)
            .bind(appointment.duration_minutes)
            .bind(appointment.status.as_str())
            .bind(&appointment.appointment_type)
            .bind(&appointment.notes)
            .bind(&appointment.contact_email)
            .bind(fmt_dt(appointment.created_at))
            .bind(fmt_dt(appointment.updated_at))
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed guarded insert: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            let clashes = self
                .fetch_overlapping(appointment.scheduled_at, appointment.duration_minutes, None)
                .await?;
            return Ok(GuardedWrite::SlotTaken(clashes));
        }
        Ok(GuardedWrite::Committed(appointment))
    }

    async fn update_inner(&self, appointment: Appointment) -> Result<Appointment, DbError> {
        debug!("Updating appointment {}", appointment.id);

        let query = r#"
            UPDATE appointments
            SET customer_id = $2, scheduled_at = $3, duration_minutes = $4, status = $5,
                appointment_type = $6, notes = $7, contact_email = $8, updated_at = $9
            WHERE id = $1
        "#;
        sqlx::query(query)
            .bind(appointment.id.to_string())
            .bind(&appointment.customer_id)
            .bind(fmt_dt(appointment.scheduled_at))
            .bind(appointment.duration_minutes)
            .bind(appointment.status.as_str())
            .bind(&appointment.appointment_type)
            .bind(&appointment.notes)
            .bind(&appointment.contact_email)
            .bind(fmt_dt(appointment.updated_at))
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to update appointment: {}", e);
                DbError::QueryError(e.to_string())
            })?;
        Ok(appointment)
    }

    async fn update_if_free_inner(
        &self,
        appointment: Appointment,
    ) -> Result<GuardedWrite, DbError> {
        let end = appointment.scheduled_at + Duration::minutes(appointment.duration_minutes);

        // The row's own id is excluded from the overlap check; the caller
        // has already confirmed the row exists.
        let query = format!(
            "UPDATE appointments SET scheduled_at = $1, updated_at = $3 \
             WHERE id = $4 AND NOT EXISTS ( \
                 SELECT 1 FROM appointments WHERE {OVERLAP_PREDICATE} AND id != $4)"
        );
        let result = sqlx::query(&query)
            .bind(fmt_dt(appointment.scheduled_at))
            .bind(fmt_dt(end))
            .bind(fmt_dt(appointment.updated_at))
            .bind(appointment.id.to_string())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed guarded update: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            let clashes = self
                .fetch_overlapping(
                    appointment.scheduled_at,
                    appointment.duration_minutes,
                    Some(appointment.id),
                )
                .await?;
            return Ok(GuardedWrite::SlotTaken(clashes));
        }
        Ok(GuardedWrite::Committed(appointment))
    }

    async fn delete_inner(&self, id: Uuid) -> Result<bool, DbError> {
        debug!("Deleting appointment {}", id);

        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id.to_string())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to delete appointment: {}", e);
                DbError::QueryError(e.to_string())
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_exact_start_inner(
        &self,
        scheduled_at: NaiveDateTime,
    ) -> Result<Vec<Appointment>, DbError> {
        let query = format!(
            "SELECT {COLUMNS} FROM appointments WHERE scheduled_at = $1 ORDER BY created_at"
        );
        let rows = sqlx::query(&query)
            .bind(fmt_dt(scheduled_at))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;
        rows.iter().map(row_to_appointment).collect()
    }

    async fn find_by_customer_inner(
        &self,
        customer_id: &str,
    ) -> Result<Vec<Appointment>, DbError> {
        let query = format!(
            "SELECT {COLUMNS} FROM appointments WHERE customer_id = $1 ORDER BY scheduled_at"
        );
        let rows = sqlx::query(&query)
            .bind(customer_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;
        rows.iter().map(row_to_appointment).collect()
    }

    async fn find_upcoming_inner(
        &self,
        from: NaiveDateTime,
        within_days: i64,
    ) -> Result<Vec<Appointment>, DbError> {
        let until = from + Duration::days(within_days);
        let query = format!(
            "SELECT {COLUMNS} FROM appointments \
             WHERE status = 'scheduled' AND scheduled_at >= $1 AND scheduled_at < $2 \
             ORDER BY scheduled_at"
        );
        let rows = sqlx::query(&query)
            .bind(fmt_dt(from))
            .bind(fmt_dt(until))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;
        rows.iter().map(row_to_appointment).collect()
    }

    async fn find_by_date_range_inner(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Appointment>, DbError> {
        let query = format!(
            "SELECT {COLUMNS} FROM appointments \
             WHERE scheduled_at >= $1 AND scheduled_at < $2 ORDER BY scheduled_at"
        );
        let rows = sqlx::query(&query)
            .bind(fmt_dt(start))
            .bind(fmt_dt(end))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;
        rows.iter().map(row_to_appointment).collect()
    }
}

fn boxed(err: DbError) -> BoxedError {
    BoxedError(Box::new(err))
}

impl AppointmentRepository for SqlAppointmentRepository {
    type Error = BoxedError;

    fn get(&self, id: Uuid) -> BoxFuture<'_, Option<Appointment>, Self::Error> {
        Box::pin(async move { self.get_inner(id).await.map_err(boxed) })
    }

    fn insert(&self, appointment: Appointment) -> BoxFuture<'_, Appointment, Self::Error> {
        Box::pin(async move { self.insert_inner(appointment).await.map_err(boxed) })
    }

    fn insert_if_free(&self, appointment: Appointment) -> BoxFuture<'_, GuardedWrite, Self::Error> {
        Box::pin(async move { self.insert_if_free_inner(appointment).await.map_err(boxed) })
    }

    fn update(&self, appointment: Appointment) -> BoxFuture<'_, Appointment, Self::Error> {
        Box::pin(async move { self.update_inner(appointment).await.map_err(boxed) })
    }

    fn update_if_free(&self, appointment: Appointment) -> BoxFuture<'_, GuardedWrite, Self::Error> {
        Box::pin(async move { self.update_if_free_inner(appointment).await.map_err(boxed) })
    }

    fn delete(&self, id: Uuid) -> BoxFuture<'_, bool, Self::Error> {
        Box::pin(async move { self.delete_inner(id).await.map_err(boxed) })
    }

    fn find_by_exact_start(
        &self,
        scheduled_at: NaiveDateTime,
    ) -> BoxFuture<'_, Vec<Appointment>, Self::Error> {
        Box::pin(async move {
            self.find_by_exact_start_inner(scheduled_at)
                .await
                .map_err(boxed)
        })
    }

    fn find_by_customer(&self, customer_id: &str) -> BoxFuture<'_, Vec<Appointment>, Self::Error> {
        let customer_id = customer_id.to_string();
        Box::pin(async move {
            self.find_by_customer_inner(&customer_id)
                .await
                .map_err(boxed)
        })
    }

    fn find_upcoming(
        &self,
        from: NaiveDateTime,
        within_days: i64,
    ) -> BoxFuture<'_, Vec<Appointment>, Self::Error> {
        Box::pin(async move {
            self.find_upcoming_inner(from, within_days)
                .await
                .map_err(boxed)
        })
    }

    fn find_by_date_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> BoxFuture<'_, Vec<Appointment>, Self::Error> {
        Box::pin(async move {
            self.find_by_date_range_inner(start, end)
                .await
                .map_err(boxed)
        })
    }
}
