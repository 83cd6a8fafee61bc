use crate::domain::{models::{booking::{Booking, BookingStatus}, slot::Slot}, ports::BookingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, SqlitePool};

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create_with_slot(&self, booking: &Booking, new_slot: Option<&Slot>) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let overlapping: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookings
             WHERE booking_link_id = ? AND status IN ('pending', 'confirmed') AND start_time < ? AND end_time > ?"
        )
            .bind(&booking.booking_link_id).bind(booking.end_time).bind(booking.start_time)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        if overlapping > 0 {
            return Err(AppError::Conflict("Slot no longer available".into()));
        }

        if let Some(slot) = new_slot {
            sqlx::query("INSERT INTO slots (id, booking_link_id, slot_type, start_time, end_time, manual, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)")
                .bind(&slot.id).bind(&slot.booking_link_id).bind(slot.slot_type)
                .bind(slot.start_time).bind(slot.end_time).bind(slot.manual).bind(slot.created_at)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
        }

        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, booking_link_id, slot_id, guest_email, guest_name, custom_fields, status, action_token_hash, calendar_event_uid, start_time, end_time, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.booking_link_id).bind(&booking.slot_id)
            .bind(&booking.guest_email).bind(&booking.guest_name).bind(Json(&booking.custom_fields))
            .bind(booking.status).bind(&booking.action_token_hash).bind(&booking.calendar_event_uid)
            .bind(booking.start_time).bind(booking.end_time).bind(booking.created_at).bind(booking.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_action_token(&self, token_hash: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE action_token_hash = ?")
            .bind(token_hash)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_link(&self, link_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE booking_link_id = ? ORDER BY created_at DESC")
            .bind(link_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_active_in_range(&self, link_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings
             WHERE booking_link_id = ? AND status IN ('pending', 'confirmed') AND start_time < ? AND end_time > ?
             ORDER BY start_time ASC"
        )
            .bind(link_id).bind(end).bind(start)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn resolve_pending(&self, id: &str, status: BookingStatus) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE bookings SET status = ?, action_token_hash = NULL, updated_at = ? WHERE id = ? AND status = 'pending'"
        )
            .bind(status).bind(Utc::now()).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn set_calendar_event_uid(&self, id: &str, uid: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE bookings SET calendar_event_uid = ?, updated_at = ? WHERE id = ?")
            .bind(uid).bind(Utc::now()).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }
}
