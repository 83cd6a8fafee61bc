use crate::domain::{models::{booking_link::BookingLink, slot::Slot}, ports::BookingLinkRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{types::Json, SqlitePool};

pub struct SqliteBookingLinkRepo {
    pool: SqlitePool,
}

impl SqliteBookingLinkRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingLinkRepository for SqliteBookingLinkRepo {
    async fn create(&self, link: &BookingLink) -> Result<BookingLink, AppError> {
        sqlx::query_as::<_, BookingLink>(
            "INSERT INTO booking_links (id, owner_id, slug, name, description, status, auto_confirm, slot_durations_minutes, buffer_minutes, timezone, availability_rules, custom_fields, event_template, meeting_link, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&link.id).bind(&link.owner_id).bind(&link.slug).bind(&link.name).bind(&link.description)
            .bind(link.status).bind(link.auto_confirm).bind(Json(&link.slot_durations_minutes)).bind(link.buffer_minutes)
            .bind(&link.timezone).bind(Json(&link.availability_rules)).bind(Json(&link.custom_fields))
            .bind(Json(&link.event_template)).bind(&link.meeting_link).bind(link.created_at).bind(link.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<BookingLink>, AppError> {
        sqlx::query_as::<_, BookingLink>("SELECT * FROM booking_links WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<BookingLink>, AppError> {
        sqlx::query_as::<_, BookingLink>("SELECT * FROM booking_links WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<BookingLink>, AppError> {
        sqlx::query_as::<_, BookingLink>("SELECT * FROM booking_links WHERE owner_id = ? ORDER BY created_at DESC")
            .bind(owner_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, link: &BookingLink) -> Result<BookingLink, AppError> {
        sqlx::query_as::<_, BookingLink>(
            "UPDATE booking_links SET name=?, description=?, status=?, auto_confirm=?, slot_durations_minutes=?, buffer_minutes=?, timezone=?, availability_rules=?, custom_fields=?, event_template=?, meeting_link=?, updated_at=?
             WHERE id=? AND owner_id=?
             RETURNING *"
        )
            .bind(&link.name).bind(&link.description).bind(link.status).bind(link.auto_confirm)
            .bind(Json(&link.slot_durations_minutes)).bind(link.buffer_minutes).bind(&link.timezone)
            .bind(Json(&link.availability_rules)).bind(Json(&link.custom_fields)).bind(Json(&link.event_template))
            .bind(&link.meeting_link).bind(link.updated_at)
            .bind(&link.id).bind(&link.owner_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM booking_links WHERE id = ? AND owner_id = ?")
            .bind(id).bind(owner_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Booking link not found".into())); }
        Ok(())
    }

    async fn create_slot(&self, slot: &Slot) -> Result<Slot, AppError> {
        sqlx::query_as::<_, Slot>(
            "INSERT INTO slots (id, booking_link_id, slot_type, start_time, end_time, manual, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&slot.id).bind(&slot.booking_link_id).bind(slot.slot_type)
            .bind(slot.start_time).bind(slot.end_time).bind(slot.manual).bind(slot.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_slot(&self, link_id: &str, slot_id: &str) -> Result<Option<Slot>, AppError> {
        sqlx::query_as::<_, Slot>("SELECT * FROM slots WHERE booking_link_id = ? AND id = ?")
            .bind(link_id).bind(slot_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_manual_slots(&self, link_id: &str) -> Result<Vec<Slot>, AppError> {
        sqlx::query_as::<_, Slot>("SELECT * FROM slots WHERE booking_link_id = ? AND manual = 1 ORDER BY start_time ASC")
            .bind(link_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete_slot(&self, link_id: &str, slot_id: &str) -> Result<(), AppError> {
        let booked: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE slot_id = ?")
            .bind(slot_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        if booked > 0 {
            return Err(AppError::Conflict("Slot already has bookings".into()));
        }

        let result = sqlx::query("DELETE FROM slots WHERE booking_link_id = ? AND id = ? AND manual = 1")
            .bind(link_id).bind(slot_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Slot not found".into())); }
        Ok(())
    }
}
