use crate::domain::{models::poll::{Poll, PollOption}, ports::PollRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{query::QueryAs, sqlite::SqliteArguments, types::Json, Sqlite, SqlitePool};

pub struct SqlitePollRepo {
    pool: SqlitePool,
}

impl SqlitePollRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn insert_option(option: &PollOption) -> QueryAs<'_, Sqlite, PollOption, SqliteArguments<'_>> {
    sqlx::query_as::<_, PollOption>(
        "INSERT INTO poll_options (id, poll_id, option_type, start_time, end_time, created_at)
         VALUES (?, ?, ?, ?, ?, ?)
         RETURNING *"
    )
        .bind(&option.id).bind(&option.poll_id).bind(option.option_type)
        .bind(option.start_time).bind(option.end_time).bind(option.created_at)
}

#[async_trait]
impl PollRepository for SqlitePollRepo {
    async fn create_with_options(&self, poll: &Poll, options: &[PollOption]) -> Result<(Poll, Vec<PollOption>), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let created = sqlx::query_as::<_, Poll>(
            "INSERT INTO polls (id, owner_id, slug, name, description, status, show_results, require_email, custom_fields, winning_option_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&poll.id).bind(&poll.owner_id).bind(&poll.slug).bind(&poll.name).bind(&poll.description)
            .bind(poll.status).bind(poll.show_results).bind(poll.require_email).bind(Json(&poll.custom_fields))
            .bind(&poll.winning_option_id).bind(poll.created_at).bind(poll.updated_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;

        let mut stored = Vec::with_capacity(options.len());
        for option in options {
            stored.push(insert_option(option).fetch_one(&mut *tx).await.map_err(AppError::Database)?);
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok((created, stored))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Poll>, AppError> {
        sqlx::query_as::<_, Poll>("SELECT * FROM polls WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Poll>, AppError> {
        sqlx::query_as::<_, Poll>("SELECT * FROM polls WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Poll>, AppError> {
        sqlx::query_as::<_, Poll>("SELECT * FROM polls WHERE owner_id = ? ORDER BY created_at DESC")
            .bind(owner_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, poll: &Poll) -> Result<Poll, AppError> {
        sqlx::query_as::<_, Poll>(
            "UPDATE polls SET name=?, description=?, show_results=?, require_email=?, custom_fields=?, updated_at=?
             WHERE id=? AND owner_id=?
             RETURNING *"
        )
            .bind(&poll.name).bind(&poll.description).bind(poll.show_results).bind(poll.require_email)
            .bind(Json(&poll.custom_fields)).bind(poll.updated_at)
            .bind(&poll.id).bind(&poll.owner_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM polls WHERE id = ? AND owner_id = ?")
            .bind(id).bind(owner_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Poll not found".into())); }
        Ok(())
    }

    async fn close_with_winner(&self, id: &str, option_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE polls SET status = 'closed', winning_option_id = ?, updated_at = ? WHERE id = ? AND status = 'active'"
        )
            .bind(option_id).bind(Utc::now()).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() == 1)
    }

    async fn create_option(&self, option: &PollOption) -> Result<PollOption, AppError> {
        insert_option(option).fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_options(&self, poll_id: &str) -> Result<Vec<PollOption>, AppError> {
        sqlx::query_as::<_, PollOption>("SELECT * FROM poll_options WHERE poll_id = ? ORDER BY start_time ASC, end_time ASC")
            .bind(poll_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete_option(&self, poll_id: &str, option_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM poll_options WHERE poll_id = ? AND id = ?")
            .bind(poll_id).bind(option_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Option not found".into())); }
        Ok(())
    }
}
