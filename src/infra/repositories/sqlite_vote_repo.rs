use crate::domain::{models::poll::Vote, ports::VoteRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{types::Json, SqlitePool};

pub struct SqliteVoteRepo {
    pool: SqlitePool,
}

impl SqliteVoteRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VoteRepository for SqliteVoteRepo {
    async fn create(&self, vote: &Vote) -> Result<Vote, AppError> {
        sqlx::query_as::<_, Vote>(
            "INSERT INTO votes (id, poll_id, guest_email, guest_name, responses, custom_fields, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&vote.id).bind(&vote.poll_id).bind(&vote.guest_email).bind(&vote.guest_name)
            .bind(Json(&vote.responses)).bind(Json(&vote.custom_fields)).bind(vote.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_poll(&self, poll_id: &str) -> Result<Vec<Vote>, AppError> {
        sqlx::query_as::<_, Vote>("SELECT * FROM votes WHERE poll_id = ? ORDER BY created_at ASC")
            .bind(poll_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
