use crate::domain::{models::user::Organizer, ports::UserRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteUserRepo {
    pool: SqlitePool,
}

impl SqliteUserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepo {
    async fn upsert(&self, organizer: &Organizer) -> Result<Organizer, AppError> {
        sqlx::query_as::<_, Organizer>(
            "INSERT INTO organizers (id, email, name, created_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET email = excluded.email, name = excluded.name
             RETURNING *"
        )
            .bind(&organizer.id).bind(&organizer.email).bind(&organizer.name).bind(organizer.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Organizer>, AppError> {
        sqlx::query_as::<_, Organizer>("SELECT * FROM organizers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
}
