use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The person who owns booking links and polls. The id is the identity
/// provider's subject, so the row is upserted on first authenticated write.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Organizer {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Organizer {
    pub fn new(id: String, email: String, name: String) -> Self {
        Self { id, email, name, created_at: Utc::now() }
    }
}
