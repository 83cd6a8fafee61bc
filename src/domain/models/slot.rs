use crate::domain::models::interval::Interval;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum SlotType {
    Time,
    FullDay,
    MultiDay,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Slot {
    pub id: String,
    pub booking_link_id: String,
    pub slot_type: SlotType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub manual: bool,
    pub created_at: DateTime<Utc>,
}

impl Slot {
    pub fn new(booking_link_id: String, slot_type: SlotType, interval: Interval, manual: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_link_id,
            slot_type,
            start_time: interval.start,
            end_time: interval.end,
            manual,
            created_at: Utc::now(),
        }
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.start_time, self.end_time)
    }
}
