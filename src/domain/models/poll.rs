use crate::domain::models::{booking_link::generate_slug, form::CustomField, interval::Interval, slot::SlotType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PollStatus {
    Active,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteResponse {
    Yes,
    No,
    Maybe,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Poll {
    pub id: String,
    pub owner_id: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub status: PollStatus,
    pub show_results: bool,
    pub require_email: bool,
    #[sqlx(json)]
    pub custom_fields: Vec<CustomField>,
    pub winning_option_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Poll {
    pub fn new(
        owner_id: String,
        name: String,
        description: String,
        show_results: bool,
        require_email: bool,
        custom_fields: Vec<CustomField>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            slug: generate_slug(),
            name,
            description,
            status: PollStatus::Active,
            show_results,
            require_email,
            custom_fields,
            winning_option_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.status == PollStatus::Closed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PollOption {
    pub id: String,
    pub poll_id: String,
    pub option_type: SlotType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PollOption {
    pub fn new(poll_id: String, option_type: SlotType, interval: Interval) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            poll_id,
            option_type,
            start_time: interval.start,
            end_time: interval.end,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vote {
    pub id: String,
    pub poll_id: String,
    pub guest_email: Option<String>,
    pub guest_name: Option<String>,
    /// Keyed by poll option id. Ids that do not belong to the poll are kept but never counted.
    #[sqlx(json)]
    pub responses: BTreeMap<String, VoteResponse>,
    #[sqlx(json)]
    pub custom_fields: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(
        poll_id: String,
        guest_email: Option<String>,
        guest_name: Option<String>,
        responses: BTreeMap<String, VoteResponse>,
        custom_fields: BTreeMap<String, String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            poll_id,
            guest_email,
            guest_name,
            responses,
            custom_fields,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    pub option_id: String,
    pub yes_count: u32,
    pub no_count: u32,
    pub maybe_count: u32,
}

impl VoteTally {
    pub fn empty(option_id: String) -> Self {
        Self { option_id, yes_count: 0, no_count: 0, maybe_count: 0 }
    }

    pub fn record(&mut self, response: VoteResponse) {
        match response {
            VoteResponse::Yes => self.yes_count += 1,
            VoteResponse::No => self.no_count += 1,
            VoteResponse::Maybe => self.maybe_count += 1,
        }
    }
}
