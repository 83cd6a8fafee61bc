use crate::domain::models::{interval::Interval, slot::Slot};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Declined,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Declined => "declined",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: String,
    pub booking_link_id: String,
    pub slot_id: String,
    pub guest_email: String,
    pub guest_name: Option<String>,
    #[sqlx(json)]
    pub custom_fields: BTreeMap<String, String>,
    pub status: BookingStatus,
    /// SHA-256 of the emailed action token; cleared once the booking leaves `pending`.
    #[serde(skip_serializing)]
    pub action_token_hash: Option<String>,
    pub calendar_event_uid: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub booking_link_id: String,
    pub slot: Slot,
    pub guest_email: String,
    pub guest_name: Option<String>,
    pub custom_fields: BTreeMap<String, String>,
    pub auto_confirm: bool,
}

impl Booking {
    /// Builds a booking plus the raw action token. Only the token's hash is kept
    /// on the booking; the raw value goes out in the approval email.
    pub fn new(params: NewBookingParams) -> (Self, Option<String>) {
        let now = Utc::now();
        let (status, token) = if params.auto_confirm {
            (BookingStatus::Confirmed, None)
        } else {
            (BookingStatus::Pending, Some(generate_action_token()))
        };

        let booking = Self {
            id: Uuid::new_v4().to_string(),
            booking_link_id: params.booking_link_id,
            slot_id: params.slot.id.clone(),
            guest_email: params.guest_email,
            guest_name: params.guest_name,
            custom_fields: params.custom_fields,
            status,
            action_token_hash: token.as_deref().map(hash_action_token),
            calendar_event_uid: None,
            start_time: params.slot.start_time,
            end_time: params.slot.end_time,
            created_at: now,
            updated_at: now,
        };

        (booking, token)
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.start_time, self.end_time)
    }

    pub fn guest_display_name(&self) -> &str {
        self.guest_name.as_deref().filter(|n| !n.is_empty()).unwrap_or(&self.guest_email)
    }
}

/// 32 random bytes, hex encoded.
pub fn generate_action_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().r#gen();
    hex::encode(bytes)
}

pub fn hash_action_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
