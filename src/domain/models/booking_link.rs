use crate::domain::models::form::CustomField;
use crate::error::AppError;
use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum LinkStatus {
    Active,
    Closed,
}

/// A weekly recurring window. `days_of_week` uses 0 = Sunday .. 6 = Saturday,
/// times are zero-padded `HH:MM` in the link's timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub days_of_week: Vec<u8>,
    pub start_time: String,
    pub end_time: String,
}

impl AvailabilityRule {
    pub fn applies_to(&self, weekday: u8) -> bool {
        self.days_of_week.contains(&weekday)
    }

    /// Parsed `(start, end)`; `None` when either side is malformed.
    pub fn window(&self) -> Option<(NaiveTime, NaiveTime)> {
        let start = parse_hhmm(&self.start_time)?;
        let end = parse_hhmm(&self.end_time)?;
        Some((start, end))
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.days_of_week.is_empty() {
            return Err(AppError::Validation("Availability rule needs at least one weekday".into()));
        }
        if self.days_of_week.iter().any(|d| *d > 6) {
            return Err(AppError::Validation("Weekday must be between 0 (Sunday) and 6 (Saturday)".into()));
        }
        let (start, end) = self.window()
            .ok_or(AppError::Validation("Times must use the HH:MM format".into()))?;
        if start >= end {
            return Err(AppError::Validation("Rule start time must be before its end time".into()));
        }
        Ok(())
    }
}

fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    // Rule checks compare formatted strings, so only the canonical form is accepted.
    if value.len() != 5 {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventTemplate {
    pub title_template: String,
    pub description_template: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookingLink {
    pub id: String,
    pub owner_id: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub status: LinkStatus,
    pub auto_confirm: bool,
    #[sqlx(json)]
    pub slot_durations_minutes: Vec<i64>,
    pub buffer_minutes: i64,
    pub timezone: String,
    #[sqlx(json)]
    pub availability_rules: Vec<AvailabilityRule>,
    #[sqlx(json)]
    pub custom_fields: Vec<CustomField>,
    #[sqlx(json)]
    pub event_template: Option<EventTemplate>,
    pub meeting_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewBookingLinkParams {
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub auto_confirm: bool,
    pub slot_durations_minutes: Vec<i64>,
    pub buffer_minutes: i64,
    pub timezone: String,
    pub availability_rules: Vec<AvailabilityRule>,
    pub custom_fields: Vec<CustomField>,
    pub event_template: Option<EventTemplate>,
    pub meeting_link: Option<String>,
}

impl BookingLink {
    pub fn new(params: NewBookingLinkParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: params.owner_id,
            slug: generate_slug(),
            name: params.name,
            description: params.description,
            status: LinkStatus::Active,
            auto_confirm: params.auto_confirm,
            slot_durations_minutes: params.slot_durations_minutes,
            buffer_minutes: params.buffer_minutes,
            timezone: params.timezone,
            availability_rules: params.availability_rules,
            custom_fields: params.custom_fields,
            event_template: params.event_template,
            meeting_link: params.meeting_link,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(chrono_tz::UTC)
    }

    pub fn default_duration(&self) -> Option<i64> {
        self.slot_durations_minutes.first().copied()
    }

    pub fn supports_duration(&self, minutes: i64) -> bool {
        self.slot_durations_minutes.contains(&minutes)
    }

    pub fn is_active(&self) -> bool {
        self.status == LinkStatus::Active
    }

    /// Validates the organizer-controlled configuration before it is stored.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".into()));
        }
        if self.slot_durations_minutes.is_empty() {
            return Err(AppError::Validation("At least one slot duration is required".into()));
        }
        if self.slot_durations_minutes.iter().any(|d| *d <= 0) {
            return Err(AppError::Validation("Slot durations must be positive".into()));
        }
        if self.buffer_minutes < 0 {
            return Err(AppError::Validation("Buffer must not be negative".into()));
        }
        if self.timezone.parse::<Tz>().is_err() {
            return Err(AppError::Validation(format!("Unknown timezone '{}'", self.timezone)));
        }
        for rule in &self.availability_rules {
            rule.validate()?;
        }
        crate::domain::models::form::validate_schema(&self.custom_fields)
    }
}

pub fn generate_slug() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}
