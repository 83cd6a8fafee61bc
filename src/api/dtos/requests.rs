use crate::domain::models::{
    booking_link::{AvailabilityRule, EventTemplate, LinkStatus},
    form::CustomField,
    poll::VoteResponse,
    slot::SlotType,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Deserialize)]
pub struct CreateBookingLinkRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub auto_confirm: bool,
    pub slot_durations_minutes: Vec<i64>,
    #[serde(default)]
    pub buffer_minutes: i64,
    pub timezone: Option<String>,
    #[serde(default)]
    pub availability_rules: Vec<AvailabilityRule>,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
    pub event_template: Option<EventTemplate>,
    pub meeting_link: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateBookingLinkRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<LinkStatus>,
    pub auto_confirm: Option<bool>,
    pub slot_durations_minutes: Option<Vec<i64>>,
    pub buffer_minutes: Option<i64>,
    pub timezone: Option<String>,
    pub availability_rules: Option<Vec<AvailabilityRule>>,
    pub custom_fields: Option<Vec<CustomField>>,
    pub event_template: Option<EventTemplate>,
    pub meeting_link: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateSlotRequest {
    pub slot_type: Option<SlotType>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub duration: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub slot_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub guest_email: String,
    pub guest_name: Option<String>,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, String>,
}

#[derive(Deserialize)]
pub struct ActionQuery {
    pub token: String,
}

#[derive(Deserialize)]
pub struct CreatePollRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub show_results: bool,
    #[serde(default)]
    pub require_email: bool,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
    #[serde(default)]
    pub options: Vec<CreatePollOptionRequest>,
}

#[derive(Deserialize)]
pub struct UpdatePollRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub show_results: Option<bool>,
    pub require_email: Option<bool>,
    pub custom_fields: Option<Vec<CustomField>>,
}

#[derive(Deserialize)]
pub struct CreatePollOptionRequest {
    pub option_type: Option<SlotType>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct SubmitVoteRequest {
    pub guest_email: Option<String>,
    pub guest_name: Option<String>,
    pub responses: BTreeMap<String, VoteResponse>,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, String>,
}

#[derive(Deserialize)]
pub struct PickWinnerRequest {
    pub option_id: String,
}
