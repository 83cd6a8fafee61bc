use crate::domain::models::{
    booking::BookingStatus,
    booking_link::BookingLink,
    form::CustomField,
    poll::{Poll, PollOption, PollStatus},
};
use serde::Serialize;

#[derive(Serialize)]
pub struct PublicBookingLinkResponse {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub timezone: String,
    pub slot_durations_minutes: Vec<i64>,
    pub auto_confirm: bool,
    pub custom_fields: Vec<CustomField>,
}

impl From<BookingLink> for PublicBookingLinkResponse {
    fn from(link: BookingLink) -> Self {
        Self {
            slug: link.slug,
            name: link.name,
            description: link.description,
            timezone: link.timezone,
            slot_durations_minutes: link.slot_durations_minutes,
            auto_confirm: link.auto_confirm,
            custom_fields: link.custom_fields,
        }
    }
}

#[derive(Serialize)]
pub struct BookingStatusResponse {
    pub booking_id: String,
    pub status: BookingStatus,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct PublicPollResponse {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub status: PollStatus,
    pub show_results: bool,
    pub require_email: bool,
    pub custom_fields: Vec<CustomField>,
    pub winning_option_id: Option<String>,
    pub options: Vec<PollOption>,
}

impl PublicPollResponse {
    pub fn new(poll: Poll, options: Vec<PollOption>) -> Self {
        Self {
            slug: poll.slug,
            name: poll.name,
            description: poll.description,
            status: poll.status,
            show_results: poll.show_results,
            require_email: poll.require_email,
            custom_fields: poll.custom_fields,
            winning_option_id: poll.winning_option_id,
            options,
        }
    }
}

#[derive(Serialize)]
pub struct PollWithOptionsResponse {
    #[serde(flatten)]
    pub poll: Poll,
    pub options: Vec<PollOption>,
}

#[derive(Serialize)]
pub struct VoteCreatedResponse {
    pub vote_id: String,
    pub message: &'static str,
}
