use crate::domain::models::{
    booking::{Booking, BookingStatus},
    booking_link::BookingLink,
    interval::Interval,
    poll::{Poll, PollOption, Vote},
    slot::Slot,
    user::Organizer,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn upsert(&self, organizer: &Organizer) -> Result<Organizer, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Organizer>, AppError>;
}

#[async_trait]
pub trait BookingLinkRepository: Send + Sync {
    async fn create(&self, link: &BookingLink) -> Result<BookingLink, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<BookingLink>, AppError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<BookingLink>, AppError>;
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<BookingLink>, AppError>;
    async fn update(&self, link: &BookingLink) -> Result<BookingLink, AppError>;
    async fn delete(&self, owner_id: &str, id: &str) -> Result<(), AppError>;

    async fn create_slot(&self, slot: &Slot) -> Result<Slot, AppError>;
    async fn find_slot(&self, link_id: &str, slot_id: &str) -> Result<Option<Slot>, AppError>;
    async fn list_manual_slots(&self, link_id: &str) -> Result<Vec<Slot>, AppError>;
    async fn delete_slot(&self, link_id: &str, slot_id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Inserts the booking (and `new_slot` when given) in one transaction, failing with
    /// `Conflict` if an active booking on the same link overlaps the booking's interval.
    async fn create_with_slot(&self, booking: &Booking, new_slot: Option<&Slot>) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn find_by_action_token(&self, token_hash: &str) -> Result<Option<Booking>, AppError>;
    async fn list_by_link(&self, link_id: &str) -> Result<Vec<Booking>, AppError>;
    async fn list_active_in_range(&self, link_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError>;
    /// Moves a pending booking to `status` and burns its token. Returns `false` when the
    /// booking was no longer pending.
    async fn resolve_pending(&self, id: &str, status: BookingStatus) -> Result<bool, AppError>;
    async fn set_calendar_event_uid(&self, id: &str, uid: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait PollRepository: Send + Sync {
    /// Inserts the poll together with its initial options in one transaction.
    async fn create_with_options(&self, poll: &Poll, options: &[PollOption]) -> Result<(Poll, Vec<PollOption>), AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Poll>, AppError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Poll>, AppError>;
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Poll>, AppError>;
    async fn update(&self, poll: &Poll) -> Result<Poll, AppError>;
    async fn delete(&self, owner_id: &str, id: &str) -> Result<(), AppError>;
    /// Flips an active poll to closed with its winner. Returns `false` if it was already closed.
    async fn close_with_winner(&self, id: &str, option_id: &str) -> Result<bool, AppError>;

    async fn create_option(&self, option: &PollOption) -> Result<PollOption, AppError>;
    async fn list_options(&self, poll_id: &str) -> Result<Vec<PollOption>, AppError>;
    async fn delete_option(&self, poll_id: &str, option_id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait VoteRepository: Send + Sync {
    async fn create(&self, vote: &Vote) -> Result<Vote, AppError>;
    async fn list_by_poll(&self, poll_id: &str) -> Result<Vec<Vote>, AppError>;
}

/// Source of an organizer's busy time, usually their connected calendars.
#[async_trait]
pub trait BusyPeriodProvider: Send + Sync {
    async fn busy_periods(&self, owner_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Interval>, AppError>;
}

/// Everything a calendar needs to create an event for a confirmed booking.
#[derive(Debug, Clone)]
pub struct CalendarEventDraft {
    pub uid: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendee_email: String,
}

#[async_trait]
pub trait CalendarEventWriter: Send + Sync {
    /// Returns the calendar's reference for the new event, or `None` when the
    /// organizer has no writable calendar.
    async fn create_event(&self, owner_id: &str, draft: &CalendarEventDraft) -> Result<Option<String>, AppError>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn booking_confirmed(&self, link: &BookingLink, booking: &Booking) -> Result<(), AppError>;
    async fn booking_pending(
        &self,
        link: &BookingLink,
        organizer: &Organizer,
        booking: &Booking,
        approve_url: &str,
        decline_url: &str,
    ) -> Result<(), AppError>;
    async fn booking_approved(&self, link: &BookingLink, booking: &Booking) -> Result<(), AppError>;
    async fn booking_declined(&self, link: &BookingLink, booking: &Booking) -> Result<(), AppError>;
    async fn poll_winner(&self, poll: &Poll, option: &PollOption, vote: &Vote) -> Result<(), AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str, attachment_name: Option<&str>, attachment_data: Option<&[u8]>) -> Result<(), AppError>;
}
