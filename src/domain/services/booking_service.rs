use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::models::{
    auth::Principal,
    booking::{hash_action_token, Booking, BookingStatus, NewBookingParams},
    booking_link::BookingLink,
    form::{is_valid_email, validate_values},
    interval::Interval,
    slot::{Slot, SlotType},
    user::Organizer,
};
use crate::domain::ports::{
    BookingLinkRepository, BookingRepository, BusyPeriodProvider, CalendarEventWriter, Notifier, UserRepository,
};
use crate::domain::services::availability::{generate_slots, is_within_availability, resolve_duration};
use crate::domain::services::calendar::build_event_draft;
use crate::domain::services::link_locks::LinkLocks;
use crate::error::AppError;

const MAX_AVAILABILITY_RANGE_DAYS: i64 = 62;

pub struct BookingServiceDeps {
    pub links: Arc<dyn BookingLinkRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub users: Arc<dyn UserRepository>,
    pub busy: Arc<dyn BusyPeriodProvider>,
    pub calendar: Arc<dyn CalendarEventWriter>,
    pub notifier: Arc<dyn Notifier>,
    pub base_url: String,
    pub calendar_timeout: Duration,
}

/// Which time the guest picked: a generated interval or an organizer-created slot.
#[derive(Debug, Clone)]
pub enum SlotChoice {
    Interval(Interval),
    Manual(String),
}

#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub slot: SlotChoice,
    pub guest_email: String,
    pub guest_name: Option<String>,
    pub custom_fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingOutcome {
    pub booking: Booking,
    pub message: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Decline,
}

#[derive(Debug, Clone)]
pub enum Resolution {
    Resolved(Booking),
    AlreadyProcessed(Booking),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailableSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Availability {
    pub timezone: String,
    pub duration_minutes: Option<i64>,
    pub slots: Vec<AvailableSlot>,
}

pub struct BookingService {
    links: Arc<dyn BookingLinkRepository>,
    bookings: Arc<dyn BookingRepository>,
    users: Arc<dyn UserRepository>,
    busy: Arc<dyn BusyPeriodProvider>,
    calendar: Arc<dyn CalendarEventWriter>,
    notifier: Arc<dyn Notifier>,
    locks: LinkLocks,
    base_url: String,
    calendar_timeout: Duration,
}

impl BookingService {
    pub fn new(deps: BookingServiceDeps) -> Self {
        Self {
            links: deps.links,
            bookings: deps.bookings,
            users: deps.users,
            busy: deps.busy,
            calendar: deps.calendar,
            notifier: deps.notifier,
            locks: LinkLocks::new(),
            base_url: deps.base_url.trim_end_matches('/').to_string(),
            calendar_timeout: deps.calendar_timeout,
        }
    }

    pub async fn find_active_link(&self, slug: &str) -> Result<BookingLink, AppError> {
        self.links.find_by_slug(slug).await?
            .filter(BookingLink::is_active)
            .ok_or(AppError::NotFound("Booking link not found".into()))
    }

    /// Open slots of a link between `start` and `end`, generated ones plus free manual slots.
    pub async fn available_slots(
        &self,
        slug: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        duration: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Availability, AppError> {
        if end <= start {
            return Err(AppError::Validation("Range end must be after its start".into()));
        }
        if (end - start).num_days() > MAX_AVAILABILITY_RANGE_DAYS {
            return Err(AppError::Validation(format!("Range must not exceed {} days", MAX_AVAILABILITY_RANGE_DAYS)));
        }

        let link = self.find_active_link(slug).await?;

        let Some(duration) = resolve_duration(&link, duration) else {
            return Ok(Availability { timezone: link.timezone, duration_minutes: None, slots: Vec::new() });
        };

        let booked: Vec<Interval> = self.bookings.list_active_in_range(&link.id, start, end).await?
            .iter()
            .map(Booking::interval)
            .collect();

        let mut busy = self.fetch_busy(&link.owner_id, start, end).await;
        busy.extend(booked);

        let mut slots: Vec<AvailableSlot> = generate_slots(&link, start, end, &busy, duration, now)
            .into_iter()
            .map(|i| AvailableSlot { start: i.start, end: i.end, slot_id: None })
            .collect();

        for manual in self.links.list_manual_slots(&link.id).await? {
            let interval = manual.interval();
            if interval.start < now || interval.start < start || interval.end > end {
                continue;
            }
            if busy.iter().any(|b| b.overlaps(&interval)) {
                continue;
            }
            slots.push(AvailableSlot { start: interval.start, end: interval.end, slot_id: Some(manual.id) });
        }

        slots.sort_by(|a, b| (a.start, a.end).cmp(&(b.start, b.end)));
        Ok(Availability { timezone: link.timezone, duration_minutes: Some(duration), slots })
    }

    /// Validates a guest's pick against the current state and stores it.
    pub async fn submit(&self, slug: &str, request: BookingRequest, now: DateTime<Utc>) -> Result<BookingOutcome, AppError> {
        let link = self.find_active_link(slug).await?;

        let guest_email = request.guest_email.trim().to_string();
        if !is_valid_email(&guest_email) {
            return Err(AppError::Validation("A valid email address is required".into()));
        }
        let custom_fields = validate_values(&link.custom_fields, &request.custom_fields)?;

        let (slot, is_new_slot) = match request.slot {
            SlotChoice::Manual(slot_id) => {
                let slot = self.links.find_slot(&link.id, &slot_id).await?
                    .filter(|s| s.manual)
                    .ok_or(AppError::NotFound("Slot not found".into()))?;
                if slot.start_time < now {
                    return Err(AppError::Validation("Cannot book slots in the past".into()));
                }
                (slot, false)
            }
            SlotChoice::Interval(interval) => {
                if interval.is_empty() {
                    return Err(AppError::Validation("Slot end must be after its start".into()));
                }
                let minutes = interval.duration_minutes();
                if interval.end - interval.start != chrono::Duration::minutes(minutes) || !link.supports_duration(minutes) {
                    return Err(AppError::Validation("Invalid slot duration".into()));
                }
                if interval.start < now {
                    return Err(AppError::Validation("Cannot book slots in the past".into()));
                }
                if !is_within_availability(&interval, &link.availability_rules, &link.tz()) {
                    return Err(AppError::Validation("Slot not within available hours".into()));
                }
                (Slot::new(link.id.clone(), SlotType::Time, interval, false), true)
            }
        };

        let interval = slot.interval();
        let busy = self.fetch_busy(&link.owner_id, interval.start, interval.end).await;
        if busy.iter().any(|b| b.overlaps(&interval)) {
            warn!("Booking rejected: slot {:?} overlaps busy time for link {}", interval, link.id);
            return Err(AppError::Conflict("Slot no longer available".into()));
        }

        let (booking, action_token) = Booking::new(NewBookingParams {
            booking_link_id: link.id.clone(),
            slot: slot.clone(),
            guest_email,
            guest_name: request.guest_name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            custom_fields,
            auto_confirm: link.auto_confirm,
        });

        let created = {
            let _guard = self.locks.acquire(&link.id).await;
            self.bookings.create_with_slot(&booking, is_new_slot.then_some(&slot)).await?
        };
        info!("Booking {} created for link {} with status {}", created.id, link.slug, created.status.as_str());

        match (created.status, action_token) {
            (BookingStatus::Pending, Some(token)) => {
                self.request_approval(&link, &created, &token).await;
                Ok(BookingOutcome { booking: created, message: "Booking pending approval" })
            }
            _ => {
                if let Err(e) = self.notifier.booking_confirmed(&link, &created).await {
                    warn!("Confirmation email for booking {} failed: {:?}", created.id, e);
                }
                let booking = self.attach_calendar_event(&link, created).await;
                Ok(BookingOutcome { booking, message: "Booking confirmed" })
            }
        }
    }

    pub async fn approve(&self, booking_id: &str, organizer: &Organizer) -> Result<Resolution, AppError> {
        self.decide(&Principal::Organizer(organizer.clone()), Some(booking_id), Decision::Approve).await
    }

    pub async fn decline(&self, booking_id: &str, organizer: &Organizer) -> Result<Resolution, AppError> {
        self.decide(&Principal::Organizer(organizer.clone()), Some(booking_id), Decision::Decline).await
    }

    pub async fn approve_with_token(&self, token: &str) -> Result<Resolution, AppError> {
        self.decide(&Principal::ActionToken(token.to_string()), None, Decision::Approve).await
    }

    pub async fn decline_with_token(&self, token: &str) -> Result<Resolution, AppError> {
        self.decide(&Principal::ActionToken(token.to_string()), None, Decision::Decline).await
    }

    /// Moves a pending booking to its final state. Anything but `pending` is
    /// reported as already processed without side effects.
    pub async fn decide(&self, principal: &Principal, booking_id: Option<&str>, decision: Decision) -> Result<Resolution, AppError> {
        let (link, mut booking) = self.locate(principal, booking_id).await?;

        if booking.status != BookingStatus::Pending {
            return Ok(Resolution::AlreadyProcessed(booking));
        }

        let target = match decision {
            Decision::Approve => BookingStatus::Confirmed,
            Decision::Decline => BookingStatus::Declined,
        };

        if !self.bookings.resolve_pending(&booking.id, target).await? {
            info!("Booking {} was resolved concurrently", booking.id);
            let id = booking.id.clone();
            let current = self.bookings.find_by_id(&id).await?.unwrap_or(booking);
            return Ok(Resolution::AlreadyProcessed(current));
        }

        booking.status = target;
        booking.action_token_hash = None;
        info!("Booking {} moved to {}", booking.id, target.as_str());

        let booking = match decision {
            Decision::Approve => {
                if let Err(e) = self.notifier.booking_approved(&link, &booking).await {
                    warn!("Approval email for booking {} failed: {:?}", booking.id, e);
                }
                self.attach_calendar_event(&link, booking).await
            }
            Decision::Decline => {
                if let Err(e) = self.notifier.booking_declined(&link, &booking).await {
                    warn!("Decline email for booking {} failed: {:?}", booking.id, e);
                }
                booking
            }
        };

        Ok(Resolution::Resolved(booking))
    }

    pub async fn list_for_link(&self, link_id: &str, organizer: &Organizer) -> Result<Vec<Booking>, AppError> {
        let link = self.links.find_by_id(link_id).await?
            .ok_or(AppError::NotFound("Booking link not found".into()))?;
        if link.owner_id != organizer.id {
            return Err(AppError::Forbidden("Not your booking link".into()));
        }
        self.bookings.list_by_link(&link.id).await
    }

    async fn locate(&self, principal: &Principal, booking_id: Option<&str>) -> Result<(BookingLink, Booking), AppError> {
        let booking = match principal {
            Principal::Organizer(_) => {
                let id = booking_id.ok_or(AppError::Validation("Booking id is required".into()))?;
                self.bookings.find_by_id(id).await?
            }
            Principal::ActionToken(token) => {
                self.bookings.find_by_action_token(&hash_action_token(token)).await?
                    .filter(|b| booking_id.is_none_or(|id| id == b.id))
            }
        }
        .ok_or(AppError::NotFound("Booking not found".into()))?;

        let link = self.links.find_by_id(&booking.booking_link_id).await?
            .ok_or(AppError::NotFound("Booking link not found".into()))?;

        if let Principal::Organizer(organizer) = principal
            && organizer.id != link.owner_id {
            return Err(AppError::Forbidden("Not your booking".into()));
        }

        Ok((link, booking))
    }

    async fn request_approval(&self, link: &BookingLink, booking: &Booking, token: &str) {
        let organizer = match self.users.find_by_id(&link.owner_id).await {
            Ok(Some(o)) => o,
            Ok(None) => {
                warn!("Owner {} of link {} not found, approval email skipped", link.owner_id, link.id);
                return;
            }
            Err(e) => {
                warn!("Owner lookup for link {} failed: {:?}", link.id, e);
                return;
            }
        };

        let approve_url = format!("{}/api/v1/actions/approve?token={}", self.base_url, token);
        let decline_url = format!("{}/api/v1/actions/decline?token={}", self.base_url, token);

        if let Err(e) = self.notifier.booking_pending(link, &organizer, booking, &approve_url, &decline_url).await {
            warn!("Approval request email for booking {} failed: {:?}", booking.id, e);
        }
    }

    async fn attach_calendar_event(&self, link: &BookingLink, mut booking: Booking) -> Booking {
        let draft = build_event_draft(link, &booking);
        let created = tokio::time::timeout(self.calendar_timeout, self.calendar.create_event(&link.owner_id, &draft)).await;

        match created {
            Ok(Ok(Some(uid))) => match self.bookings.set_calendar_event_uid(&booking.id, &uid).await {
                Ok(()) => booking.calendar_event_uid = Some(uid),
                Err(e) => warn!("Storing calendar event for booking {} failed: {:?}", booking.id, e),
            },
            Ok(Ok(None)) => {}
            Ok(Err(e)) => warn!("Calendar event for booking {} failed: {:?}", booking.id, e),
            Err(_) => warn!("Calendar event for booking {} timed out", booking.id),
        }

        booking
    }

    async fn fetch_busy(&self, owner_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Interval> {
        match tokio::time::timeout(self.calendar_timeout, self.busy.busy_periods(owner_id, start, end)).await {
            Ok(Ok(periods)) => periods,
            Ok(Err(e)) => {
                warn!("Busy periods for {} unavailable: {:?}", owner_id, e);
                Vec::new()
            }
            Err(_) => {
                warn!("Busy periods for {} timed out", owner_id);
                Vec::new()
            }
        }
    }
}
