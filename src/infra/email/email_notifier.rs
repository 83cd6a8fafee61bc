use std::sync::Arc;

use async_trait::async_trait;
use tera::{Context, Tera};
use tracing::info;

use crate::domain::models::{
    booking::Booking,
    booking_link::BookingLink,
    poll::{Poll, PollOption, Vote},
    slot::SlotType,
    user::Organizer,
};
use crate::domain::ports::{EmailService, Notifier};
use crate::domain::services::calendar::{build_event_draft, generate_ics};
use crate::error::AppError;

const INVITE_FILENAME: &str = "invite.ics";

/// Loads the notification templates compiled into the binary.
pub fn load_templates() -> Result<Tera, AppError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("booking_confirmed.html", include_str!("../../../templates/booking_confirmed.html")),
        ("booking_pending.html", include_str!("../../../templates/booking_pending.html")),
        ("booking_approved.html", include_str!("../../../templates/booking_approved.html")),
        ("booking_declined.html", include_str!("../../../templates/booking_declined.html")),
        ("poll_winner.html", include_str!("../../../templates/poll_winner.html")),
    ])
    .map_err(|e| AppError::InternalWithMsg(format!("Failed to load email templates: {}", e)))?;
    Ok(tera)
}

/// Renders notifications with Tera and hands them to the mail relay.
pub struct EmailNotifier {
    email: Arc<dyn EmailService>,
    templates: Arc<Tera>,
}

impl EmailNotifier {
    pub fn new(email: Arc<dyn EmailService>, templates: Arc<Tera>) -> Self {
        Self { email, templates }
    }

    fn render(&self, template: &str, context: &Context) -> Result<String, AppError> {
        self.templates.render(template, context)
            .map_err(|e| AppError::InternalWithMsg(format!("Rendering {} failed: {}", template, e)))
    }

    fn booking_context(link: &BookingLink, booking: &Booking) -> Context {
        let tz = link.tz();
        let mut ctx = Context::new();
        ctx.insert("link_name", &link.name);
        ctx.insert("guest_name", booking.guest_display_name());
        ctx.insert("guest_email", &booking.guest_email);
        ctx.insert("when", &booking.start_time.with_timezone(&tz).format("%A, %B %-d %Y, %H:%M").to_string());
        ctx.insert("timezone", &link.timezone);
        ctx.insert("meeting_link", &link.meeting_link);
        ctx.insert("custom_fields", &booking.custom_fields);
        ctx
    }

    async fn send_with_invite(&self, link: &BookingLink, booking: &Booking, subject: &str, template: &str) -> Result<(), AppError> {
        let body = self.render(template, &Self::booking_context(link, booking))?;
        let ics = generate_ics(&build_event_draft(link, booking));

        self.email.send(&booking.guest_email, subject, &body, Some(INVITE_FILENAME), Some(ics.as_bytes())).await?;
        info!("Sent '{}' to guest of booking {}", subject, booking.id);
        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn booking_confirmed(&self, link: &BookingLink, booking: &Booking) -> Result<(), AppError> {
        let subject = format!("Booking Confirmed: {}", link.name);
        self.send_with_invite(link, booking, &subject, "booking_confirmed.html").await
    }

    async fn booking_pending(
        &self,
        link: &BookingLink,
        organizer: &Organizer,
        booking: &Booking,
        approve_url: &str,
        decline_url: &str,
    ) -> Result<(), AppError> {
        let mut ctx = Self::booking_context(link, booking);
        ctx.insert("organizer_name", &organizer.name);
        ctx.insert("approve_url", approve_url);
        ctx.insert("decline_url", decline_url);

        let subject = format!("New Booking Request: {}", link.name);
        let body = self.render("booking_pending.html", &ctx)?;

        self.email.send(&organizer.email, &subject, &body, None, None).await?;
        info!("Sent approval request for booking {} to organizer {}", booking.id, organizer.id);
        Ok(())
    }

    async fn booking_approved(&self, link: &BookingLink, booking: &Booking) -> Result<(), AppError> {
        let subject = format!("Booking Approved: {}", link.name);
        self.send_with_invite(link, booking, &subject, "booking_approved.html").await
    }

    async fn booking_declined(&self, link: &BookingLink, booking: &Booking) -> Result<(), AppError> {
        let subject = format!("Booking Declined: {}", link.name);
        let body = self.render("booking_declined.html", &Self::booking_context(link, booking))?;

        self.email.send(&booking.guest_email, &subject, &body, None, None).await?;
        info!("Sent decline notice for booking {}", booking.id);
        Ok(())
    }

    async fn poll_winner(&self, poll: &Poll, option: &PollOption, vote: &Vote) -> Result<(), AppError> {
        let Some(recipient) = vote.guest_email.as_deref() else {
            return Ok(());
        };

        let when = match option.option_type {
            SlotType::Time => option.start_time.format("%A, %B %-d %Y, %H:%M UTC").to_string(),
            SlotType::FullDay => option.start_time.format("%A, %B %-d %Y").to_string(),
            SlotType::MultiDay => format!(
                "{} - {}",
                option.start_time.format("%B %-d %Y"),
                option.end_time.format("%B %-d %Y")
            ),
        };

        let mut ctx = Context::new();
        ctx.insert("poll_name", &poll.name);
        ctx.insert("guest_name", vote.guest_name.as_deref().unwrap_or(recipient));
        ctx.insert("when", &when);

        let subject = format!("Date Selected: {}", poll.name);
        let body = self.render("poll_winner.html", &ctx)?;
        self.email.send(recipient, &subject, &body, None, None).await
    }
}
