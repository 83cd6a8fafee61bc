use crate::domain::models::{booking::Booking, booking_link::BookingLink};
use crate::domain::ports::CalendarEventDraft;
use icalendar::{Calendar, Component, Event as IcalEvent, EventLike};

const DEFAULT_TITLE: &str = "Meeting";

/// Substitutes the guest placeholders supported in event templates.
pub fn expand_placeholders(template: &str, booking: &Booking, meeting_link: Option<&str>) -> String {
    template
        .replace("{{guest_name}}", booking.guest_name.as_deref().unwrap_or(""))
        .replace("{{guest_email}}", &booking.guest_email)
        .replace("{{meeting_link}}", meeting_link.unwrap_or(""))
}

/// Builds the calendar event for a confirmed booking from the link's template,
/// falling back to the link's own name and description.
pub fn build_event_draft(link: &BookingLink, booking: &Booking) -> CalendarEventDraft {
    let meeting_link = link.meeting_link.as_deref();

    let (title, description, location) = match &link.event_template {
        Some(template) => {
            let title = expand_placeholders(&template.title_template, booking, meeting_link);
            let description = expand_placeholders(&template.description_template, booking, meeting_link);
            (title, description, template.location.clone())
        }
        None => (link.name.clone(), link.description.clone(), String::new()),
    };

    let title = if title.trim().is_empty() { DEFAULT_TITLE.to_string() } else { title };
    let location = if location.is_empty() {
        meeting_link.unwrap_or_default().to_string()
    } else {
        location
    };

    CalendarEventDraft {
        uid: booking.id.clone(),
        title,
        description,
        location,
        start: booking.start_time,
        end: booking.end_time,
        attendee_email: booking.guest_email.clone(),
    }
}

/// Generates an iCalendar (.ics) string for the event
pub fn generate_ics(draft: &CalendarEventDraft) -> String {
    let mut calendar = Calendar::new();

    let ical_event = IcalEvent::new()
        .summary(&draft.title)
        .description(&draft.description)
        .location(&draft.location)
        .starts(draft.start)
        .ends(draft.end)
        .uid(&draft.uid)
        .done();

    calendar.push(ical_event);
    calendar.to_string()
}
