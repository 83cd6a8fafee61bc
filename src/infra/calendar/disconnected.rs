use crate::domain::models::interval::Interval;
use crate::domain::ports::{BusyPeriodProvider, CalendarEventDraft, CalendarEventWriter};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Stand-in for organizers without a connected calendar: never busy, nowhere to write.
pub struct DisconnectedCalendar;

#[async_trait]
impl BusyPeriodProvider for DisconnectedCalendar {
    async fn busy_periods(&self, owner_id: &str, _start: DateTime<Utc>, _end: DateTime<Utc>) -> Result<Vec<Interval>, AppError> {
        debug!("No calendar connected for {}, reporting no busy time", owner_id);
        Ok(Vec::new())
    }
}

#[async_trait]
impl CalendarEventWriter for DisconnectedCalendar {
    async fn create_event(&self, owner_id: &str, draft: &CalendarEventDraft) -> Result<Option<String>, AppError> {
        debug!("No writable calendar for {}, skipping event {}", owner_id, draft.uid);
        Ok(None)
    }
}
