use std::sync::Arc;
use crate::config::Config;
use crate::domain::ports::{BookingLinkRepository, PollRepository, UserRepository};
use crate::domain::services::{booking_service::BookingService, poll_service::PollService};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub link_repo: Arc<dyn BookingLinkRepository>,
    pub poll_repo: Arc<dyn PollRepository>,
    pub booking_service: Arc<BookingService>,
    pub poll_service: Arc<PollService>,
}
