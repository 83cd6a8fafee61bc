use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::ports::{BusyPeriodProvider, CalendarEventWriter, EmailService};
use crate::domain::services::{
    booking_service::{BookingService, BookingServiceDeps},
    poll_service::PollService,
};
use crate::error::AppError;
use crate::infra::calendar::disconnected::DisconnectedCalendar;
use crate::infra::email::{email_notifier::{load_templates, EmailNotifier}, http_email_service::HttpEmailService};
use crate::infra::repositories::{
    sqlite_booking_link_repo::SqliteBookingLinkRepo, sqlite_booking_repo::SqliteBookingRepo,
    sqlite_poll_repo::SqlitePollRepo, sqlite_user_repo::SqliteUserRepo, sqlite_vote_repo::SqliteVoteRepo,
};
use crate::state::AppState;

/// External systems the core talks to. Swapped for recording fakes in tests.
pub struct Collaborators {
    pub email: Arc<dyn EmailService>,
    pub busy: Arc<dyn BusyPeriodProvider>,
    pub calendar: Arc<dyn CalendarEventWriter>,
}

pub async fn bootstrap_state(config: &Config) -> Result<AppState, AppError> {
    info!("Initializing SQLite connection with WAL Mode...");

    let opts = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(|e| AppError::InternalWithMsg(format!("Invalid SQLite connection string: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await?;

    run_migrations(&pool).await?;

    let calendar = Arc::new(DisconnectedCalendar);
    let collaborators = Collaborators {
        email: Arc::new(HttpEmailService::new(
            config.mail_service_url.clone(),
            config.mail_service_token.clone(),
            config.mail_from_alias.clone(),
        )?),
        busy: calendar.clone(),
        calendar,
    };

    build_state(config, pool, collaborators)
}

/// Wires repositories and services around an already migrated pool.
pub fn build_state(config: &Config, pool: SqlitePool, collaborators: Collaborators) -> Result<AppState, AppError> {
    let templates = Arc::new(load_templates()?);
    let notifier = Arc::new(EmailNotifier::new(collaborators.email, templates));

    let user_repo = Arc::new(SqliteUserRepo::new(pool.clone()));
    let link_repo = Arc::new(SqliteBookingLinkRepo::new(pool.clone()));
    let booking_repo = Arc::new(SqliteBookingRepo::new(pool.clone()));
    let poll_repo = Arc::new(SqlitePollRepo::new(pool.clone()));
    let vote_repo = Arc::new(SqliteVoteRepo::new(pool));

    let booking_service = Arc::new(BookingService::new(BookingServiceDeps {
        links: link_repo.clone(),
        bookings: booking_repo,
        users: user_repo.clone(),
        busy: collaborators.busy,
        calendar: collaborators.calendar,
        notifier: notifier.clone(),
        base_url: config.base_url.clone(),
        calendar_timeout: config.calendar_timeout,
    }));

    let poll_service = Arc::new(PollService::new(poll_repo.clone(), vote_repo, notifier));

    Ok(AppState {
        config: config.clone(),
        user_repo,
        link_repo,
        poll_repo,
        booking_service,
        poll_service,
    })
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .map_err(|e| AppError::InternalWithMsg(format!("Failed to run SQLite migrations: {}", e)))
}
