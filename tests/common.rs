#![allow(dead_code)]

use meet_mesh_backend::{
    api::{extractors::auth::TOKEN_AUDIENCE, router::create_router},
    config::Config,
    domain::models::{auth::Claims, interval::Interval},
    domain::ports::{BusyPeriodProvider, CalendarEventDraft, CalendarEventWriter, EmailService},
    error::AppError,
    infra::factory::{build_state, run_migrations, Collaborators},
    state::AppState,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc, Weekday};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::Value;
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

pub const ISSUER: &str = "test-issuer";

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub html: String,
    pub attachment_name: Option<String>,
}

#[derive(Default)]
pub struct RecordingEmailService {
    pub sent: Mutex<Vec<SentEmail>>,
}

impl RecordingEmailService {
    pub fn all(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn with_subject_prefix(&self, prefix: &str) -> Vec<SentEmail> {
        self.all().into_iter().filter(|m| m.subject.starts_with(prefix)).collect()
    }
}

#[async_trait]
impl EmailService for RecordingEmailService {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        attachment_name: Option<&str>,
        _attachment_data: Option<&[u8]>
    ) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(SentEmail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            html: html_body.to_string(),
            attachment_name: attachment_name.map(str::to_string),
        });
        Ok(())
    }
}

/// Scriptable calendar: serves canned busy periods and counts created events.
#[derive(Default)]
pub struct FakeCalendar {
    pub busy: Mutex<Vec<Interval>>,
    pub fail_busy: AtomicBool,
    pub writable: AtomicBool,
    pub events_created: AtomicUsize,
}

impl FakeCalendar {
    pub fn set_busy(&self, periods: Vec<Interval>) {
        *self.busy.lock().unwrap() = periods;
    }
}

#[async_trait]
impl BusyPeriodProvider for FakeCalendar {
    async fn busy_periods(&self, _owner_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Interval>, AppError> {
        if self.fail_busy.load(Ordering::SeqCst) {
            return Err(AppError::InternalWithMsg("calendar server unreachable".into()));
        }
        let window = Interval::new(start, end);
        Ok(self.busy.lock().unwrap().iter().filter(|b| b.overlaps(&window)).copied().collect())
    }
}

#[async_trait]
impl CalendarEventWriter for FakeCalendar {
    async fn create_event(&self, _owner_id: &str, draft: &CalendarEventDraft) -> Result<Option<String>, AppError> {
        if !self.writable.load(Ordering::SeqCst) {
            return Ok(None);
        }
        self.events_created.fetch_add(1, Ordering::SeqCst);
        Ok(Some(format!("cal-{}", draft.uid)))
    }
}

pub struct AuthHeaders {
    pub access_token: String,
    pub csrf_token: String,
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub emails: Arc<RecordingEmailService>,
    pub calendar: Arc<FakeCalendar>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        run_migrations(&pool).await.expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            base_url: "http://localhost:3000".to_string(),
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            mail_from_alias: "test".to_string(),
            jwt_public_key: include_str!("../tests/keys/test_public.pem").to_string(),
            auth_issuer: ISSUER.to_string(),
            calendar_timeout: std::time::Duration::from_secs(2),
        };

        let emails = Arc::new(RecordingEmailService::default());
        let calendar = Arc::new(FakeCalendar::default());

        let state = Arc::new(build_state(&config, pool.clone(), Collaborators {
            email: emails.clone(),
            busy: calendar.clone(),
            calendar: calendar.clone(),
        }).expect("Failed to build state"));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            emails,
            calendar,
        }
    }

    /// Mints a session the way the identity provider would.
    pub fn login(&self, organizer_id: &str, email: &str) -> AuthHeaders {
        let csrf_token = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let claims = Claims {
            iss: ISSUER.to_string(),
            sub: organizer_id.to_string(),
            aud: TOKEN_AUDIENCE.to_string(),
            exp: (now + Duration::minutes(15)).timestamp() as usize,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: format!("Organizer {}", organizer_id),
            csrf_token: csrf_token.clone(),
        };

        let key = EncodingKey::from_ed_pem(include_bytes!("../tests/keys/test_private.pem")).unwrap();
        let access_token = encode(&Header::new(Algorithm::EdDSA), &claims, &key).unwrap();

        AuthHeaders { access_token, csrf_token }
    }

    pub async fn call(&self, method: &str, uri: &str, body: Option<Value>, auth: Option<&AuthHeaders>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder
                .header(header::COOKIE, format!("access_token={}", auth.access_token))
                .header("X-CSRF-Token", &auth.csrf_token);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        (status, parse_body(response).await)
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

/// The next occurrence of `weekday` at `hh:mm` UTC, at least one day out.
pub fn next_weekday_at(weekday: Weekday, hh: u32, mm: u32) -> DateTime<Utc> {
    let mut date = Utc::now().date_naive() + Duration::days(1);
    while date.weekday() != weekday {
        date += Duration::days(1);
    }
    Utc.from_utc_datetime(&date.and_time(NaiveTime::from_hms_opt(hh, mm, 0).unwrap()))
}

/// Pulls the 64-hex-char action token out of an approval email.
pub fn extract_token(html: &str, action: &str) -> String {
    let marker = format!("actions&#x2F;{}?token=", action);
    let plain_marker = format!("actions/{}?token=", action);
    let start = html.find(&marker).map(|i| i + marker.len())
        .or_else(|| html.find(&plain_marker).map(|i| i + plain_marker.len()))
        .expect("no action link in email");
    html[start..start + 64].to_string()
}

/// Creates a UTC booking link open Mondays 09:00-10:00 with 30 minute slots.
pub async fn create_monday_link(app: &TestApp, auth: &AuthHeaders, auto_confirm: bool) -> Value {
    let (status, body) = app.call("POST", "/api/v1/booking-links", Some(serde_json::json!({
        "name": "Intro Call",
        "description": "Let's talk",
        "auto_confirm": auto_confirm,
        "slot_durations_minutes": [30, 60],
        "timezone": "UTC",
        "availability_rules": [{ "days_of_week": [1], "start_time": "09:00", "end_time": "10:00" }]
    })), Some(auth)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}
