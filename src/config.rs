use crate::error::AppError;
use std::env;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Public origin used to build links in outgoing mail.
    pub base_url: String,
    pub mail_service_url: String,
    pub mail_service_token: String,
    pub mail_from_alias: String,
    pub jwt_public_key: String, // Ed25519 public key (PEM) of the identity provider
    pub auth_issuer: String,
    pub calendar_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let calendar_timeout = env::var("CALENDAR_TIMEOUT_SECS").unwrap_or_else(|_| "10".to_string());

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port: port.parse()
                .map_err(|_| AppError::InternalWithMsg(format!("PORT must be a number, got '{}'", port)))?,
            base_url: env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            mail_service_url: env::var("MAIL_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/send".to_string()),
            mail_service_token: env::var("MAIL_SERVICE_TOKEN").unwrap_or_default(),
            mail_from_alias: env::var("MAIL_FROM_ALIAS").unwrap_or_else(|_| "meet-mesh".to_string()),
            jwt_public_key: required("JWT_PUBLIC_KEY")?,
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "https://auth.meetmesh.local".to_string()),
            calendar_timeout: Duration::from_secs(calendar_timeout.parse().map_err(|_| {
                AppError::InternalWithMsg(format!("CALENDAR_TIMEOUT_SECS must be a number, got '{}'", calendar_timeout))
            })?),
        })
    }
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key).map_err(|_| AppError::InternalWithMsg(format!("{} must be set", key)))
}
