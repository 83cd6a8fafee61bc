use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, Method},
};
use crate::state::AppState;
use crate::domain::models::auth::Claims;
use crate::domain::models::user::Organizer;
use crate::error::AppError;
use std::sync::Arc;
use tower_cookies::Cookies;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::{warn, Span};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const CSRF_HEADER: &str = "X-CSRF-Token";
pub const TOKEN_AUDIENCE: &str = "meet-mesh";

/// The organizer behind the session cookie issued by the identity provider.
pub struct AuthUser(pub Organizer);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = parts.extensions.get::<Cookies>()
            .ok_or(AppError::InternalWithMsg("Cookie layer missing".into()))?;

        let access_token = cookies.get(ACCESS_TOKEN_COOKIE)
            .ok_or(AppError::Unauthorized)?
            .value()
            .to_string();

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let decoding_key = DecodingKey::from_ed_pem(app_state.config.jwt_public_key.as_bytes())
            .map_err(|e| AppError::InternalWithMsg(format!("Invalid JWT public key: {}", e)))?;

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_audience(&[TOKEN_AUDIENCE]);
        validation.set_issuer(&[app_state.config.auth_issuer.as_str()]);

        let claims = decode::<Claims>(&access_token, &decoding_key, &validation)
            .map_err(|e| {
                warn!("Rejected session token: {}", e);
                AppError::Unauthorized
            })?
            .claims;

        if !matches!(parts.method, Method::GET | Method::HEAD | Method::OPTIONS) {
            let csrf_header_val = parts.headers.get(CSRF_HEADER)
                .and_then(|v| v.to_str().ok())
                .ok_or(AppError::Forbidden("Missing CSRF token".into()))?;

            if csrf_header_val != claims.csrf_token {
                return Err(AppError::Forbidden("CSRF token mismatch".into()));
            }
        }

        let name = if claims.name.is_empty() { claims.email.clone() } else { claims.name };
        let organizer = Organizer::new(claims.sub, claims.email, name);

        Span::current().record("user_id", &organizer.id);

        Ok(AuthUser(organizer))
    }
}
