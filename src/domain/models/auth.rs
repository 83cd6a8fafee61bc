use crate::domain::models::user::Organizer;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
    pub email: String,
    #[serde(default)]
    pub name: String,

    #[serde(rename = "https://meetmesh.app/claims/csrf")]
    pub csrf_token: String,
}

/// Who is acting on a booking: an authenticated organizer or the holder of an
/// emailed single-use action token.
#[derive(Debug, Clone)]
pub enum Principal {
    Organizer(Organizer),
    ActionToken(String),
}
