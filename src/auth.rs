use crate::error::ApiError;
use crate::schemas::ParticipantName;
use actix_web::{dev::Payload, http::header::HeaderValue, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::num::ParseIntError;

type HmacSha256 = Hmac<Sha256>;

/// Token shared with trusted callers. Without one every mutating request
/// is rejected.
#[derive(Clone, Debug, Default)]
pub struct AuthSettings {
    pub api_token: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum AuthorizationLevel {
    Service,
    Member(ParticipantName),
}

impl AuthorizationLevel {
    /// Name put first on the roster of events this caller creates.
    pub fn host_name(&self) -> &str {
        match self {
            AuthorizationLevel::Service => crate::events::DEFAULT_HOST,
            AuthorizationLevel::Member(name) => name,
        }
    }
}

/// Login payload handed out by the front-end's login widget, signed with
/// a key derived from the API token.
#[derive(Deserialize, Debug, Clone)]
struct MemberLogin {
    auth_date: String,
    first_name: Option<String>,
    last_name: Option<String>,
    id: String,
    photo_url: Option<String>,
    username: String,
    hash: String,
}

pub fn check_authorization_level(
    request: &HttpRequest,
    api_token: &str,
) -> Option<AuthorizationLevel> {
    let authorization = request
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .map(HeaderValue::to_str)?
        .ok()?;
    let authorization = authorization
        .strip_prefix("Bearer ")
        .unwrap_or(authorization);
    if authorization == api_token {
        return Some(AuthorizationLevel::Service);
    }
    let login: MemberLogin = serde_json::from_str(authorization).ok()?;
    let hash = login
        .hash
        .chars()
        .collect::<Vec<_>>()
        .chunks(2)
        .map(|n| u8::from_str_radix(&String::from_iter(n), 16))
        .collect::<Result<Vec<u8>, ParseIntError>>()
        .ok()?;
    let mac = login_mac(&login, api_token)?;
    if mac.verify_slice(&hash).is_ok() {
        Some(AuthorizationLevel::Member(login.username))
    } else {
        None
    }
}

fn login_mac(login: &MemberLogin, api_token: &str) -> Option<HmacSha256> {
    let hash_content = [
        ("auth_date", Some(&login.auth_date)),
        ("first_name", login.first_name.as_ref()),
        ("id", Some(&login.id)),
        ("last_name", login.last_name.as_ref()),
        ("photo_url", login.photo_url.as_ref()),
        ("username", Some(&login.username)),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|value| format!("{key}={value}")))
    .collect::<Vec<_>>()
    .join("\n");

    let secret = Sha256::digest(api_token.as_bytes());
    let mut mac = HmacSha256::new_from_slice(&secret).ok()?;
    mac.update(hash_content.as_bytes());
    Some(mac)
}

impl FromRequest for AuthorizationLevel {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(request: &HttpRequest, _: &mut Payload) -> Self::Future {
        let level = request
            .app_data::<web::Data<AuthSettings>>()
            .and_then(|settings| settings.api_token.as_deref())
            .and_then(|token| check_authorization_level(request, token));
        ready(level.ok_or(ApiError::Unauthorized))
    }
}
