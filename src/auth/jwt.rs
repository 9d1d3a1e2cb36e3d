use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Distinguishes the two token flavours so one can't stand in for the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Access token payload. Roles and permissions are a snapshot taken at
/// issuance; later role changes only show up after the next refresh.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    pub user_id: i64,
    pub username: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub typ: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    pub user_id: i64,
    pub typ: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

impl AccessClaims {
    pub fn new(
        user_id: i64,
        username: String,
        roles: Vec<String>,
        permissions: Vec<String>,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            username,
            roles,
            permissions,
            typ: TokenKind::Access,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

impl RefreshClaims {
    pub fn new(user_id: i64, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            typ: TokenKind::Refresh,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

pub fn encode_token<T: Serialize>(claims: &T, secret: &str) -> Result<String, String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("JWT encode failed: {e}"))
}

fn decode_token<T: DeserializeOwned>(token: &str, secret: &str) -> Result<T, String> {
    decode::<T>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("JWT decode failed: {e}"))
}

pub fn decode_access(token: &str, secret: &str) -> Result<AccessClaims, String> {
    let claims: AccessClaims = decode_token(token, secret)?;
    if claims.typ != TokenKind::Access {
        return Err("not an access token".to_string());
    }
    Ok(claims)
}

pub fn decode_refresh(token: &str, secret: &str) -> Result<RefreshClaims, String> {
    let claims: RefreshClaims = decode_token(token, secret)?;
    if claims.typ != TokenKind::Refresh {
        return Err("not a refresh token".to_string());
    }
    Ok(claims)
}
