//! Decoding of the ID tokens issued at login.
//!
//! The signature is not verified: the token was issued to us, and we only
//! read display information out of it.

use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid JWT token format: expected 3 parts, found {0}")]
    Format(usize),
    #[error("Failed to base64 decode payload")]
    Base64(#[from] base64::DecodeError),
    #[error("Failed to parse JSON payload")]
    Json(#[from] serde_json::Error),
    #[error("no 'nickname' claim in token payload")]
    MissingNickname,
}

/// The claims we care about in an ID token.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct IdTokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Expiration time, seconds since the epoch.
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Decode the payload of a JWT.
pub fn decode_claims(jwt_token: &str) -> Result<IdTokenClaims, TokenError> {
    // JWT tokens have three parts separated by dots: Header.Payload.Signature
    let parts: Vec<&str> = jwt_token.split('.').collect();

    if parts.len() != 3 {
        return Err(TokenError::Format(parts.len()));
    }

    // Some issuers keep the padding, the URL-safe engine must not choke on it.
    let payload_base64 = parts[1].trim_end_matches('=');
    let decoded_payload_bytes = base64::prelude::BASE64_URL_SAFE_NO_PAD.decode(payload_base64)?;

    let claims = serde_json::from_slice(&decoded_payload_bytes)?;
    Ok(claims)
}

/// The display name of the user a token was issued to.
pub fn nickname(jwt_token: &str) -> Result<String, TokenError> {
    decode_claims(jwt_token)?
        .nickname
        .filter(|n| !n.is_empty())
        .ok_or(TokenError::MissingNickname)
}
