//! Client secret JWT signing (ES256).

use std::fmt;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use super::error::AppleAuthError;

/// Audience of every client secret.
pub const APPLE_AUDIENCE: &str = "https://appleid.apple.com";

/// Longest client secret lifetime Apple accepts (six months), in seconds.
///
/// Not enforced by [`sign_client_secret`]; staying under it is up to the caller.
pub const MAX_CLIENT_SECRET_LIFETIME: i64 = 15_777_000;

/// Inputs of a client secret.
#[derive(Clone)]
pub struct ClientSecretParams {
    /// Apple Developer team ID, the `iss` claim.
    pub team_id: String,
    /// Services ID or bundle ID, the `sub` claim.
    pub client_id: String,
    /// Identifier of the Sign in with Apple key, the `kid` header.
    pub key_id: String,
    /// PKCS#8 PEM of the P-256 private key (the `.p8` file).
    pub private_key: String,
    pub issued_at: DateTime<Utc>,
    /// Must be after `issued_at`.
    pub expiry: DateTime<Utc>,
}

impl fmt::Debug for ClientSecretParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecretParams")
            .field("team_id", &self.team_id)
            .field("client_id", &self.client_id)
            .field("key_id", &self.key_id)
            .field("private_key", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// Payload of a client secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSecretClaims {
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub aud: String,
    pub sub: String,
}

impl ClientSecretClaims {
    pub fn from_params(params: &ClientSecretParams) -> Self {
        ClientSecretClaims {
            iss: params.team_id.clone(),
            iat: params.issued_at.timestamp(),
            exp: params.expiry.timestamp(),
            aud: APPLE_AUDIENCE.to_string(),
            sub: params.client_id.clone(),
        }
    }
}

/// Sign a client secret with the key in `params`.
///
/// The result is not verified; the key is parsed for this call only and not kept.
#[instrument(skip(params), fields(client_id = %params.client_id, key_id = %params.key_id), level = "debug")]
pub fn sign_client_secret(params: &ClientSecretParams) -> Result<String, AppleAuthError> {
    let claims = ClientSecretClaims::from_params(params);
    if claims.exp <= claims.iat {
        return Err(AppleAuthError::InvalidSecretLifetime { issued_at: claims.iat, expiry: claims.exp });
    }
    let key = EncodingKey::from_ec_pem(params.private_key.as_bytes()).map_err(AppleAuthError::Signing)?;
    let mut header = Header::new(Algorithm::ES256);
    header.kid = Some(params.key_id.clone());
    encode(&header, &claims, &key).map_err(AppleAuthError::Signing)
}
