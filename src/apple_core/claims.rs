//! Identity token claims and their decoding.
//!
//! Decoding is split from trust: [`decode_identity_token`] asks a
//! [`SignatureVerifier`] about the signature and then maps the payload, while the
//! protocol checks (issuer, audience, expiry, nonce) live in
//! [`IdentityClaims::verify_trust`] and [`IdentityClaims::verify_nonce`] and are
//! left for the caller to run.

use std::fmt;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, instrument};
use super::error::AppleAuthError;

/// Issuer of every Apple identity token.
pub const APPLE_ISSUER: &str = "https://appleid.apple.com";

/// A boolean claim Apple sends either as a JSON bool or as `"true"`/`"false"`.
///
/// [`value`](Self::value) is the normalized boolean. The original form is kept
/// so serializing gives back what was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppleBool {
    /// Received as a JSON boolean.
    Bool(bool),
    /// Received as a JSON string.
    Str(bool),
}

impl AppleBool {
    pub fn value(&self) -> bool {
        match *self {
            AppleBool::Bool(v) | AppleBool::Str(v) => v,
        }
    }
}

impl From<AppleBool> for bool {
    fn from(v: AppleBool) -> bool {
        v.value()
    }
}

impl Serialize for AppleBool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            AppleBool::Bool(v) => serializer.serialize_bool(v),
            AppleBool::Str(true) => serializer.serialize_str("true"),
            AppleBool::Str(false) => serializer.serialize_str("false"),
        }
    }
}

struct AppleBoolVisitor;

impl<'de> Visitor<'de> for AppleBoolVisitor {
    type Value = AppleBool;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a bool or the string \"true\" or \"false\"")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(AppleBool::Bool(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        match v {
            "true" => Ok(AppleBool::Str(true)),
            "false" => Ok(AppleBool::Str(false)),
            other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
        }
    }
}

impl<'de> Deserialize<'de> for AppleBool {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AppleBoolVisitor)
    }
}

/// Apple's estimate of whether the user is a real person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RealUserStatus {
    Unsupported,
    Unknown,
    LikelyReal,
}

impl TryFrom<u8> for RealUserStatus {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(RealUserStatus::Unsupported),
            1 => Ok(RealUserStatus::Unknown),
            2 => Ok(RealUserStatus::LikelyReal),
            other => Err(format!("unknown real_user_status {}", other)),
        }
    }
}

impl From<RealUserStatus> for u8 {
    fn from(v: RealUserStatus) -> u8 {
        match v {
            RealUserStatus::Unsupported => 0,
            RealUserStatus::Unknown => 1,
            RealUserStatus::LikelyReal => 2,
        }
    }
}

/// Claims carried by an Apple identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    #[serde(rename = "iss")]
    pub issuer: String,
    /// Stable user identifier within the team.
    #[serde(rename = "sub")]
    pub subject: String,
    /// Client ID the token was issued to.
    #[serde(rename = "aud")]
    pub audience: String,
    /// Seconds since the Unix epoch.
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Seconds since the Unix epoch.
    #[serde(rename = "exp")]
    pub expires_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce_supported: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<AppleBool>,
    /// Whether `email` is a private relay address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_private_email: Option<AppleBool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_user_status: Option<RealUserStatus>,
    /// Previous `sub` during an app transfer between teams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c_hash: Option<String>,
}

impl IdentityClaims {
    /// `email_verified`, false when absent.
    pub fn is_email_verified(&self) -> bool {
        self.email_verified.map(|v| v.value()).unwrap_or(false)
    }

    /// `is_private_email`, false when absent.
    pub fn is_private_relay_email(&self) -> bool {
        self.is_private_email.map(|v| v.value()).unwrap_or(false)
    }

    pub fn issued_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.issued_at, 0).single()
    }

    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.expires_at, 0).single()
    }

    /// Protocol checks: Apple issuer, audience equal to `client_id`, not expired at `now`.
    pub fn verify_trust(&self, client_id: &str, now: DateTime<Utc>) -> Result<(), AppleAuthError> {
        if self.issuer != APPLE_ISSUER {
            return Err(AppleAuthError::UntrustedClaims(format!("unexpected issuer {}", self.issuer)));
        }
        if self.audience != client_id {
            return Err(AppleAuthError::UntrustedClaims(format!("unexpected audience {}", self.audience)));
        }
        if self.expires_at <= now.timestamp() {
            return Err(AppleAuthError::UntrustedClaims("token has expired".to_string()));
        }
        Ok(())
    }

    /// Compare the `nonce` claim with the one sent in the authorization request.
    pub fn verify_nonce(&self, expected: &str) -> Result<(), AppleAuthError> {
        match self.nonce.as_deref() {
            Some(nonce) if nonce == expected => Ok(()),
            Some(_) => Err(AppleAuthError::UntrustedClaims("nonce mismatch".to_string())),
            None => Err(AppleAuthError::UntrustedClaims("nonce missing".to_string())),
        }
    }
}

/// Checks the signature of a compact JWT.
pub trait SignatureVerifier {
    fn verify(&self, token: &str) -> Result<(), AppleAuthError>;
}

impl<T: SignatureVerifier + ?Sized> SignatureVerifier for &T {
    fn verify(&self, token: &str) -> Result<(), AppleAuthError> {
        (**self).verify(token)
    }
}

/// Accepts any signature.
///
/// Only for identity tokens received directly from the token endpoint over TLS.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVerification;

impl SignatureVerifier for NoVerification {
    fn verify(&self, _token: &str) -> Result<(), AppleAuthError> {
        Ok(())
    }
}

/// Verifies signatures against a caller-supplied JWK set.
///
/// The set is typically the document published at
/// `https://appleid.apple.com/auth/keys`; fetching and caching it is up to the caller.
#[derive(Debug, Clone)]
pub struct JwkSetVerifier {
    keys: JwkSet,
    algorithms: Vec<Algorithm>,
}

impl JwkSetVerifier {
    /// Accepts RS256, the algorithm Apple signs identity tokens with.
    pub fn new(keys: JwkSet) -> Self {
        Self { keys, algorithms: vec![Algorithm::RS256] }
    }

    /// Replace the list of accepted algorithms.
    pub fn with_algorithms(mut self, algorithms: impl IntoIterator<Item = Algorithm>) -> Self {
        self.algorithms = algorithms.into_iter().collect();
        self
    }

    /// Parse a JWKS document.
    pub fn from_json(json: &str) -> Result<Self, AppleAuthError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }
}

impl SignatureVerifier for JwkSetVerifier {
    #[instrument(skip(self, token), level = "debug")]
    fn verify(&self, token: &str) -> Result<(), AppleAuthError> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| AppleAuthError::MalformedToken(e.to_string()))?;
        if !self.algorithms.contains(&header.alg) {
            return Err(AppleAuthError::Verification(format!("algorithm {:?} is not accepted", header.alg)));
        }
        let kid = header
            .kid
            .ok_or_else(|| AppleAuthError::Verification("token header has no kid".to_string()))?;
        let jwk = self
            .keys
            .find(&kid)
            .ok_or_else(|| AppleAuthError::Verification(format!("no key with kid {}", kid)))?;
        let key = DecodingKey::from_jwk(jwk).map_err(|e| AppleAuthError::Verification(e.to_string()))?;
        let (message, signature) = token
            .rsplit_once('.')
            .ok_or_else(|| AppleAuthError::MalformedToken("missing signature segment".to_string()))?;
        let valid = jsonwebtoken::crypto::verify(signature, message.as_bytes(), &key, header.alg)
            .map_err(|e| AppleAuthError::Verification(e.to_string()))?;
        if !valid {
            return Err(AppleAuthError::Verification("signature mismatch".to_string()));
        }
        debug!(kid = %kid, "identity token signature verified");
        Ok(())
    }
}

/// Verify the signature of `token` with `verifier`, then decode its claims.
pub fn decode_identity_token<V: SignatureVerifier>(
    token: &str,
    verifier: V,
) -> Result<IdentityClaims, AppleAuthError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(AppleAuthError::MalformedToken(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }
    verifier.verify(token)?;
    let payload = URL_SAFE_NO_PAD
        .decode(segments[1].trim_end_matches('='))
        .map_err(|e| AppleAuthError::MalformedToken(e.to_string()))?;
    Ok(serde_json::from_slice(&payload)?)
}
