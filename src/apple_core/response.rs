use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;
use super::error::AppleAuthError;
use super::types::{ProviderError, RefreshResponse, RevokeResponse, ValidationResponse};

/// A response shape Apple may answer with.
pub trait ProviderResponse: DeserializeOwned {
    /// Whether an empty body stands for `{}`.
    const EMPTY_BODY_IS_EMPTY_OBJECT: bool = false;

    /// Raw `error` field.
    fn error(&self) -> Option<&str>;

    /// Raw `error_description` field.
    fn error_description(&self) -> Option<&str>;

    /// The in-band rejection, if Apple reported one.
    fn provider_error(&self) -> Option<ProviderError> {
        self.error().map(|code| ProviderError::new(code, self.error_description()))
    }

    /// True when Apple did not report an error.
    fn is_success(&self) -> bool {
        self.error().is_none()
    }
}

impl ProviderResponse for ValidationResponse {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn error_description(&self) -> Option<&str> {
        self.error_description.as_deref()
    }
}

impl ProviderResponse for RefreshResponse {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn error_description(&self) -> Option<&str> {
        self.error_description.as_deref()
    }
}

impl ProviderResponse for RevokeResponse {
    // Apple answers a successful revocation with 200 and no body.
    const EMPTY_BODY_IS_EMPTY_OBJECT: bool = true;

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn error_description(&self) -> Option<&str> {
        self.error_description.as_deref()
    }
}

/// Decode a response body.
///
/// Missing fields become `None`. An `error` field is decoded like any other;
/// only a body that is not a JSON object fails.
pub fn decode_response<T: ProviderResponse>(bytes: &[u8]) -> Result<T, AppleAuthError> {
    if T::EMPTY_BODY_IS_EMPTY_OBJECT && bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_value(Value::Object(Default::default()))?);
    }
    let value: Value = serde_json::from_slice(bytes)?;
    if !value.is_object() {
        return Err(AppleAuthError::Decode(serde_json::Error::custom(
            "expected a JSON object",
        )));
    }
    Ok(serde_json::from_value(value)?)
}
