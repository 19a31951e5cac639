use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use super::http_client::{HttpMethod, HttpRequest};
use super::types::ValidationRequest;

/// Default base URL of Apple's identity service.
pub const APPLE_BASE_URL: &str = "https://appleid.apple.com";
/// Token endpoint path.
pub const TOKEN_PATH: &str = "/auth/token";
/// Revoke endpoint path.
pub const REVOKE_PATH: &str = "/auth/revoke";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

// Everything except ALPHA / DIGIT / "-" / "." / "_" / "~" gets escaped.
const FORM_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Encode a key or value for an `application/x-www-form-urlencoded` body.
/// Spaces become `+`.
pub fn encode_form_component(input: &str) -> String {
    input
        .split(' ')
        .map(|part| utf8_percent_encode(part, FORM_VALUE).to_string())
        .collect::<Vec<_>>()
        .join("+")
}

/// Join encoded pairs into a form body, keeping the given order.
pub fn encode_form(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode_form_component(k), encode_form_component(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Form fields of a request, in the order they are sent.
pub fn form_fields(request: &ValidationRequest) -> Vec<(&'static str, &str)> {
    match request {
        ValidationRequest::Web(req) => vec![
            ("client_id", req.client_id.as_str()),
            ("client_secret", req.client_secret.as_str()),
            ("code", req.code.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", req.redirect_uri.as_str()),
        ],
        ValidationRequest::App(req) => vec![
            ("client_id", req.client_id.as_str()),
            ("client_secret", req.client_secret.as_str()),
            ("code", req.code.as_str()),
            ("grant_type", "authorization_code"),
        ],
        ValidationRequest::Refresh(req) => vec![
            ("client_id", req.client_id.as_str()),
            ("client_secret", req.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", req.refresh_token.as_str()),
        ],
        ValidationRequest::RevokeAccess(req) => {
            let mut fields = Vec::with_capacity(4);
            if let Some(client_id) = &req.client_id {
                fields.push(("client_id", client_id.as_str()));
            }
            fields.push(("client_secret", req.client_secret.as_str()));
            fields.push(("token", req.access_token.as_str()));
            fields.push(("token_type_hint", "access_token"));
            fields
        }
        ValidationRequest::RevokeRefresh(req) => vec![
            ("client_id", req.client_id.as_str()),
            ("client_secret", req.client_secret.as_str()),
            ("token", req.refresh_token.as_str()),
            ("token_type_hint", "refresh_token"),
        ],
    }
}

/// Endpoint path a request is sent to.
pub fn endpoint_path(request: &ValidationRequest) -> &'static str {
    match request {
        ValidationRequest::Web(_) | ValidationRequest::App(_) | ValidationRequest::Refresh(_) => TOKEN_PATH,
        ValidationRequest::RevokeAccess(_) | ValidationRequest::RevokeRefresh(_) => REVOKE_PATH,
    }
}

/// Build the HTTP request for `request` against `base_url`. No I/O.
pub fn build_request(base_url: &str, request: &ValidationRequest) -> HttpRequest {
    let url = format!("{}{}", base_url.trim_end_matches('/'), endpoint_path(request));
    let body = encode_form(&form_fields(request)).into_bytes();
    HttpRequest {
        method: HttpMethod::POST,
        url,
        headers: vec![("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string())],
        body: Some(body),
    }
}
