use starberry_apple_signin::apple_core::request::{encode_form, encode_form_component};
use starberry_apple_signin::{HttpMethod, ValidationRequest, build_request};

const BASE: &str = "https://appleid.apple.com";

fn body(request: &ValidationRequest) -> String {
    String::from_utf8(build_request(BASE, request).body.unwrap()).unwrap()
}

fn keys(request: &ValidationRequest) -> Vec<String> {
    body(request)
        .split('&')
        .map(|pair| pair.split('=').next().unwrap().to_string())
        .collect()
}

#[test]
fn test_refresh_request_end_to_end() {
    let secret = "eyJhbGciOiJFUzI1NiJ9.eyJpc3MiOiJUIn0.c2ln";
    let req = ValidationRequest::refresh("com.example.app", secret, "r_123");
    let http = build_request(BASE, &req);
    assert_eq!(http.method, HttpMethod::POST);
    assert_eq!(http.url, "https://appleid.apple.com/auth/token");
    assert_eq!(http.header("content-type"), Some("application/x-www-form-urlencoded"));
    assert_eq!(
        String::from_utf8(http.body.unwrap()).unwrap(),
        format!("client_id=com.example.app&client_secret={}&grant_type=refresh_token&refresh_token=r_123", secret)
    );
}

#[test]
fn test_web_code_request_fields() {
    let req = ValidationRequest::web("com.example.web", "SECRET", "c_1", "https://example.com/cb");
    assert_eq!(build_request(BASE, &req).url, "https://appleid.apple.com/auth/token");
    assert_eq!(keys(&req), vec!["client_id", "client_secret", "code", "grant_type", "redirect_uri"]);
    assert_eq!(
        body(&req),
        "client_id=com.example.web&client_secret=SECRET&code=c_1&grant_type=authorization_code&redirect_uri=https%3A%2F%2Fexample.com%2Fcb"
    );
}

#[test]
fn test_app_code_request_has_no_redirect_uri() {
    let req = ValidationRequest::app("com.example.app", "SECRET", "c_2");
    assert_eq!(build_request(BASE, &req).url, "https://appleid.apple.com/auth/token");
    assert_eq!(
        body(&req),
        "client_id=com.example.app&client_secret=SECRET&code=c_2&grant_type=authorization_code"
    );
}

#[test]
fn test_revoke_access_request_fields() {
    let req = ValidationRequest::revoke_access(Some("com.example.app".to_string()), "SECRET", "a_1");
    assert_eq!(build_request(BASE, &req).url, "https://appleid.apple.com/auth/revoke");
    assert_eq!(
        body(&req),
        "client_id=com.example.app&client_secret=SECRET&token=a_1&token_type_hint=access_token"
    );
}

#[test]
fn test_revoke_access_without_client_id_omits_field() {
    let req = ValidationRequest::revoke_access(None, "SECRET", "a_1");
    assert_eq!(keys(&req), vec!["client_secret", "token", "token_type_hint"]);
}

#[test]
fn test_revoke_refresh_request_fields() {
    let req = ValidationRequest::revoke_refresh("com.example.app", "SECRET", "r_9");
    assert_eq!(build_request(BASE, &req).url, "https://appleid.apple.com/auth/revoke");
    assert_eq!(
        body(&req),
        "client_id=com.example.app&client_secret=SECRET&token=r_9&token_type_hint=refresh_token"
    );
}

#[test]
fn test_values_are_percent_encoded() {
    let req = ValidationRequest::web("id", "s", "a+b&c=d", "https://example.com/cb?x=1 2");
    let body = body(&req);
    assert!(body.contains("code=a%2Bb%26c%3Dd"));
    assert!(body.contains("redirect_uri=https%3A%2F%2Fexample.com%2Fcb%3Fx%3D1+2"));
    assert_eq!(body.matches('&').count(), 4);
}

#[test]
fn test_form_encoding_rules() {
    assert_eq!(encode_form_component("AZaz09-._~"), "AZaz09-._~");
    assert_eq!(encode_form_component("a b"), "a+b");
    assert_eq!(encode_form_component("é/"), "%C3%A9%2F");
    assert_eq!(encode_form(&[("k 1", "v"), ("k2", "")]), "k+1=v&k2=");
}

#[test]
fn test_base_url_trailing_slash() {
    let req = ValidationRequest::app("id", "s", "c");
    assert_eq!(build_request("http://127.0.0.1:8080/", &req).url, "http://127.0.0.1:8080/auth/token");
}
