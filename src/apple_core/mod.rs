//! Sign in with Apple core: client secret signing, token exchange and identity token decoding.

pub mod apple_client;
pub mod claims;
pub mod client_secret;
pub mod config;
pub mod error;
pub mod http_client;
pub mod request;
pub mod response;
pub mod types;
