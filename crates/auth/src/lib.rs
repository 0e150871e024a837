//! `costs-auth` — bearer token and sign-in credential types.
//!
//! This crate is intentionally decoupled from HTTP and storage: the web layer
//! decides where a token lives, the gateway decides how it is sent.

pub mod credentials;
pub mod token;

pub use credentials::{Credentials, SignInResponse};
pub use token::{BearerToken, SESSION_BEARER_KEY, TokenError};
