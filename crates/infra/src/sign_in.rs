//! Exchange credentials for a bearer token.
//!
//! Unlike the other calls this one expects 200 (not 201) and never redirects
//! on its own: the caller decides what a failed sign-in means for the session.

use costs_auth::{BearerToken, Credentials, SignInResponse, TokenError};
use reqwest::StatusCode;
use thiserror::Error;

use crate::gateway::{Gateway, GatewayConfig, GatewayError};

#[derive(Debug, Error)]
pub enum SignInError {
    #[error("sign-in rejected by upstream with {0}")]
    Rejected(StatusCode),

    #[error("sign-in request failed: {0}")]
    Transport(String),

    #[error("sign-in response was not understood: {0}")]
    MalformedBody(String),

    #[error("upstream issued an unusable token: {0}")]
    Token(#[from] TokenError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// POST `credentials` to `path` with the public headers.
pub async fn sign_in(
    config: &GatewayConfig,
    path: &str,
    credentials: &Credentials,
) -> Result<BearerToken, SignInError> {
    let headers = Gateway::public(config)?.headers().clone();
    let url = config.url(path).map_err(SignInError::Transport)?;

    let resp = config
        .client()
        .post(url)
        .headers(headers)
        .json(credentials)
        .send()
        .await
        .map_err(|e| SignInError::Transport(e.to_string()))?;

    if resp.status() != StatusCode::OK {
        return Err(SignInError::Rejected(resp.status()));
    }

    let body: SignInResponse = resp
        .json()
        .await
        .map_err(|e| SignInError::MalformedBody(e.to_string()))?;

    Ok(BearerToken::new(body.token)?)
}
