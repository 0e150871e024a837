use axum::response::Response;

use costs_auth::BearerToken;
use costs_core::{Route, is_valid_identifier};
use costs_infra::{Gateway, STATUS_FLASH_KEY};

use crate::app::{AppState, WebError, errors::redirect_with};
use crate::context::{SessionEffect, WebSession};

/// Protected gateway for the current request, with the default targets.
pub fn gateway<'a>(state: &'a AppState, token: &BearerToken) -> Result<Gateway<'a>, WebError> {
    Ok(Gateway::protected(&state.gateway, token)?)
}

/// Upstream identifiers from the path are checked before they reach an
/// upstream URI or a redirect.
pub fn check_id(id: String) -> Result<String, WebError> {
    if is_valid_identifier(&id) {
        Ok(id)
    } else {
        Err(WebError::NotFound)
    }
}

pub fn redirect(target: Route) -> Response {
    redirect_with(&target, SessionEffect::default())
}

pub fn redirect_with_status(target: Route, status: &str) -> Response {
    redirect_with(&target, SessionEffect::status(status))
}

/// One-shot status message left by the previous request.
pub async fn take_status(session: &WebSession) -> Result<Option<String>, WebError> {
    Ok(session.take_flash(STATUS_FLASH_KEY).await?)
}
