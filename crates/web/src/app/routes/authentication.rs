use std::sync::Arc;

use axum::{
    Form,
    extract::{Extension, Query, rejection::FormRejection},
    response::{IntoResponse, Redirect, Response},
};
use minijinja::context;
use serde::Deserialize;

use costs_auth::Credentials;
use costs_core::Route;
use costs_infra::sign_in as upstream_sign_in;

use crate::app::{AppState, WebError};
use crate::context::{SessionEffect, WebSession};

use super::common::redirect;

pub const SIGN_IN_FAILED: &str = "sign-in-failed";

/// The sign-in page's status travels in the query string: a failed sign-in
/// leaves no session behind to carry it.
#[derive(Debug, Default, Deserialize)]
pub struct SignInQuery {
    pub status: Option<String>,
}

pub async fn index(session: WebSession) -> Result<Response, WebError> {
    if session.has_bearer().await? {
        return Ok(redirect(Route::Recent));
    }
    session.flush().await?;
    Ok(redirect(Route::SignIn))
}

pub async fn sign_in(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<SignInQuery>,
) -> Result<Response, WebError> {
    let status = query.status.filter(|s| s == SIGN_IN_FAILED);
    let page = state.views.render(
        "sign-in",
        context! { resource => &state.resource_name, status },
    )?;
    Ok(page.into_response())
}

pub async fn process_sign_in(
    Extension(state): Extension<Arc<AppState>>,
    session: WebSession,
    form: Result<Form<Credentials>, FormRejection>,
) -> Result<Response, WebError> {
    let credentials = match form {
        Ok(Form(credentials)) => credentials,
        Err(e) => {
            tracing::warn!("sign-in form rejected: {e}");
            return Ok(sign_in_failed());
        }
    };

    match upstream_sign_in(&state.gateway, state.endpoints.sign_in(), &credentials).await {
        Ok(token) => {
            session.put_bearer(&token).await?;
            tracing::info!(email = %credentials.email, "signed in");
            Ok(redirect(Route::Recent))
        }
        Err(e) => {
            tracing::warn!(email = %credentials.email, "sign-in failed: {e}");
            Ok(sign_in_failed())
        }
    }
}

pub async fn sign_out(session: WebSession) -> Result<Response, WebError> {
    session.flush().await?;
    Ok(redirect(Route::SignIn))
}

/// Empty session, back to the form with the failure shown.
fn sign_in_failed() -> Response {
    let mut resp =
        Redirect::to(&format!("{}?status={SIGN_IN_FAILED}", Route::SignIn)).into_response();
    resp.extensions_mut().insert(SessionEffect::flush());
    resp
}

#[cfg(test)]
mod tests {
    use axum::http::header::LOCATION;

    use super::*;

    #[test]
    fn failed_sign_in_only_flushes() {
        let resp = sign_in_failed();
        assert_eq!(resp.headers()[LOCATION], "/sign-in?status=sign-in-failed");
        let effect = resp.extensions().get::<SessionEffect>().unwrap();
        assert!(effect.flush);
        assert!(effect.flash.is_empty());
    }
}
