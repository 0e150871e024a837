use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::Html};
use minijinja::context;

use costs_auth::BearerToken;

use crate::app::{AppState, WebError};
use crate::context::WebSession;

use super::common::{gateway, take_status};

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Landing page for every exception redirect.
pub async fn error(
    Extension(state): Extension<Arc<AppState>>,
    session: WebSession,
) -> Result<Html<String>, WebError> {
    let status = take_status(&session).await?;
    let signed_in = session.has_bearer().await?;
    state.views.render("error", context! { status, signed_in })
}

pub async fn version_history(
    Extension(state): Extension<Arc<AppState>>,
    Extension(token): Extension<BearerToken>,
) -> Result<Html<String>, WebError> {
    let gw = gateway(&state, &token)?;
    let versions = gw.get(state.endpoints.changelog()).await?;

    state.views.render("version-history", context! { versions })
}
