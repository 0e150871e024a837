use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use costs_core::Route;

use crate::context::{SessionEffect, WebSession};

/// Gate for every protected route.
///
/// With a bearer token in the session the token is handed to the handler as
/// a request extension; without one the session is flushed and the user is
/// sent to the index, which forwards to sign-in.
pub async fn require_bearer(session: WebSession, mut req: Request, next: Next) -> Response {
    match session.bearer().await {
        Ok(Some(token)) => {
            req.extensions_mut().insert(token);
            next.run(req).await
        }
        Ok(None) => {
            if let Err(e) = session.flush().await {
                tracing::warn!("session flush failed: {e}");
            }
            Redirect::to(&Route::Index.path()).into_response()
        }
        Err(e) => {
            tracing::error!("session read failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Apply the [`SessionEffect`] an error response carries, if any.
pub async fn apply_session_effects(session: WebSession, req: Request, next: Next) -> Response {
    let mut resp = next.run(req).await;

    let Some(effect) = resp.extensions_mut().remove::<SessionEffect>() else {
        return resp;
    };
    if let Err(e) = session.apply(&effect).await {
        tracing::error!("could not apply session changes: {e}");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    resp
}
