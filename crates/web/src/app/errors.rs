use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use costs_core::Route;
use costs_infra::{GatewayError, Halt, RedirectTo};

use crate::context::SessionEffect;

/// Everything a controller can end with other than its page.
#[derive(Debug, Error)]
pub enum WebError {
    #[error("upstream call halted the request")]
    Halted(Halt),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("session store failed: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("template rendering failed: {0}")]
    Render(#[from] minijinja::Error),

    #[error("invalid input, returning to {back}")]
    Invalid { back: Route, status: &'static str },

    #[error("not found")]
    NotFound,
}

impl From<Halt> for WebError {
    fn from(halt: Halt) -> Self {
        WebError::Halted(halt)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::Halted(Halt::Failure(to)) | WebError::Halted(Halt::Exception(to)) => {
                halt_redirect(to)
            }
            WebError::Halted(Halt::Unhandled { reason }) => {
                tracing::error!(%reason, "upstream failure with no redirect target");
                (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
            }
            WebError::Gateway(e) if e.invalidates_session() => {
                tracing::warn!("{e}; signing out");
                redirect_with(&Route::SignIn, SessionEffect::flush())
            }
            WebError::Gateway(e) => {
                tracing::error!("{e}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            WebError::Invalid { back, status } => {
                redirect_with(&back, SessionEffect::status(status))
            }
            WebError::NotFound => (StatusCode::NOT_FOUND, "Not Found").into_response(),
            e @ (WebError::Session(_) | WebError::Render(_)) => {
                tracing::error!("{e}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

fn halt_redirect(to: RedirectTo) -> Response {
    let effect = SessionEffect {
        flash: to.flash,
        flush: to.clear_session,
    };
    redirect_with(&to.target, effect)
}

/// 303 to `target`, carrying session changes for
/// [`crate::middleware::apply_session_effects`].
pub fn redirect_with(target: &Route, effect: SessionEffect) -> Response {
    let mut resp = Redirect::to(&target.path()).into_response();
    if !effect.is_empty() {
        resp.extensions_mut().insert(effect);
    }
    resp
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("template setup failed: {0}")]
    Templates(#[from] minijinja::Error),
}

#[cfg(test)]
mod tests {
    use axum::http::header::LOCATION;
    use costs_infra::FlashMessage;

    use super::*;

    #[test]
    fn failure_halt_redirects_and_carries_flash() {
        let halt = Halt::Failure(
            RedirectTo::new(Route::AddExpense)
                .with_flash(FlashMessage::status("expense-not-added")),
        );
        let resp = WebError::from(halt).into_response();

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[LOCATION], "/add-expense");
        let effect = resp.extensions().get::<SessionEffect>().unwrap();
        assert_eq!(effect.flash, vec![FlashMessage::status("expense-not-added")]);
        assert!(!effect.flush);
    }

    #[test]
    fn unauthorized_upstream_clears_session() {
        let halt = Halt::Exception(RedirectTo::new(Route::Error).clearing_session(true));
        let resp = WebError::from(halt).into_response();
        assert_eq!(resp.headers()[LOCATION], "/error");
        assert!(resp.extensions().get::<SessionEffect>().unwrap().flush);
    }

    #[test]
    fn unhandled_is_bad_gateway_without_session_changes() {
        let resp = WebError::from(Halt::Unhandled {
            reason: "boom".into(),
        })
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert!(resp.extensions().get::<SessionEffect>().is_none());
    }

    #[test]
    fn missing_token_signs_out() {
        let resp = WebError::Gateway(GatewayError::MissingToken).into_response();
        assert_eq!(resp.headers()[LOCATION], "/sign-in");
        assert_eq!(resp.extensions().get::<SessionEffect>(), Some(&SessionEffect::flush()));

        let resp = WebError::Gateway(GatewayError::InvalidHeader("Authorization")).into_response();
        assert_eq!(resp.headers()[LOCATION], "/sign-in");
    }

    #[test]
    fn bad_source_tag_is_a_server_error_not_a_sign_out() {
        let resp = WebError::Gateway(GatewayError::InvalidHeader("X-Source")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(resp.headers().get(LOCATION).is_none());
        assert!(resp.extensions().get::<SessionEffect>().is_none());
    }
}
