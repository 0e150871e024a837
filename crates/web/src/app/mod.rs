//! HTTP application wiring (Axum router + shared state).
//!
//! - `routes/`: controllers, one file per area of the site
//! - `views.rs`: named templates
//! - `dto.rs`: form/query DTOs and view helpers
//! - `errors.rs`: how a halted request turns into a redirect

use std::sync::Arc;

use axum::{Extension, Router, middleware::from_fn};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use costs_infra::{Endpoints, GatewayConfig};

use crate::{config::Settings, middleware};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod views;

pub use errors::{StartupError, WebError};
pub use views::Views;

pub const SESSION_COOKIE: &str = "costs.sid";

/// Process-wide state shared by every request. Nothing in here is mutated
/// after startup.
#[derive(Debug)]
pub struct AppState {
    pub gateway: GatewayConfig,
    pub endpoints: Endpoints,
    pub views: Views,
    pub resource_name: String,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> Result<Self, StartupError> {
        Ok(Self {
            gateway: GatewayConfig::new(
                &settings.api_base_url,
                settings.api_source.clone(),
                settings.timeouts,
            )?,
            endpoints: settings.endpoints(),
            views: Views::load()?,
            resource_name: settings.resource_name.clone(),
        })
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(settings: &Settings) -> Result<Router, StartupError> {
    let state = Arc::new(AppState::from_settings(settings)?);

    let sessions = SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE)
        .with_secure(settings.session_secure)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(i64::from(
            settings.session_idle_minutes,
        ))));

    // Protected routes: require a bearer token in the session.
    let protected = routes::protected_router().route_layer(from_fn(middleware::require_bearer));

    Ok(Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(from_fn(middleware::apply_session_effects))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(sessions)
                .layer(Extension(state)),
        ))
}
