use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tower_sessions::{Session, session};

use costs_auth::{BearerToken, SESSION_BEARER_KEY};
use costs_infra::FlashMessage;

const FLASH_PREFIX: &str = "_flash.";

/// The per-user-agent session, seen as a small key-value store.
///
/// Holds the bearer token plus one-shot flash values.
#[derive(Debug, Clone)]
pub struct WebSession(Session);

impl WebSession {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    pub async fn bearer(&self) -> Result<Option<BearerToken>, session::Error> {
        self.0.get::<BearerToken>(SESSION_BEARER_KEY).await
    }

    pub async fn has_bearer(&self) -> Result<bool, session::Error> {
        Ok(self.bearer().await?.is_some())
    }

    /// Store the token under a fresh session id.
    pub async fn put_bearer(&self, token: &BearerToken) -> Result<(), session::Error> {
        self.0.cycle_id().await?;
        self.0.insert(SESSION_BEARER_KEY, token).await
    }

    /// Drop everything, token and flash values alike.
    pub async fn flush(&self) -> Result<(), session::Error> {
        self.0.flush().await
    }

    pub async fn flash(&self, key: &str, value: &str) -> Result<(), session::Error> {
        self.0.insert(&format!("{FLASH_PREFIX}{key}"), value).await
    }

    /// Read a flash value; it is gone afterwards.
    pub async fn take_flash(&self, key: &str) -> Result<Option<String>, session::Error> {
        self.0.remove::<String>(&format!("{FLASH_PREFIX}{key}")).await
    }

    pub async fn apply(&self, effect: &SessionEffect) -> Result<(), session::Error> {
        if effect.flush {
            self.flush().await?;
        }
        for message in &effect.flash {
            self.flash(message.key, &message.value).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for WebSession
where
    S: Send + Sync,
{
    type Rejection = <Session as FromRequestParts<S>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state).await.map(Self)
    }
}

/// Session changes that accompany a response.
///
/// Error responses are built without access to the session, so they carry
/// their flash/flush instructions in the response extensions and
/// [`crate::middleware::apply_session_effects`] applies them. Flush runs
/// before flash so a message survives a cleared session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionEffect {
    pub flash: Vec<FlashMessage>,
    pub flush: bool,
}

impl SessionEffect {
    pub fn flush() -> Self {
        Self {
            flash: Vec::new(),
            flush: true,
        }
    }

    pub fn status(value: impl Into<String>) -> Self {
        Self {
            flash: vec![FlashMessage::status(value)],
            flush: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.flash.is_empty() && !self.flush
    }
}
