//! Request-scoped gateway to the upstream expense API.
//!
//! Every outbound call from a controller goes through [`Gateway`]. Each verb
//! has exactly one expected status:
//!
//! ```text
//! GET    -> 200   decoded JSON body
//! HEAD   -> 200   whitelisted pagination headers
//! POST   -> 201   decoded JSON body
//! DELETE -> 204   true
//! ```
//!
//! Anything else ends the request with a [`Halt`]:
//!
//! - unexpected status: failure policy (best-effort error report, then the
//!   failure or exception target)
//! - transport error / undecodable body: exception policy (exception target)
//!
//! A gateway is built per request from the shared [`GatewayConfig`], so
//! redirect targets set by one request can never leak into another.

use costs_auth::BearerToken;
use costs_core::{Pagination, Route};
use reqwest::{
    Method, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use serde_json::Value;
use thiserror::Error;

pub mod config;
pub mod error_log;
pub mod halt;

pub use config::{GatewayConfig, Timeouts};
pub use error_log::{ERROR_LOG_URI, ErrorReport};
pub use halt::{API_ERROR_STATUS, FlashMessage, Halt, RedirectTo, STATUS_FLASH_KEY};

const X_SOURCE: HeaderName = HeaderName::from_static("x-source");

/// Whether the gateway sends the caller's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Public,
    Protected,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("protected call attempted without a bearer token")]
    MissingToken,

    #[error("invalid API base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("value for header {0} is not a valid header value")]
    InvalidHeader(&'static str),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl GatewayError {
    /// The session's token cannot be used; signing out is the only way on.
    ///
    /// A bad `X-Source` is a configuration problem and does not qualify.
    pub fn invalidates_session(&self) -> bool {
        matches!(
            self,
            GatewayError::MissingToken | GatewayError::InvalidHeader("Authorization")
        )
    }
}

/// Gateway for a single request.
#[derive(Debug)]
pub struct Gateway<'a> {
    config: &'a GatewayConfig,
    headers: HeaderMap,
    on_failure: Option<Route>,
    on_exception: Option<Route>,
}

impl<'a> Gateway<'a> {
    /// Build the headers for `mode`. Protected mode without a token fails
    /// before anything is sent.
    ///
    /// Starts with no failure target and the error page as exception target.
    pub fn configure(
        config: &'a GatewayConfig,
        mode: Mode,
        token: Option<&BearerToken>,
    ) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            X_SOURCE,
            HeaderValue::from_str(config.source())
                .map_err(|_| GatewayError::InvalidHeader("X-Source"))?,
        );

        if mode == Mode::Protected {
            let token = token.ok_or(GatewayError::MissingToken)?;
            let mut value = HeaderValue::from_str(&token.authorization())
                .map_err(|_| GatewayError::InvalidHeader("Authorization"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(Self {
            config,
            headers,
            on_failure: None,
            on_exception: Some(Route::Error),
        })
    }

    pub fn public(config: &'a GatewayConfig) -> Result<Self, GatewayError> {
        Self::configure(config, Mode::Public, None)
    }

    pub fn protected(
        config: &'a GatewayConfig,
        token: &BearerToken,
    ) -> Result<Self, GatewayError> {
        Self::configure(config, Mode::Protected, Some(token))
    }

    /// Where to send the user on an expected non-success status.
    pub fn redirect_on_failure(mut self, target: Route) -> Self {
        self.on_failure = Some(target);
        self
    }

    /// Where to send the user on a transport error or unhandled status.
    pub fn redirect_on_exception(mut self, target: Route) -> Self {
        self.on_exception = Some(target);
        self
    }

    /// Drop the exception target; unhandled failures then surface as
    /// [`Halt::Unhandled`].
    pub fn without_exception_redirect(mut self) -> Self {
        self.on_exception = None;
        self
    }

    pub fn failure_target(&self) -> Option<&Route> {
        self.on_failure.as_ref()
    }

    pub fn exception_target(&self) -> Option<&Route> {
        self.on_exception.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// GET `uri`, expecting 200.
    pub async fn get(&self, uri: &str) -> Result<Value, Halt> {
        let resp = self.send(Method::GET, uri, None).await?;
        if resp.status() != StatusCode::OK {
            return Err(self
                .failure_policy(&Method::GET, StatusCode::OK, resp.status(), uri)
                .await);
        }
        self.decode(&Method::GET, uri, resp).await
    }

    /// HEAD `uri`, expecting 200, and keep only the pagination headers.
    pub async fn head(&self, uri: &str) -> Result<Pagination, Halt> {
        let resp = self.send(Method::HEAD, uri, None).await?;
        if resp.status() != StatusCode::OK {
            return Err(self
                .failure_policy(&Method::HEAD, StatusCode::OK, resp.status(), uri)
                .await);
        }
        Ok(pagination_from_headers(resp.headers()))
    }

    /// POST `payload` to `uri`, expecting 201.
    ///
    /// With a failure target set, any other status flashes `failure_flash` as
    /// the status message and redirects there. Without one the exception
    /// policy applies.
    pub async fn post(
        &self,
        uri: &str,
        payload: &Value,
        failure_flash: &str,
    ) -> Result<Value, Halt> {
        let resp = match self.dispatch(Method::POST, uri, Some(payload)).await {
            Ok(resp) => resp,
            Err(reason) => {
                return Err(self.exception_policy(
                    &Method::POST,
                    uri,
                    &reason,
                    Some(FlashMessage::status(API_ERROR_STATUS)),
                ));
            }
        };

        let status = resp.status();
        if status != StatusCode::CREATED {
            tracing::warn!(
                method = "POST",
                uri,
                expected = 201,
                returned = status.as_u16(),
                "unexpected upstream status"
            );
            return Err(match &self.on_failure {
                Some(target) => Halt::Failure(
                    RedirectTo::new(target.clone())
                        .with_flash(FlashMessage::status(failure_flash))
                        .clearing_session(status == StatusCode::UNAUTHORIZED),
                ),
                None => self.exception_policy(
                    &Method::POST,
                    uri,
                    &format!("returned {status}, expected 201"),
                    None,
                ),
            });
        }
        self.decode(&Method::POST, uri, resp).await
    }

    /// DELETE `uri`, expecting 204.
    ///
    /// Every other outcome is a [`Halt`], so callers only ever see `Ok(true)`.
    pub async fn delete(&self, uri: &str) -> Result<bool, Halt> {
        let resp = self.send(Method::DELETE, uri, None).await?;
        if resp.status() != StatusCode::NO_CONTENT {
            return Err(self
                .failure_policy(&Method::DELETE, StatusCode::NO_CONTENT, resp.status(), uri)
                .await);
        }
        Ok(true)
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<&Value>,
    ) -> Result<Response, Halt> {
        match self.dispatch(method.clone(), uri, body).await {
            Ok(resp) => Ok(resp),
            Err(reason) => Err(self.exception_policy(&method, uri, &reason, None)),
        }
    }

    async fn dispatch(
        &self,
        method: Method,
        uri: &str,
        body: Option<&Value>,
    ) -> Result<Response, String> {
        let url = self.config.url(uri)?;
        let mut req = self
            .config
            .client()
            .request(method, url)
            .headers(self.headers.clone());
        if let Some(body) = body {
            req = req.json(body);
        }
        req.send().await.map_err(|e| e.to_string())
    }

    async fn decode(&self, method: &Method, uri: &str, resp: Response) -> Result<Value, Halt> {
        resp.json::<Value>().await.map_err(|e| {
            self.exception_policy(method, uri, &format!("undecodable body: {e}"), None)
        })
    }

    /// Unexpected but well-formed status.
    async fn failure_policy(
        &self,
        method: &Method,
        expected: StatusCode,
        returned: StatusCode,
        uri: &str,
    ) -> Halt {
        tracing::warn!(
            method = %method,
            uri,
            expected = expected.as_u16(),
            returned = returned.as_u16(),
            "unexpected upstream status"
        );
        let clear_session = returned == StatusCode::UNAUTHORIZED;
        let to = |target: &Route| RedirectTo::new(target.clone()).clearing_session(clear_session);

        let Some(exception) = &self.on_exception else {
            return match &self.on_failure {
                Some(failure) => Halt::Failure(to(failure)),
                None => Halt::Unhandled {
                    reason: format!("{method} {uri} returned {returned}, expected {expected}"),
                },
            };
        };

        let report = ErrorReport::new(method, expected, returned, uri, self.config.source());
        if let Err(e) = error_log::report(self.config, &self.headers, &report).await {
            tracing::warn!(error = %e, "could not report upstream error; abandoning report");
            return Halt::Exception(to(exception));
        }

        match &self.on_failure {
            Some(failure) => Halt::Failure(to(failure)),
            None => Halt::Exception(to(exception)),
        }
    }

    /// Transport-level failure.
    fn exception_policy(
        &self,
        method: &Method,
        uri: &str,
        reason: &str,
        flash: Option<FlashMessage>,
    ) -> Halt {
        tracing::error!(method = %method, uri, error = reason, "upstream call failed");
        match &self.on_exception {
            Some(target) => {
                let mut redirect = RedirectTo::new(target.clone());
                if let Some(flash) = flash {
                    redirect = redirect.with_flash(flash);
                }
                Halt::Exception(redirect)
            }
            None => Halt::Unhandled {
                reason: format!("{method} {uri}: {reason}"),
            },
        }
    }
}

/// Copy the whitelisted pagination headers out of a response.
pub fn pagination_from_headers(headers: &HeaderMap) -> Pagination {
    Pagination::from_lookup(|name| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use costs_core::PAGINATION_HEADERS;
    use proptest::prelude::*;

    fn header_count(p: &Pagination) -> usize {
        serde_json::to_value(p)
            .unwrap()
            .as_object()
            .map_or(0, |headers| headers.len())
    }

    fn config() -> GatewayConfig {
        GatewayConfig::new("http://127.0.0.1:9/v1", "web", Timeouts::default()).unwrap()
    }

    #[test]
    fn protected_mode_requires_token() {
        let cfg = config();
        let err = Gateway::configure(&cfg, Mode::Protected, None).unwrap_err();
        assert!(matches!(err, GatewayError::MissingToken));
    }

    #[test]
    fn only_token_problems_invalidate_the_session() {
        assert!(GatewayError::MissingToken.invalidates_session());
        assert!(GatewayError::InvalidHeader("Authorization").invalidates_session());
        assert!(!GatewayError::InvalidHeader("X-Source").invalidates_session());
    }

    #[test]
    fn invalid_source_tag_is_rejected_before_sending() {
        let cfg =
            GatewayConfig::new("http://127.0.0.1:9/v1", "web\n", Timeouts::default()).unwrap();
        let err = Gateway::public(&cfg).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidHeader("X-Source")));
        assert!(!err.invalidates_session());
    }

    #[test]
    fn protected_mode_sends_bearer_and_default_headers() {
        let cfg = config();
        let token = BearerToken::new("abc").unwrap();
        let gw = Gateway::protected(&cfg, &token).unwrap();

        assert_eq!(gw.headers()[AUTHORIZATION], "Bearer abc");
        assert!(gw.headers()[AUTHORIZATION].is_sensitive());
        assert_eq!(gw.headers()[ACCEPT], "application/json");
        assert_eq!(gw.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(gw.headers()["x-source"], "web");
    }

    #[test]
    fn public_mode_has_no_authorization() {
        let cfg = config();
        let gw = Gateway::public(&cfg).unwrap();
        assert!(gw.headers().get(AUTHORIZATION).is_none());
        assert_eq!(gw.failure_target(), None);
        assert_eq!(gw.exception_target(), Some(&Route::Error));
    }

    #[test]
    fn builder_sets_targets() {
        let cfg = config();
        let gw = Gateway::public(&cfg)
            .unwrap()
            .redirect_on_failure(Route::AddExpense)
            .redirect_on_exception(Route::Recent);
        assert_eq!(gw.failure_target(), Some(&Route::AddExpense));
        assert_eq!(gw.exception_target(), Some(&Route::Recent));

        let gw = gw.without_exception_redirect();
        assert_eq!(gw.exception_target(), None);
    }

    #[test]
    fn pagination_keeps_only_present_whitelisted_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-total-count", HeaderValue::from_static("42"));
        headers.insert("x-unrelated", HeaderValue::from_static("nope"));

        let p = pagination_from_headers(&headers);
        assert_eq!(header_count(&p), 1);
        assert_eq!(p.get("X-Total-Count"), Some("42"));
        assert!(!p.contains("X-Link-Next"));
    }

    proptest! {
        #[test]
        fn pagination_key_set_matches_present_whitelist(
            present in proptest::collection::vec(any::<bool>(), PAGINATION_HEADERS.len()),
            values in proptest::collection::vec("[a-zA-Z0-9/?=&]{0,24}", PAGINATION_HEADERS.len()),
            noise in proptest::collection::btree_map("x-noise-[a-z]{1,8}", "[a-z0-9]{0,8}", 0..4),
        ) {
            let mut headers = HeaderMap::new();
            for (i, name) in PAGINATION_HEADERS.iter().enumerate() {
                if present[i] {
                    headers.insert(
                        HeaderName::from_bytes(name.as_bytes()).unwrap(),
                        HeaderValue::from_str(&values[i]).unwrap(),
                    );
                }
            }
            for (k, v) in &noise {
                headers.insert(
                    HeaderName::from_bytes(k.as_bytes()).unwrap(),
                    HeaderValue::from_str(v).unwrap(),
                );
            }

            let p = pagination_from_headers(&headers);

            let expected: Vec<&str> = PAGINATION_HEADERS
                .iter()
                .enumerate()
                .filter(|(i, _)| present[*i])
                .map(|(_, n)| *n)
                .collect();
            prop_assert_eq!(header_count(&p), expected.len());
            for (i, name) in PAGINATION_HEADERS.iter().enumerate() {
                if present[i] {
                    prop_assert_eq!(p.get(name), Some(values[i].as_str()));
                } else {
                    prop_assert!(!p.contains(name));
                }
            }
        }
    }
}
