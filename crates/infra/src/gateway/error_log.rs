//! Best-effort reporting of unexpected upstream statuses back to the upstream.

use reqwest::{Method, StatusCode, header::HeaderMap};
use serde::Serialize;
use thiserror::Error;

use super::GatewayConfig;

/// Upstream path that accepts error reports.
pub const ERROR_LOG_URI: &str = "request/error-log";

/// Attempts per report: the first try plus a single retry on transport errors.
const MAX_ATTEMPTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub method: String,
    pub expected_status_code: u16,
    pub returned_status_code: u16,
    pub request_uri: String,
    pub source: String,
}

impl ErrorReport {
    pub fn new(
        method: &Method,
        expected: StatusCode,
        returned: StatusCode,
        request_uri: &str,
        source: &str,
    ) -> Self {
        Self {
            method: method.as_str().to_string(),
            expected_status_code: expected.as_u16(),
            returned_status_code: returned.as_u16(),
            request_uri: request_uri.to_string(),
            source: source.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("error log endpoint could not be resolved: {0}")]
    Url(String),

    #[error("error log endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("error log endpoint returned {0}, expected 201")]
    Status(StatusCode),
}

/// POST `report` to the error log. Only transport errors are retried.
pub async fn report(
    config: &GatewayConfig,
    headers: &HeaderMap,
    report: &ErrorReport,
) -> Result<(), ReportError> {
    let url = config.url(ERROR_LOG_URI).map_err(ReportError::Url)?;

    let mut last_err = None;
    for attempt in 1..=MAX_ATTEMPTS {
        let sent = config
            .client()
            .post(url.clone())
            .headers(headers.clone())
            .json(report)
            .send()
            .await;

        match sent {
            Ok(resp) if resp.status() == StatusCode::CREATED => return Ok(()),
            Ok(resp) => return Err(ReportError::Status(resp.status())),
            Err(e) => {
                tracing::debug!(attempt, error = %e, "error log POST failed");
                last_err = Some(e);
            }
        }
    }

    match last_err {
        Some(e) => Err(ReportError::Transport(e)),
        None => Err(ReportError::Url("no attempt was made".to_string())),
    }
}
