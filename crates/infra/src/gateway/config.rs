use std::time::Duration;

use reqwest::Url;

use super::GatewayError;

/// Outbound timeouts. The transport default is "wait forever", which is never
/// what a page render wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub request: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            request: Duration::from_secs(15),
        }
    }
}

/// Process-wide part of the gateway: connection pool, base URL and source tag.
///
/// Holds no per-request state, so it is safe to share between requests; the
/// request-scoped parts (token, redirect targets) live on [`super::Gateway`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    client: reqwest::Client,
    base_url: Url,
    source: String,
}

impl GatewayConfig {
    pub fn new(
        base_url: &str,
        source: impl Into<String>,
        timeouts: Timeouts,
    ) -> Result<Self, GatewayError> {
        // `Url::join` drops the last path segment unless the base ends in '/'.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized).map_err(|e| GatewayError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.request)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            base_url,
            source: source.into(),
        })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Tag sent as `X-Source` and in error reports.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Resolve an upstream URI against the base URL.
    pub fn url(&self, uri: &str) -> Result<Url, String> {
        self.base_url
            .join(uri.trim_start_matches('/'))
            .map_err(|e| format!("cannot resolve `{uri}` against {}: {e}", self.base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_without_trailing_slash_keeps_its_path() {
        let cfg = GatewayConfig::new("https://api.example.com/v1", "web", Timeouts::default())
            .unwrap();
        assert_eq!(
            cfg.url("categories").unwrap().as_str(),
            "https://api.example.com/v1/categories"
        );
        assert_eq!(
            cfg.url("/categories?resource_type=abc").unwrap().as_str(),
            "https://api.example.com/v1/categories?resource_type=abc"
        );
    }

    #[test]
    fn garbage_base_url_is_rejected() {
        let err = GatewayConfig::new("not a url", "web", Timeouts::default()).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidBaseUrl { .. }));
    }
}
