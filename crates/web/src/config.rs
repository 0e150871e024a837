//! Runtime configuration, read from the environment.

use std::time::Duration;

use costs_infra::{Endpoints, Timeouts};

/// Upper bound for either outbound timeout.
pub const MAX_TIMEOUT_SECS: u64 = 300;

/// Upper bound for the session idle time: one year.
pub const MAX_IDLE_MINUTES: u32 = 60 * 24 * 365;

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub api_base_url: String,
    /// Sent as `X-Source` and in error reports.
    pub api_source: String,
    pub resource_type_id: String,
    pub resource_id: String,
    pub sign_in_uri: String,
    /// Display name of the tracked resource on the sign-in page.
    pub resource_name: String,
    pub timeouts: Timeouts,
    pub session_secure: bool,
    pub session_idle_minutes: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            api_base_url: "https://api.costs-to-expect.com/v1/".to_string(),
            api_source: "web".to_string(),
            resource_type_id: "d185Q15grY".to_string(),
            resource_id: "kw8gLq31VB".to_string(),
            sign_in_uri: "auth/login".to_string(),
            resource_name: "Resource name".to_string(),
            timeouts: Timeouts::default(),
            session_secure: false,
            session_idle_minutes: 120,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup; unset, unparsable or
    /// out-of-range values fall back to the defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let string = |key: &str, default: String| {
            lookup(key).filter(|v| !v.trim().is_empty()).unwrap_or_else(|| {
                tracing::warn!("{key} not set; using default `{default}`");
                default
            })
        };

        // Accepts 1..=max only; zero would make every timeout/expiry immediate.
        let bounded = |key: &str, default: u64, max: u64| match lookup(key) {
            None => default,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(value) if (1..=max).contains(&value) => value,
                _ => {
                    tracing::warn!("{key}=`{raw}` is not a number in 1..={max}; using {default}");
                    default
                }
            },
        };

        let session_secure = match lookup("SESSION_SECURE_COOKIE").as_deref().map(str::trim) {
            None => {
                tracing::warn!("SESSION_SECURE_COOKIE not set; cookie sent over plain HTTP");
                defaults.session_secure
            }
            Some("1") | Some("true") | Some("yes") => true,
            Some(_) => false,
        };

        Self {
            bind_addr: string("BIND_ADDR", defaults.bind_addr),
            api_base_url: string("API_BASE_URL", defaults.api_base_url),
            api_source: string("API_SOURCE_TAG", defaults.api_source),
            resource_type_id: string("API_RESOURCE_TYPE_ID", defaults.resource_type_id),
            resource_id: string("API_RESOURCE_ID", defaults.resource_id),
            sign_in_uri: string("API_URI_SIGN_IN", defaults.sign_in_uri),
            resource_name: string("RESOURCE_NAME", defaults.resource_name),
            timeouts: Timeouts {
                connect: Duration::from_secs(bounded(
                    "API_CONNECT_TIMEOUT_SECS",
                    defaults.timeouts.connect.as_secs(),
                    MAX_TIMEOUT_SECS,
                )),
                request: Duration::from_secs(bounded(
                    "API_TIMEOUT_SECS",
                    defaults.timeouts.request.as_secs(),
                    MAX_TIMEOUT_SECS,
                )),
            },
            session_secure,
            session_idle_minutes: u32::try_from(bounded(
                "SESSION_IDLE_MINUTES",
                u64::from(defaults.session_idle_minutes),
                u64::from(MAX_IDLE_MINUTES),
            ))
            .unwrap_or(defaults.session_idle_minutes),
        }
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(
            self.resource_type_id.clone(),
            self.resource_id.clone(),
            self.sign_in_uri.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn unset_values_fall_back_to_defaults() {
        let s = Settings::from_lookup(lookup(&[]));
        assert_eq!(s.bind_addr, "0.0.0.0:8080");
        assert_eq!(s.timeouts, Timeouts::default());
        assert!(!s.session_secure);
    }

    #[test]
    fn explicit_values_win() {
        let s = Settings::from_lookup(lookup(&[
            ("API_BASE_URL", "http://localhost:9000/v1"),
            ("API_TIMEOUT_SECS", "3"),
            ("SESSION_SECURE_COOKIE", "true"),
            ("API_RESOURCE_ID", "abc123"),
        ]));
        assert_eq!(s.api_base_url, "http://localhost:9000/v1");
        assert_eq!(s.timeouts.request, Duration::from_secs(3));
        assert!(s.session_secure);
        assert!(s.endpoints().resource().ends_with("/resources/abc123"));
    }

    #[test]
    fn unparsable_numbers_use_defaults() {
        let s = Settings::from_lookup(lookup(&[("API_CONNECT_TIMEOUT_SECS", "soon")]));
        assert_eq!(s.timeouts.connect, Timeouts::default().connect);
    }

    #[test]
    fn out_of_range_numbers_use_defaults() {
        let s = Settings::from_lookup(lookup(&[
            ("API_TIMEOUT_SECS", "0"),
            ("API_CONNECT_TIMEOUT_SECS", "86400"),
            ("SESSION_IDLE_MINUTES", "18446744073709551615"),
        ]));
        assert_eq!(s.timeouts, Timeouts::default());
        assert_eq!(s.session_idle_minutes, 120);

        let s = Settings::from_lookup(lookup(&[
            ("SESSION_IDLE_MINUTES", "-5"),
            ("API_TIMEOUT_SECS", "99999999999999999999999"),
        ]));
        assert_eq!(s.session_idle_minutes, 120);
        assert_eq!(s.timeouts.request, Timeouts::default().request);
    }

    #[test]
    fn largest_idle_time_still_builds_the_app() {
        let s = Settings::from_lookup(lookup(&[(
            "SESSION_IDLE_MINUTES",
            &MAX_IDLE_MINUTES.to_string(),
        )]));
        assert_eq!(s.session_idle_minutes, MAX_IDLE_MINUTES);
        assert!(crate::app::build_app(&s).is_ok());
    }
}
