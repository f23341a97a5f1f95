//! Candidate base URLs for the QueryMe back end.
//!
//! The crate only selects one of them; it never probes or fails over between
//! endpoints.

use std::fmt;
use std::str::FromStr;

use crate::{QueryMeError, Result};

pub const PRODUCTION_URL: &str = "https://queryme.in/smondoville/app";
pub const ALTERNATIVE_URL: &str = "https://api.queryme.in/smondoville/app";
pub const DEVELOPMENT_URL: &str = "http://localhost:5500";
pub const FALLBACK_URL: &str = "https://queryme.in/smondoville/app";

/// Explicit base URL override.
pub const API_URL_VAR: &str = "QUERYME_API_URL";
/// Environment name (`production`, `alternative`, `development`, `fallback`).
pub const API_ENV_VAR: &str = "QUERYME_ENV";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum ApiEnvironment {
    #[default]
    Production,
    Alternative,
    Development,
    Fallback,
}

impl ApiEnvironment {
    pub const ALL: [ApiEnvironment; 4] = [
        Self::Production,
        Self::Alternative,
        Self::Development,
        Self::Fallback,
    ];

    pub fn base_url(self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_URL,
            Self::Alternative => ALTERNATIVE_URL,
            Self::Development => DEVELOPMENT_URL,
            Self::Fallback => FALLBACK_URL,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Alternative => "alternative",
            Self::Development => "development",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ApiEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ApiEnvironment {
    type Err = QueryMeError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|env| env.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| QueryMeError::Config(format!("unknown API environment '{wanted}'")))
    }
}

/// Production, alternative and fallback URLs with duplicates removed, in order.
pub fn endpoint_fallbacks() -> Vec<&'static str> {
    let mut urls: Vec<&'static str> = Vec::with_capacity(3);
    for env in [
        ApiEnvironment::Production,
        ApiEnvironment::Alternative,
        ApiEnvironment::Fallback,
    ] {
        if !urls.contains(&env.base_url()) {
            urls.push(env.base_url());
        }
    }
    urls
}

/// Resolves the base URL from `QUERYME_API_URL` or `QUERYME_ENV`.
///
/// An explicit URL wins; otherwise the named environment is used, and
/// production when neither is set.
pub fn api_url_from_env() -> Result<String> {
    resolve_api_url(
        std::env::var(API_URL_VAR).ok().as_deref(),
        std::env::var(API_ENV_VAR).ok().as_deref(),
    )
}

fn resolve_api_url(explicit: Option<&str>, env_name: Option<&str>) -> Result<String> {
    if let Some(url) = explicit.map(str::trim).filter(|url| !url.is_empty()) {
        return Ok(url.to_owned());
    }
    match env_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => Ok(name.parse::<ApiEnvironment>()?.base_url().to_owned()),
        None => Ok(ApiEnvironment::default().base_url().to_owned()),
    }
}

/// Joins a base URL and a path with exactly one `/` between them.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallbacks_drop_duplicate_urls() {
        assert_eq!(endpoint_fallbacks(), vec![PRODUCTION_URL, ALTERNATIVE_URL]);
    }

    #[test]
    fn environment_names_parse_case_insensitively() {
        assert_eq!(
            " Development ".parse::<ApiEnvironment>().unwrap(),
            ApiEnvironment::Development
        );
        for env in ApiEnvironment::ALL {
            assert_eq!(env.to_string().parse::<ApiEnvironment>().unwrap(), env);
        }
        assert!("staging".parse::<ApiEnvironment>().is_err());
    }

    #[test]
    fn explicit_url_wins_over_environment() {
        let url = resolve_api_url(Some("http://10.0.0.2:5500"), Some("production")).unwrap();
        assert_eq!(url, "http://10.0.0.2:5500");
    }

    #[test]
    fn blank_values_fall_through_to_production() {
        assert_eq!(resolve_api_url(Some("  "), None).unwrap(), PRODUCTION_URL);
        assert_eq!(resolve_api_url(None, Some("")).unwrap(), PRODUCTION_URL);
        assert_eq!(
            resolve_api_url(None, Some("development")).unwrap(),
            DEVELOPMENT_URL
        );
    }

    #[test]
    fn unknown_environment_is_a_config_error() {
        let err = resolve_api_url(None, Some("qa")).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Config);
    }

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(join_url("http://x/", "/text_query"), "http://x/text_query");
        assert_eq!(join_url("http://x", "text_query"), "http://x/text_query");
    }
}
